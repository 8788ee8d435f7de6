//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "traderd")]
#[command(author, version, about = "Market-gateway trading daemon")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP daemon
    Serve(ServeArgs),
    /// Run an offline backtest over a CSV file
    Backtest(BacktestArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Use the simulated gateway regardless of configuration
    #[arg(long)]
    pub simulated: bool,
}

#[derive(clap::Args)]
pub struct BacktestArgs {
    /// CSV file with OHLCV bars
    #[arg(long)]
    pub data: PathBuf,

    /// Symbol label for the report
    #[arg(short, long)]
    pub symbol: String,

    /// Period label for the report (e.g. 30d)
    #[arg(long, default_value = "30d")]
    pub period: String,

    /// Initial capital
    #[arg(long, default_value = "10000")]
    pub capital: f64,

    /// Risk fraction per trade
    #[arg(long, default_value = "0.02")]
    pub risk_per_trade: f64,

    /// Crossover window
    #[arg(long, default_value = "20")]
    pub sma_period: usize,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: String,
}
