//! Offline backtest command.

use anyhow::{Context, Result};
use traderd_backtest::{simulate, BacktestParams};
use traderd_data::CsvBarSource;

use crate::cli::BacktestArgs;

pub async fn run(args: BacktestArgs) -> Result<()> {
    let path = args
        .data
        .to_str()
        .context("data path is not valid UTF-8")?;
    let source = CsvBarSource::new(path)?;
    let bars = source.load()?;

    let params = BacktestParams {
        sma_period: args.sma_period,
        capital: args.capital,
        risk_per_trade: args.risk_per_trade,
    };
    let result = simulate(&args.symbol, &args.period, &bars, &params)?;

    match args.output.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => println!("{}", result.summary()),
    }

    Ok(())
}
