//! HTTP daemon command.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use traderd_api::{serve, AppState};
use traderd_backtest::BacktestStore;
use traderd_config::{load_config, AppConfig};
use traderd_core::traits::MarketGateway;
use traderd_data::Subscriptions;
use traderd_gateway::{Mt5Config, Mt5Gateway, SimGateway};
use traderd_strategies::StrategyRunner;

use crate::cli::ServeArgs;

pub async fn run(args: ServeArgs, config_path: &Path) -> Result<()> {
    let config = if config_path.exists() {
        load_config(config_path)?
    } else {
        info!(path = %config_path.display(), "no config file, using defaults");
        AppConfig::default()
    };

    let gateway = build_gateway(&config, args.simulated);

    // A failed connect leaves the daemon serving with connectivity reported
    // through /health
    match gateway.connect().await {
        Ok(()) => info!(gateway = gateway.name(), "gateway connected"),
        Err(e) => warn!(gateway = gateway.name(), error = %e, "gateway unavailable, continuing disconnected"),
    }

    let (bar_tx, bar_rx) = mpsc::channel(256);
    let subscriptions = Subscriptions::new(gateway.clone(), bar_tx);
    let runner = StrategyRunner::new();
    tokio::spawn(runner.clone().run(bar_rx));

    let state = AppState {
        gateway,
        store: Arc::new(BacktestStore::new()),
        subscriptions,
        runner,
        config: Arc::new(config.clone()),
    };

    serve(state, &config.server.host, config.server.port).await?;
    Ok(())
}

fn build_gateway(config: &AppConfig, force_simulated: bool) -> Arc<dyn MarketGateway> {
    if force_simulated || config.gateway.kind == "simulated" {
        return Arc::new(SimGateway::new());
    }

    let mt5_config = match Mt5Config::from_env() {
        Ok(mut mt5_config) => {
            mt5_config.bridge_url = config.gateway.bridge_url.clone();
            mt5_config
        }
        Err(e) => {
            warn!(error = %e, "MT5 credentials incomplete, connect will fail");
            Mt5Config {
                bridge_url: config.gateway.bridge_url.clone(),
                login: 0,
                password: String::new(),
                server: String::new(),
            }
        }
    };

    Arc::new(Mt5Gateway::new(mt5_config))
}
