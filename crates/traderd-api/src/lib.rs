//! HTTP control surface for the traderd daemon.
//!
//! Exposes health/status, on-demand backtests with stored results, current
//! indicator snapshots, price ticks, and live subscription control.

mod error;
pub mod routes;

pub use error::ApiError;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use traderd_backtest::BacktestStore;
use traderd_config::AppConfig;
use traderd_core::traits::MarketGateway;
use traderd_data::Subscriptions;
use traderd_strategies::StrategyRunner;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn MarketGateway>,
    pub store: Arc<BacktestStore>,
    pub subscriptions: Subscriptions,
    pub runner: StrategyRunner,
    pub config: Arc<AppConfig>,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/status", get(routes::status))
        .route("/backtest", post(routes::run_backtest))
        .route("/performance/:symbol", get(routes::performance))
        .route("/risk/:symbol", get(routes::risk))
        .route("/indicators/:symbol", get(routes::indicators))
        .route("/prices", get(routes::prices))
        .route(
            "/subscribe/:symbol",
            post(routes::subscribe).delete(routes::unsubscribe),
        )
        .with_state(state)
        .layer(cors)
        .layer(CatchPanicLayer::new())
}

/// Build and run the API server until the process stops.
pub async fn serve(state: AppState, host: &str, port: u16) -> std::io::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let app = router(state);

    info!(%addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
