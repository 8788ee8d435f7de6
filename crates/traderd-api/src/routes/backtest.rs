//! Backtest handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use traderd_backtest::{parse_period_days, simulate, BacktestParams, BacktestResult};

use crate::{ApiError, AppState};

fn default_strategy() -> String {
    "technical_strategy".to_string()
}

fn default_period() -> String {
    "30d".to_string()
}

fn default_capital() -> f64 {
    10_000.0
}

fn default_risk() -> f64 {
    0.02
}

/// Backtest request body.
#[derive(Debug, Deserialize)]
pub struct BacktestRequest {
    pub symbol: String,
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_period")]
    pub period: String,
    #[serde(default = "default_capital")]
    pub capital: f64,
    #[serde(default = "default_risk")]
    pub risk_per_trade: f64,
}

/// Run a backtest over gateway history and store the result.
pub async fn run_backtest(
    State(state): State<AppState>,
    Json(request): Json<BacktestRequest>,
) -> Result<Json<BacktestResult>, ApiError> {
    info!(symbol = %request.symbol, period = %request.period, "running backtest");

    let days = parse_period_days(&request.period)?;
    let timeframe = state.config.trading.default_timeframe;
    let bars_needed = days as usize * timeframe.bars_per_day();

    let bars = state
        .gateway
        .historical_bars(&request.symbol, timeframe, bars_needed)
        .await?;

    if bars.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No data for {}",
            request.symbol
        )));
    }

    let params = BacktestParams {
        sma_period: 20,
        capital: request.capital,
        risk_per_trade: request.risk_per_trade,
    };
    let result = simulate(&request.symbol, &request.period, &bars, &params)?;

    // Stored only after a fully successful run
    state.store.insert(result.clone());

    Ok(Json(result))
}

/// Performance subset of the stored result.
pub async fn performance(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let result = state
        .store
        .get(&symbol)
        .ok_or_else(|| ApiError::NotFound(format!("No backtest results for {symbol}")))?;

    Ok(Json(json!({
        "symbol": result.symbol,
        "sharpe_ratio": result.sharpe_ratio,
        "sortino_ratio": result.sortino_ratio,
        "max_drawdown": result.max_drawdown,
        "win_rate": result.win_rate,
        "profit_factor": result.profit_factor,
        "total_return": result.total_return,
        "total_trades": result.total_trades,
    })))
}

/// Risk subset of the stored result.
pub async fn risk(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let result = state
        .store
        .get(&symbol)
        .ok_or_else(|| ApiError::NotFound(format!("No backtest results for {symbol}")))?;

    Ok(Json(json!({
        "symbol": result.symbol,
        "var_95": result.var_95,
        "cvar_95": result.cvar_95,
        "volatility": result.volatility,
        "downside_deviation": result.downside_deviation,
        "max_drawdown": result.max_drawdown,
    })))
}
