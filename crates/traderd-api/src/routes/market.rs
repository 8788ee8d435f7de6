//! Indicator, price, and subscription handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use traderd_core::types::BarSeries;
use traderd_indicators::IndicatorEngine;
use traderd_strategies::{IndicatorScorer, StrategyParams, TechnicalStrategy};

use crate::{ApiError, AppState};

const INDICATOR_HISTORY_BARS: usize = 100;

/// Current indicator set plus signal classification for a symbol.
pub async fn indicators(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let timeframe = state.config.trading.default_timeframe;
    let bars = state
        .gateway
        .historical_bars(&symbol, timeframe, INDICATOR_HISTORY_BARS)
        .await?;

    if bars.is_empty() {
        return Err(ApiError::NotFound(format!("No data for {symbol}")));
    }

    let mut series = BarSeries::new(symbol.clone(), timeframe);
    series.extend(bars);

    let snapshot = IndicatorEngine::evaluate_series(&series)?;
    let signal = IndicatorScorer::new().score(&snapshot);

    Ok(Json(json!({
        "symbol": symbol,
        "action": signal.action,
        "confidence": signal.confidence,
        "score": signal.score,
        "indicators": snapshot,
        "timestamp": Utc::now(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct PricesQuery {
    /// Comma-separated symbol list; configured defaults when absent
    pub symbols: Option<String>,
}

/// Current bid/ask/last for a set of symbols.
pub async fn prices(
    State(state): State<AppState>,
    Query(query): Query<PricesQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbols: Vec<String> = match query.symbols {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => state.config.trading.symbols.clone(),
    };

    let ticks = state.gateway.current_ticks(&symbols).await?;
    Ok(Json(serde_json::to_value(ticks).unwrap_or(Value::Null)))
}

/// Start the poller and live strategy for a symbol.
pub async fn subscribe(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let timeframe = state.config.trading.default_timeframe;

    if !state.subscriptions.subscribe(&symbol, timeframe).await {
        return Ok(Json(json!({
            "status": "already_subscribed",
            "symbol": symbol,
        })));
    }

    let params = StrategyParams {
        risk_per_trade: state.config.trading.risk_per_trade,
        ..Default::default()
    };
    let strategy = TechnicalStrategy::new(symbol.clone(), params, state.gateway.clone());
    state.runner.insert(strategy).await;

    info!(%symbol, %timeframe, "live strategy started");

    Ok(Json(json!({
        "status": "subscribed",
        "symbol": symbol,
    })))
}

/// Stop the poller and live strategy for a symbol.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Json<Value> {
    state.subscriptions.unsubscribe(&symbol).await;
    state.runner.remove(&symbol).await;

    Json(json!({
        "status": "unsubscribed",
        "symbol": symbol,
    }))
}
