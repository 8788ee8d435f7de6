//! Health and status handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::AppState;

/// Service liveness plus gateway connectivity.
///
/// Always answers 200; a down gateway is reported, not fatal.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "gateway_connected": state.gateway.is_connected(),
        "timestamp": Utc::now(),
    }))
}

/// System overview: account, open positions, active strategies.
pub async fn status(State(state): State<AppState>) -> Json<Value> {
    let account = match state.gateway.account_info().await {
        Ok(account) => serde_json::to_value(account).unwrap_or(Value::Null),
        Err(_) => Value::Null,
    };
    let open_positions = state
        .gateway
        .open_positions()
        .await
        .map(|positions| positions.len())
        .unwrap_or(0);

    let status = if state.gateway.is_connected() {
        "connected"
    } else {
        "disconnected"
    };

    Json(json!({
        "status": status,
        "account": account,
        "open_positions": open_positions,
        "active_strategies": state.runner.len().await,
        "timestamp": Utc::now(),
    }))
}
