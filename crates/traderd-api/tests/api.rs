//! End-to-end tests for the HTTP surface against the simulated gateway.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;
use traderd_api::{router, AppState};
use traderd_backtest::BacktestStore;
use traderd_config::AppConfig;
use traderd_core::traits::MarketGateway;
use traderd_core::types::Bar;
use traderd_data::Subscriptions;
use traderd_gateway::SimGateway;
use traderd_strategies::StrategyRunner;

fn wavy_bars(n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let close = 1.10 + (i as f64 * 0.45).sin() * 0.02;
            Bar::new(
                i as i64 * 900_000,
                close,
                close + 0.001,
                close - 0.001,
                close,
                10.0,
            )
        })
        .collect()
}

async fn state_with(loaded: &[(&str, usize)]) -> AppState {
    let gateway = Arc::new(SimGateway::new());
    gateway.connect().await.unwrap();
    for (symbol, n) in loaded {
        gateway.load_bars(symbol, wavy_bars(*n));
    }

    let (bar_tx, bar_rx) = mpsc::channel(64);
    let subscriptions = Subscriptions::new(gateway.clone(), bar_tx);
    let runner = StrategyRunner::new();
    tokio::spawn(runner.clone().run(bar_rx));

    AppState {
        gateway,
        store: Arc::new(BacktestStore::new()),
        subscriptions,
        runner,
        config: Arc::new(AppConfig::default()),
    }
}

async fn get(state: &AppState, uri: &str) -> (StatusCode, Value) {
    let response = router(state.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn send(state: &AppState, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router(state.clone())
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_reports_connectivity() {
    let state = state_with(&[]).await;
    let (status, body) = get(&state, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["gateway_connected"], true);
}

#[tokio::test]
async fn test_health_stays_up_when_gateway_down() {
    let state = state_with(&[]).await;
    state.gateway.disconnect().await.unwrap();

    let (status, body) = get(&state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gateway_connected"], false);

    let (status, body) = get(&state, "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "disconnected");
    assert_eq!(body["account"], Value::Null);
}

#[tokio::test]
async fn test_status_reports_account_and_counts() {
    let state = state_with(&[]).await;
    let (status, body) = get(&state, "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "connected");
    assert_eq!(body["open_positions"], 0);
    assert_eq!(body["active_strategies"], 0);
    assert!(body["account"]["balance"].is_string() || body["account"]["balance"].is_number());
}

#[tokio::test]
async fn test_backtest_stores_result_for_later_queries() {
    let state = state_with(&[("EURUSD", 250)]).await;

    let (status, body) = send(
        &state,
        "POST",
        "/backtest",
        json!({ "symbol": "EURUSD", "period": "2d" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "EURUSD");
    assert!(body["total_return"].is_number());
    assert!(body["max_drawdown"].as_f64().unwrap() <= 0.0);

    let (status, body) = get(&state, "/performance/EURUSD").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["sharpe_ratio"].is_number());
    assert!(body["total_trades"].is_number());

    let (status, body) = get(&state, "/risk/EURUSD").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["var_95"].is_number());
    assert!(body["downside_deviation"].is_number());
}

#[tokio::test]
async fn test_backtest_unknown_symbol_is_404() {
    let state = state_with(&[]).await;

    let (status, body) = send(
        &state,
        "POST",
        "/backtest",
        json!({ "symbol": "XXXYYY", "period": "2d" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("XXXYYY"));
}

#[tokio::test]
async fn test_backtest_invalid_period_is_400() {
    let state = state_with(&[("EURUSD", 250)]).await;

    let (status, _) = send(
        &state,
        "POST",
        "/backtest",
        json!({ "symbol": "EURUSD", "period": "monthly" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_performance_before_any_backtest_is_404() {
    let state = state_with(&[]).await;

    let (status, body) = get(&state, "/performance/EURUSD").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("No backtest results"));

    let (status, _) = get(&state, "/risk/EURUSD").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_indicators_classify_with_enough_history() {
    let state = state_with(&[("EURUSD", 120)]).await;

    let (status, body) = get(&state, "/indicators/EURUSD").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "EURUSD");

    let action = body["action"].as_str().unwrap();
    assert!(matches!(action, "BUY" | "SELL" | "HOLD"));

    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&confidence));

    let rsi = body["indicators"]["rsi_14"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&rsi));
    assert!(body["indicators"]["bollinger"]["upper"].is_number());
}

#[tokio::test]
async fn test_indicators_refuse_partial_warmup() {
    // 20 bars is below the slowest warm-up, so no signal may be produced
    let state = state_with(&[("EURUSD", 20)]).await;

    let (status, _) = get(&state, "/indicators/EURUSD").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_indicators_missing_symbol_is_404() {
    let state = state_with(&[]).await;

    let (status, _) = get(&state, "/indicators/EURUSD").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_prices_for_requested_symbols() {
    let state = state_with(&[("EURUSD", 5), ("GBPUSD", 5)]).await;

    let (status, body) = get(&state, "/prices?symbols=EURUSD,GBPUSD").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["EURUSD"]["bid"].is_number());
    assert!(body["GBPUSD"]["ask"].is_number());
}

#[tokio::test]
async fn test_subscribe_lifecycle() {
    let state = state_with(&[("EURUSD", 50)]).await;

    let (status, body) = send(&state, "POST", "/subscribe/EURUSD", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "subscribed");

    let (_, body) = send(&state, "POST", "/subscribe/EURUSD", json!({})).await;
    assert_eq!(body["status"], "already_subscribed");

    let (_, body) = get(&state, "/status").await;
    assert_eq!(body["active_strategies"], 1);

    let (status, body) = send(&state, "DELETE", "/subscribe/EURUSD", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unsubscribed");

    let (_, body) = get(&state, "/status").await;
    assert_eq!(body["active_strategies"], 0);
}
