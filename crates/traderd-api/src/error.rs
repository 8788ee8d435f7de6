//! JSON error mapping for the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use traderd_core::error::{BacktestError, GatewayError, IndicatorError};

/// Error type returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> &str {
        match self {
            ApiError::BadRequest(detail)
            | ApiError::NotFound(detail)
            | ApiError::Internal(detail) => detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::SymbolNotFound(symbol) => {
                ApiError::NotFound(format!("Symbol not found: {symbol}"))
            }
            GatewayError::NoData(symbol) => ApiError::NotFound(format!("No data for {symbol}")),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<BacktestError> for ApiError {
    fn from(e: BacktestError) -> Self {
        match e {
            BacktestError::NoData(symbol) => ApiError::NotFound(format!("No data for {symbol}")),
            BacktestError::InvalidPeriod(period) => {
                ApiError::BadRequest(format!("Invalid period: {period}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<IndicatorError> for ApiError {
    fn from(e: IndicatorError) -> Self {
        // Not enough history behaves like missing data: never a signal from
        // a partially warmed-up engine
        ApiError::NotFound(e.to_string())
    }
}
