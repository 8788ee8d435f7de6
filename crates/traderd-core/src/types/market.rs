//! Gateway-facing market data, account, and order types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Bar, Timeframe};

/// Order/position side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Get the sign for position calculations (+1 for buy, -1 for sell).
    pub fn sign(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A point-in-time price snapshot for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTick {
    /// Best bid price
    pub bid: f64,
    /// Best ask price
    pub ask: f64,
    /// Last traded price
    pub last: f64,
    /// Tick volume
    pub volume: f64,
    /// Tick time
    pub time: DateTime<Utc>,
}

impl PriceTick {
    /// Get the spread.
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    /// Get the mid price.
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }
}

/// Account state as reported by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub login: i64,
    pub server: String,
    pub balance: Decimal,
    pub equity: Decimal,
    pub margin: Decimal,
    pub free_margin: Decimal,
    pub margin_level: f64,
    pub profit: Decimal,
    pub leverage: i64,
    pub currency: String,
}

/// An open position as reported by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPosition {
    pub ticket: i64,
    pub symbol: String,
    pub side: Side,
    pub volume: Decimal,
    pub price_open: f64,
    pub price_current: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub profit: Decimal,
    pub time: DateTime<Utc>,
}

/// Synchronous acknowledgment for a submitted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAck {
    /// Gateway-assigned order identifier
    pub order_id: String,
    pub symbol: String,
    pub side: Side,
    pub volume: Decimal,
    /// Fill price reported by the gateway
    pub price: f64,
    pub time: DateTime<Utc>,
}

/// A newly observed bar close, emitted by the subscription poller.
#[derive(Debug, Clone)]
pub struct BarEvent {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub bar: Bar,
}

/// A newly observed tick, emitted by the tick poller.
#[derive(Debug, Clone)]
pub struct TickEvent {
    pub symbol: String,
    pub tick: PriceTick,
}
