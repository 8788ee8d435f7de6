//! Market gateway trait definition.
//!
//! The gateway is the daemon's single external collaborator: it provides
//! historical bars and current ticks, reports account state, and executes
//! orders. Everything else in the system treats it as opaque.

use crate::error::GatewayError;
use crate::types::{AccountSnapshot, Bar, OpenPosition, OrderAck, PriceTick, Side, Timeframe};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Trait for market data/execution gateways.
#[async_trait]
pub trait MarketGateway: Send + Sync {
    /// Establish the gateway session.
    async fn connect(&self) -> Result<(), GatewayError>;

    /// Tear down the gateway session.
    async fn disconnect(&self) -> Result<(), GatewayError>;

    /// Whether the gateway session is currently established.
    fn is_connected(&self) -> bool;

    /// Fetch the most recent `count` bars for a symbol, oldest first.
    async fn historical_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Bar>, GatewayError>;

    /// Fetch current price ticks for a set of symbols.
    ///
    /// Symbols with no tick data are absent from the result.
    async fn current_ticks(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, PriceTick>, GatewayError>;

    /// Fetch account information.
    async fn account_info(&self) -> Result<AccountSnapshot, GatewayError>;

    /// Fetch all open positions.
    async fn open_positions(&self) -> Result<Vec<OpenPosition>, GatewayError>;

    /// Submit a market order and wait for the gateway's acknowledgment.
    async fn submit_market_order(
        &self,
        symbol: &str,
        side: Side,
        volume: Decimal,
    ) -> Result<OrderAck, GatewayError>;

    /// Get the gateway name.
    fn name(&self) -> &str;
}
