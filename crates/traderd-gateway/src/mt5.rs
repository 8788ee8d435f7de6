//! MetaTrader 5 gateway over a local REST bridge agent.
//!
//! The bridge agent runs next to the MT5 terminal and exposes its market
//! data and trade operations as plain HTTP endpoints; this client maps them
//! onto the [`MarketGateway`] trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};
use traderd_core::error::GatewayError;
use traderd_core::traits::MarketGateway;
use traderd_core::types::{
    AccountSnapshot, Bar, OpenPosition, OrderAck, PriceTick, Side, Timeframe,
};

/// Bridge connection configuration.
#[derive(Debug, Clone)]
pub struct Mt5Config {
    pub bridge_url: String,
    pub login: i64,
    pub password: String,
    pub server: String,
}

impl Mt5Config {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self, GatewayError> {
        let login = std::env::var("MT5_LOGIN")
            .map_err(|_| GatewayError::Configuration("MT5_LOGIN not set".into()))?
            .parse::<i64>()
            .map_err(|_| GatewayError::Configuration("MT5_LOGIN must be numeric".into()))?;
        let password = std::env::var("MT5_PASSWORD")
            .map_err(|_| GatewayError::Configuration("MT5_PASSWORD not set".into()))?;
        let server = std::env::var("MT5_SERVER")
            .map_err(|_| GatewayError::Configuration("MT5_SERVER not set".into()))?;
        let bridge_url = std::env::var("MT5_BRIDGE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:6542".to_string());

        Ok(Self {
            bridge_url,
            login,
            password,
            server,
        })
    }
}

/// Bridge API response types
#[derive(Debug, Deserialize)]
struct BridgeBar {
    /// Unix seconds
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    tick_volume: f64,
}

#[derive(Debug, Deserialize)]
struct BridgeTick {
    bid: f64,
    ask: f64,
    last: f64,
    volume: f64,
    time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct BridgeAccount {
    login: i64,
    server: String,
    balance: Decimal,
    equity: Decimal,
    margin: Decimal,
    margin_free: Decimal,
    margin_level: f64,
    profit: Decimal,
    leverage: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct BridgePosition {
    ticket: i64,
    symbol: String,
    #[serde(rename = "type")]
    position_type: String,
    volume: Decimal,
    price_open: f64,
    price_current: f64,
    sl: Option<f64>,
    tp: Option<f64>,
    profit: Decimal,
    #[allow(dead_code)]
    swap: Option<Decimal>,
    time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ConnectRequest<'a> {
    login: i64,
    password: &'a str,
    server: &'a str,
}

#[derive(Debug, Serialize)]
struct OrderRequestBody<'a> {
    symbol: &'a str,
    side: &'a str,
    volume: Decimal,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    order: i64,
    price: f64,
    time: DateTime<Utc>,
    #[allow(dead_code)]
    retcode: Option<i64>,
}

/// MT5 gateway client.
pub struct Mt5Gateway {
    config: Mt5Config,
    client: Client,
    connected: AtomicBool,
}

impl Mt5Gateway {
    /// Create a gateway client for the configured bridge.
    pub fn new(config: Mt5Config) -> Self {
        Self {
            config,
            client: Client::new(),
            connected: AtomicBool::new(false),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.bridge_url, path)
    }

    fn ensure_connected(&self) -> Result<(), GatewayError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(GatewayError::NotConnected);
        }
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(GatewayError::Api(format!("{status}: {body}")))
        }
    }
}

#[async_trait]
impl MarketGateway for Mt5Gateway {
    async fn connect(&self) -> Result<(), GatewayError> {
        let request = ConnectRequest {
            login: self.config.login,
            password: &self.config.password,
            server: &self.config.server,
        };

        let response = self
            .client
            .post(self.endpoint("/connect"))
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        Self::check_status(response).await?;

        self.connected.store(true, Ordering::SeqCst);

        let account = self.account_info().await?;
        info!(
            login = account.login,
            server = %account.server,
            balance = %account.balance,
            leverage = account.leverage,
            "connected to MT5 bridge"
        );

        Ok(())
    }

    async fn disconnect(&self) -> Result<(), GatewayError> {
        if !self.connected.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let response = self
            .client
            .post(self.endpoint("/disconnect"))
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        Self::check_status(response).await?;

        info!("disconnected from MT5 bridge");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn historical_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Bar>, GatewayError> {
        self.ensure_connected()?;

        let response = self
            .client
            .get(self.endpoint("/bars"))
            .query(&[
                ("symbol", symbol),
                ("timeframe", &timeframe.to_string()),
                ("count", &count.to_string()),
            ])
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let bridge_bars: Vec<BridgeBar> = response
            .json()
            .await
            .map_err(|e| GatewayError::Api(e.to_string()))?;

        debug!(symbol, count = bridge_bars.len(), "fetched bars");

        Ok(bridge_bars
            .into_iter()
            .map(|b| {
                Bar::new(
                    b.time * 1000,
                    b.open,
                    b.high,
                    b.low,
                    b.close,
                    b.tick_volume,
                )
            })
            .collect())
    }

    async fn current_ticks(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, PriceTick>, GatewayError> {
        self.ensure_connected()?;

        let response = self
            .client
            .get(self.endpoint("/ticks"))
            .query(&[("symbols", symbols.join(","))])
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let bridge_ticks: HashMap<String, BridgeTick> = response
            .json()
            .await
            .map_err(|e| GatewayError::Api(e.to_string()))?;

        Ok(bridge_ticks
            .into_iter()
            .map(|(symbol, t)| {
                (
                    symbol,
                    PriceTick {
                        bid: t.bid,
                        ask: t.ask,
                        last: t.last,
                        volume: t.volume,
                        time: t.time,
                    },
                )
            })
            .collect())
    }

    async fn account_info(&self) -> Result<AccountSnapshot, GatewayError> {
        self.ensure_connected()?;

        let response = self
            .client
            .get(self.endpoint("/account"))
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let account: BridgeAccount = response
            .json()
            .await
            .map_err(|e| GatewayError::Api(e.to_string()))?;

        Ok(AccountSnapshot {
            login: account.login,
            server: account.server,
            balance: account.balance,
            equity: account.equity,
            margin: account.margin,
            free_margin: account.margin_free,
            margin_level: account.margin_level,
            profit: account.profit,
            leverage: account.leverage,
            currency: account.currency,
        })
    }

    async fn open_positions(&self) -> Result<Vec<OpenPosition>, GatewayError> {
        self.ensure_connected()?;

        let response = self
            .client
            .get(self.endpoint("/positions"))
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let positions: Vec<BridgePosition> = response
            .json()
            .await
            .map_err(|e| GatewayError::Api(e.to_string()))?;

        Ok(positions
            .into_iter()
            .map(|p| OpenPosition {
                ticket: p.ticket,
                symbol: p.symbol,
                side: if p.position_type == "SELL" {
                    Side::Sell
                } else {
                    Side::Buy
                },
                volume: p.volume,
                price_open: p.price_open,
                price_current: p.price_current,
                stop_loss: p.sl,
                take_profit: p.tp,
                profit: p.profit,
                time: p.time,
            })
            .collect())
    }

    async fn submit_market_order(
        &self,
        symbol: &str,
        side: Side,
        volume: Decimal,
    ) -> Result<OrderAck, GatewayError> {
        self.ensure_connected()?;

        let body = OrderRequestBody {
            symbol,
            side: match side {
                Side::Buy => "BUY",
                Side::Sell => "SELL",
            },
            volume,
        };

        let response = self
            .client
            .post(self.endpoint("/order"))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::OrderRejected(e.to_string()))?;

        info!(
            symbol,
            %side,
            %volume,
            order = order.order,
            price = order.price,
            "order filled"
        );

        Ok(OrderAck {
            order_id: order.order.to_string(),
            symbol: symbol.to_string(),
            side,
            volume,
            price: order.price,
            time: order.time,
        })
    }

    fn name(&self) -> &str {
        "mt5"
    }
}
