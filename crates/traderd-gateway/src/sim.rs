//! Simulated gateway for tests and offline runs.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use traderd_core::error::GatewayError;
use traderd_core::traits::MarketGateway;
use traderd_core::types::{
    AccountSnapshot, Bar, OpenPosition, OrderAck, PriceTick, Side, Timeframe,
};
use uuid::Uuid;

const SIM_SPREAD: f64 = 0.0002;

struct SimState {
    bars: HashMap<String, Vec<Bar>>,
    balance: Decimal,
    positions: Vec<OpenPosition>,
    next_ticket: i64,
}

/// In-memory gateway with preloaded bars and instant fills.
pub struct SimGateway {
    state: Mutex<SimState>,
    connected: AtomicBool,
}

impl SimGateway {
    /// Create a simulated gateway with the default balance.
    pub fn new() -> Self {
        Self::with_balance(dec!(10000))
    }

    /// Create with an explicit starting balance.
    pub fn with_balance(balance: Decimal) -> Self {
        Self {
            state: Mutex::new(SimState {
                bars: HashMap::new(),
                balance,
                positions: Vec::new(),
                next_ticket: 1,
            }),
            connected: AtomicBool::new(false),
        }
    }

    /// Preload the bar history for a symbol.
    pub fn load_bars(&self, symbol: &str, bars: Vec<Bar>) {
        self.state
            .lock()
            .unwrap()
            .bars
            .insert(symbol.to_string(), bars);
    }

    /// Append one bar to a symbol's history, as a live feed would.
    pub fn push_bar(&self, symbol: &str, bar: Bar) {
        self.state
            .lock()
            .unwrap()
            .bars
            .entry(symbol.to_string())
            .or_default()
            .push(bar);
    }

    fn last_close(state: &SimState, symbol: &str) -> Option<Bar> {
        state.bars.get(symbol).and_then(|bars| bars.last()).copied()
    }
}

impl Default for SimGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketGateway for SimGateway {
    async fn connect(&self) -> Result<(), GatewayError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), GatewayError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn historical_bars(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Bar>, GatewayError> {
        if !self.is_connected() {
            return Err(GatewayError::NotConnected);
        }

        let state = self.state.lock().unwrap();
        let bars = match state.bars.get(symbol) {
            Some(bars) => bars,
            None => return Ok(vec![]),
        };

        let start = bars.len().saturating_sub(count);
        Ok(bars[start..].to_vec())
    }

    async fn current_ticks(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, PriceTick>, GatewayError> {
        if !self.is_connected() {
            return Err(GatewayError::NotConnected);
        }

        let state = self.state.lock().unwrap();
        let mut ticks = HashMap::new();

        for symbol in symbols {
            if let Some(bar) = Self::last_close(&state, symbol) {
                let half_spread = SIM_SPREAD / 2.0;
                ticks.insert(
                    symbol.clone(),
                    PriceTick {
                        bid: bar.close - half_spread,
                        ask: bar.close + half_spread,
                        last: bar.close,
                        volume: bar.volume,
                        time: bar.datetime(),
                    },
                );
            }
        }

        Ok(ticks)
    }

    async fn account_info(&self) -> Result<AccountSnapshot, GatewayError> {
        if !self.is_connected() {
            return Err(GatewayError::NotConnected);
        }

        let state = self.state.lock().unwrap();
        let profit: Decimal = state.positions.iter().map(|p| p.profit).sum();

        Ok(AccountSnapshot {
            login: 0,
            server: "simulated".to_string(),
            balance: state.balance,
            equity: state.balance + profit,
            margin: dec!(0),
            free_margin: state.balance,
            margin_level: 0.0,
            profit,
            leverage: 100,
            currency: "USD".to_string(),
        })
    }

    async fn open_positions(&self) -> Result<Vec<OpenPosition>, GatewayError> {
        if !self.is_connected() {
            return Err(GatewayError::NotConnected);
        }

        Ok(self.state.lock().unwrap().positions.clone())
    }

    async fn submit_market_order(
        &self,
        symbol: &str,
        side: Side,
        volume: Decimal,
    ) -> Result<OrderAck, GatewayError> {
        if !self.is_connected() {
            return Err(GatewayError::NotConnected);
        }

        let mut state = self.state.lock().unwrap();
        let bar = Self::last_close(&state, symbol)
            .ok_or_else(|| GatewayError::NoData(symbol.to_string()))?;
        let fill_price = bar.close;

        // Net against an opposite open position first, otherwise open a new one
        let opposite = state
            .positions
            .iter()
            .position(|p| p.symbol == symbol && p.side == side.opposite());

        match opposite {
            Some(index) => {
                let closed = state.positions.remove(index);
                let direction = match closed.side {
                    Side::Buy => 1.0,
                    Side::Sell => -1.0,
                };
                let pnl = (fill_price - closed.price_open) * direction;
                let pnl = Decimal::from_f64(pnl).unwrap_or(dec!(0)) * closed.volume;
                state.balance += pnl;
            }
            None => {
                let ticket = state.next_ticket;
                state.next_ticket += 1;
                state.positions.push(OpenPosition {
                    ticket,
                    symbol: symbol.to_string(),
                    side,
                    volume,
                    price_open: fill_price,
                    price_current: fill_price,
                    stop_loss: None,
                    take_profit: None,
                    profit: dec!(0),
                    time: Utc::now(),
                });
            }
        }

        Ok(OrderAck {
            order_id: Uuid::new_v4().to_string(),
            symbol: symbol.to_string(),
            side,
            volume,
            price: fill_price,
            time: Utc::now(),
        })
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
