//! Multi-indicator technical strategy for the live path.
//!
//! The strategy composes an [`IndicatorEngine`] and a [`MarketGateway`]
//! reference; it owns its open trade exclusively and destroys it on exit.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use traderd_core::error::StrategyError;
use traderd_core::traits::MarketGateway;
use traderd_core::types::{Bar, Side, SignalVector};
use traderd_indicators::{IndicatorEngine, IndicatorParams, IndicatorSnapshot};

use crate::scorer::EntrySignals;

/// Strategy parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Fraction of the account balance risked per trade
    pub risk_per_trade: f64,
    /// Indicator parameter set
    pub indicators: IndicatorParams,
    /// Stop-loss distance in ATR multiples
    pub stop_atr: f64,
    /// Take-profit distance in ATR multiples
    pub take_atr: f64,
    /// Per-point value of one lot
    pub tick_value: f64,
    /// Volume granularity
    pub lot_step: f64,
    /// Smallest tradable volume
    pub min_lot: f64,
    /// Largest tradable volume
    pub max_lot: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            risk_per_trade: 0.02,
            indicators: IndicatorParams::default(),
            stop_atr: 2.0,
            take_atr: 3.0,
            tick_value: 10.0,
            lot_step: 0.01,
            min_lot: 0.01,
            max_lot: 1.0,
        }
    }
}

/// An open trade owned by the strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OpenTrade {
    pub side: Side,
    pub entry_price: f64,
    pub volume: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Strategy state for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyState {
    pub symbol: String,
    pub is_warmed_up: bool,
    pub bars_processed: usize,
    pub in_position: bool,
    pub signals: SignalVector,
}

enum Decision {
    Enter(Side),
    Exit(&'static str),
    None,
}

/// Multi-indicator technical strategy.
pub struct TechnicalStrategy {
    symbol: String,
    params: StrategyParams,
    engine: IndicatorEngine,
    gateway: Arc<dyn MarketGateway>,
    trade: Option<OpenTrade>,
    signals: SignalVector,
    bars_processed: usize,
}

impl TechnicalStrategy {
    /// Create a strategy for one symbol.
    pub fn new(symbol: String, params: StrategyParams, gateway: Arc<dyn MarketGateway>) -> Self {
        let engine = IndicatorEngine::with_params(params.indicators.clone());
        Self {
            symbol,
            params,
            engine,
            gateway,
            trade: None,
            signals: SignalVector::default(),
            bars_processed: 0,
        }
    }

    /// Process one newly closed bar.
    pub async fn on_bar(&mut self, bar: &Bar) -> Result<(), StrategyError> {
        self.bars_processed += 1;
        self.engine.update(bar);

        let snapshot = match self.engine.snapshot() {
            Some(snapshot) => snapshot,
            None => {
                debug!(
                    symbol = %self.symbol,
                    bars = self.bars_processed,
                    "warming up"
                );
                return Ok(());
            }
        };

        self.signals = EntrySignals::evaluate(&snapshot);

        match self.decide(bar.close) {
            Decision::Enter(side) => self.enter(side, bar, &snapshot).await,
            Decision::Exit(reason) => self.exit(bar, reason).await,
            Decision::None => Ok(()),
        }
    }

    /// Pick the next action from the current votes and an open trade, if any.
    fn decide(&self, close: f64) -> Decision {
        match &self.trade {
            None => {
                let strength = self.signals.strength();
                if strength >= EntrySignals::ENTRY_THRESHOLD {
                    Decision::Enter(Side::Buy)
                } else if strength <= -EntrySignals::ENTRY_THRESHOLD {
                    Decision::Enter(Side::Sell)
                } else {
                    Decision::None
                }
            }
            Some(trade) => match Self::exit_reason(trade, close, &self.signals) {
                Some(reason) => Decision::Exit(reason),
                None => Decision::None,
            },
        }
    }

    fn exit_reason(trade: &OpenTrade, close: f64, signals: &SignalVector) -> Option<&'static str> {
        match trade.side {
            Side::Buy => {
                if close <= trade.stop_loss {
                    Some("stop loss")
                } else if close >= trade.take_profit {
                    Some("take profit")
                } else if signals.ema_cross == -1 && signals.macd == -1 {
                    Some("reversal")
                } else {
                    None
                }
            }
            Side::Sell => {
                if close >= trade.stop_loss {
                    Some("stop loss")
                } else if close <= trade.take_profit {
                    Some("take profit")
                } else if signals.ema_cross == 1 && signals.macd == 1 {
                    Some("reversal")
                } else {
                    None
                }
            }
        }
    }

    /// Volume from balance, risk fraction, and the ATR stop distance,
    /// rounded to the lot step and clamped to the tradable range.
    fn position_volume(&self, balance: f64, atr: f64) -> f64 {
        let risk_amount = balance * self.params.risk_per_trade;
        let stop_distance = atr * self.params.stop_atr;

        let raw = if stop_distance > 0.0 {
            risk_amount / (stop_distance * self.params.tick_value)
        } else {
            self.params.min_lot
        };

        let stepped = (raw / self.params.lot_step).round() * self.params.lot_step;
        stepped.clamp(self.params.min_lot, self.params.max_lot)
    }

    async fn enter(
        &mut self,
        side: Side,
        bar: &Bar,
        snapshot: &IndicatorSnapshot,
    ) -> Result<(), StrategyError> {
        let account = self
            .gateway
            .account_info()
            .await
            .map_err(|e| StrategyError::Internal(e.to_string()))?;
        let balance = account.balance.to_f64().unwrap_or(0.0);

        let volume = self.position_volume(balance, snapshot.atr_14);
        let volume_dec = Decimal::from_f64(volume)
            .ok_or_else(|| StrategyError::Internal(format!("invalid volume {volume}")))?;

        self.gateway
            .submit_market_order(&self.symbol, side, volume_dec)
            .await
            .map_err(|e| StrategyError::Internal(e.to_string()))?;

        let stop_distance = snapshot.atr_14 * self.params.stop_atr;
        let take_distance = snapshot.atr_14 * self.params.take_atr;
        let (stop_loss, take_profit) = match side {
            Side::Buy => (bar.close - stop_distance, bar.close + take_distance),
            Side::Sell => (bar.close + stop_distance, bar.close - take_distance),
        };

        self.trade = Some(OpenTrade {
            side,
            entry_price: bar.close,
            volume,
            stop_loss,
            take_profit,
        });

        info!(
            symbol = %self.symbol,
            %side,
            price = bar.close,
            volume,
            stop_loss,
            take_profit,
            "entered position"
        );

        Ok(())
    }

    async fn exit(&mut self, bar: &Bar, reason: &str) -> Result<(), StrategyError> {
        let trade = match self.trade.take() {
            Some(trade) => trade,
            None => return Ok(()),
        };

        let volume_dec = Decimal::from_f64(trade.volume)
            .ok_or_else(|| StrategyError::Internal(format!("invalid volume {}", trade.volume)))?;

        let close_side = trade.side.opposite();
        let result = self
            .gateway
            .submit_market_order(&self.symbol, close_side, volume_dec)
            .await;

        if let Err(e) = result {
            // Keep the trade so the next bar retries the exit
            self.trade = Some(trade);
            return Err(StrategyError::Internal(e.to_string()));
        }

        let pnl = (bar.close - trade.entry_price) * trade.side.sign() * trade.volume;
        info!(
            symbol = %self.symbol,
            reason,
            price = bar.close,
            pnl,
            "closed position"
        );

        Ok(())
    }

    /// The symbol this strategy trades.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The currently open trade, if any.
    pub fn open_trade(&self) -> Option<&OpenTrade> {
        self.trade.as_ref()
    }

    /// Current state for monitoring.
    pub fn state(&self) -> StrategyState {
        StrategyState {
            symbol: self.symbol.clone(),
            is_warmed_up: self.engine.is_ready(),
            bars_processed: self.bars_processed,
            in_position: self.trade.is_some(),
            signals: self.signals,
        }
    }

    /// Reset all strategy state.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.trade = None;
        self.signals = SignalVector::default();
        self.bars_processed = 0;
    }
}
