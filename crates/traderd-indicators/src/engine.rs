//! Streaming indicator engine.
//!
//! Aggregates the full indicator set for one symbol and produces a
//! [`IndicatorSnapshot`] once every member indicator has seen enough bars.
//! A snapshot is never produced from a partially warmed-up engine.

use serde::{Deserialize, Serialize};
use traderd_core::error::IndicatorError;
use traderd_core::traits::StreamingIndicator;
use traderd_core::types::{Bar, BarSeries};

use crate::momentum::{StreamingMacd, StreamingRsi};
use crate::moving_average::{StreamingEma, StreamingSma};
use crate::volatility::{BollingerOutput, StreamingAtr, StreamingBollinger};

/// Indicator parameter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub sma_period: usize,
    pub fast_ema_period: usize,
    pub slow_ema_period: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    pub macd_signal_period: usize,
    pub bb_period: usize,
    pub bb_std: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_period: 20,
            fast_ema_period: 12,
            slow_ema_period: 26,
            rsi_period: 14,
            atr_period: 14,
            macd_signal_period: 9,
            bb_period: 20,
            bb_std: 2.0,
        }
    }
}

/// Indicator values as of the latest bar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub sma_20: f64,
    pub ema_12: f64,
    pub ema_26: f64,
    pub rsi_14: f64,
    /// MACD line (fast EMA - slow EMA)
    pub macd: f64,
    /// Signal line (EMA of the MACD line)
    pub macd_signal: f64,
    pub atr_14: f64,
    pub bollinger: BollingerOutput,
    pub current_price: f64,
}

/// Streaming aggregator over the full indicator set.
pub struct IndicatorEngine {
    params: IndicatorParams,
    sma: StreamingSma,
    ema_fast: StreamingEma,
    ema_slow: StreamingEma,
    rsi: StreamingRsi,
    macd: StreamingMacd,
    atr: StreamingAtr,
    bb: StreamingBollinger,
    last_close: Option<f64>,
    bars_seen: usize,
}

impl IndicatorEngine {
    /// Create an engine with the standard parameter set.
    pub fn new() -> Self {
        Self::with_params(IndicatorParams::default())
    }

    /// Create an engine with custom parameters.
    pub fn with_params(params: IndicatorParams) -> Self {
        Self {
            sma: StreamingSma::new(params.sma_period),
            ema_fast: StreamingEma::new(params.fast_ema_period),
            ema_slow: StreamingEma::new(params.slow_ema_period),
            rsi: StreamingRsi::new(params.rsi_period),
            macd: StreamingMacd::with_periods(
                params.fast_ema_period,
                params.slow_ema_period,
                params.macd_signal_period,
            ),
            atr: StreamingAtr::new(params.atr_period),
            bb: StreamingBollinger::with_params(params.bb_period, params.bb_std),
            last_close: None,
            bars_seen: 0,
            params,
        }
    }

    /// Update every indicator with a new bar.
    pub fn update(&mut self, bar: &Bar) {
        self.bars_seen += 1;
        self.last_close = Some(bar.close);

        self.sma.update(bar.close);
        self.ema_fast.update(bar.close);
        self.ema_slow.update(bar.close);
        self.rsi.update(bar.close);
        self.macd.update(bar.close);
        self.atr.update(bar);
        self.bb.update(bar.close);
    }

    /// Check if every indicator has enough data.
    pub fn is_ready(&self) -> bool {
        self.sma.is_ready()
            && self.ema_fast.is_ready()
            && self.ema_slow.is_ready()
            && self.rsi.is_ready()
            && self.macd.is_ready()
            && self.atr.is_ready()
            && self.bb.is_ready()
    }

    /// Number of bars needed before the engine is ready.
    pub fn warmup_period(&self) -> usize {
        let macd_warmup = self.params.slow_ema_period + self.params.macd_signal_period - 1;
        self.params
            .sma_period
            .max(self.params.slow_ema_period)
            .max(self.params.rsi_period + 1)
            .max(self.params.atr_period + 1)
            .max(self.params.bb_period)
            .max(macd_warmup)
    }

    /// Number of bars processed so far.
    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }

    /// Current indicator set, or None while any indicator is warming up.
    pub fn snapshot(&self) -> Option<IndicatorSnapshot> {
        if !self.is_ready() {
            return None;
        }

        let macd = self.macd.current()?;
        Some(IndicatorSnapshot {
            sma_20: self.sma.current()?,
            ema_12: self.ema_fast.current()?,
            ema_26: self.ema_slow.current()?,
            rsi_14: self.rsi.current()?,
            macd: macd.macd,
            macd_signal: macd.signal,
            atr_14: self.atr.current()?,
            bollinger: self.bb.current()?,
            current_price: self.last_close?,
        })
    }

    /// Reset every indicator.
    pub fn reset(&mut self) {
        self.sma.reset();
        self.ema_fast.reset();
        self.ema_slow.reset();
        self.rsi.reset();
        self.macd.reset();
        self.atr.reset();
        self.bb.reset();
        self.last_close = None;
        self.bars_seen = 0;
    }

    /// One-shot evaluation over a full series.
    ///
    /// Replays the series through a fresh engine, so the result is identical
    /// to what the streaming path would have produced bar by bar.
    pub fn evaluate_series(series: &BarSeries) -> Result<IndicatorSnapshot, IndicatorError> {
        Self::evaluate_series_with(series, IndicatorParams::default())
    }

    /// One-shot evaluation with custom parameters.
    pub fn evaluate_series_with(
        series: &BarSeries,
        params: IndicatorParams,
    ) -> Result<IndicatorSnapshot, IndicatorError> {
        let mut engine = Self::with_params(params);
        for bar in series.iter() {
            engine.update(bar);
        }
        engine.snapshot().ok_or(IndicatorError::InsufficientData {
            required: engine.warmup_period(),
            available: series.len(),
        })
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new()
    }
}
