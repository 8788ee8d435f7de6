//! Technical indicators for the traderd daemon.
//!
//! This crate provides the indicators the signal pipeline is built from:
//! - Moving averages (SMA, EMA)
//! - Momentum indicators (RSI, MACD)
//! - Volatility indicators (ATR, Bollinger Bands)
//!
//! Every indicator has a batch path (one pass over a historical slice) and a
//! streaming path (one new bar at a time). The two paths perform the same
//! arithmetic in the same order, so they produce identical output sequences
//! for the same input.

pub mod engine;
pub mod momentum;
pub mod moving_average;
pub mod volatility;

pub use engine::{IndicatorEngine, IndicatorParams, IndicatorSnapshot};
pub use momentum::{Macd, MacdOutput, Rsi, StreamingMacd, StreamingRsi};
pub use moving_average::{Ema, Sma, StreamingEma, StreamingSma};
pub use volatility::{Atr, BollingerBands, BollingerOutput, StreamingAtr, StreamingBollinger};
