//! Core types and traits for the traderd daemon.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries, PriceTick)
//! - Gateway-facing account and position snapshots
//! - Signal types shared by the scoring policies
//! - Core traits for indicators and the market gateway

pub mod types;
pub mod traits;
pub mod error;

pub use error::{TradingError, TradingResult};
pub use types::*;
pub use traits::*;
