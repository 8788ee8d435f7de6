//! Command implementations.

pub mod backtest;
pub mod serve;
pub mod validate;
