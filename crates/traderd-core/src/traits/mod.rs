//! Core traits for the traderd daemon.

mod gateway;
mod indicator;

pub use gateway::MarketGateway;
pub use indicator::{Indicator, MultiOutputIndicator, StreamingIndicator};
