//! Core data types for the traderd daemon.

mod bar;
mod market;
mod signal;
mod timeframe;

pub use bar::{Bar, BarSeries};
pub use market::{
    AccountSnapshot, BarEvent, OpenPosition, OrderAck, PriceTick, Side, TickEvent,
};
pub use signal::{SignalAction, SignalVector};
pub use timeframe::Timeframe;
