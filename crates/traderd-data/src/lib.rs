//! Data plumbing for the traderd daemon.
//!
//! The subscription poller turns the gateway's pull-based bar/tick fetches
//! into explicit event producers over tokio channels; the CSV source loads
//! historical bars for offline backtests.

mod csv_source;
mod poller;

pub use csv_source::CsvBarSource;
pub use poller::{PollerConfig, Subscriptions};
