//! Signal scoring and the live trading strategy.
//!
//! Two scoring policies are kept deliberately separate:
//! - [`IndicatorScorer`] classifies a full indicator snapshot into
//!   BUY/SELL/HOLD with a confidence, for the HTTP surface.
//! - [`EntrySignals`] is the stricter per-indicator vote used by
//!   [`TechnicalStrategy`] to gate live entries.

mod runner;
mod scorer;
mod technical;

pub use runner::StrategyRunner;
pub use scorer::{EntrySignals, IndicatorScorer, ScoredSignal};
pub use technical::{OpenTrade, StrategyParams, StrategyState, TechnicalStrategy};
