//! Signal types shared by the scoring policies.

use serde::{Deserialize, Serialize};

/// Classified trading action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalAction::Buy => write!(f, "BUY"),
            SignalAction::Sell => write!(f, "SELL"),
            SignalAction::Hold => write!(f, "HOLD"),
        }
    }
}

/// Per-indicator signal contributions.
///
/// Each component is bearish/neutral/bullish; the RSI component may carry a
/// double weight depending on the scoring policy that filled it in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalVector {
    pub ema_cross: i8,
    pub rsi: i8,
    pub macd: i8,
    pub bb: i8,
}

impl SignalVector {
    /// Sum of the contributions.
    pub fn strength(&self) -> i32 {
        self.ema_cross as i32 + self.rsi as i32 + self.macd as i32 + self.bb as i32
    }
}
