//! Signal scoring policies.

use serde::{Deserialize, Serialize};
use traderd_core::types::{SignalAction, SignalVector};
use traderd_indicators::IndicatorSnapshot;

/// A classified signal with its score breakdown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoredSignal {
    pub action: SignalAction,
    /// Confidence in [0, 100]
    pub confidence: f64,
    pub score: i32,
    pub vector: SignalVector,
}

/// Additive scorer over a full indicator snapshot.
///
/// The RSI contribution carries double weight, so the total score stays in
/// [-5, +5]. A total of +2 or more classifies as BUY, -2 or less as SELL,
/// anything in between as HOLD.
#[derive(Debug, Clone)]
pub struct IndicatorScorer {
    rsi_oversold: f64,
    rsi_overbought: f64,
}

impl IndicatorScorer {
    /// Create a scorer with the standard 30/70 RSI thresholds.
    pub fn new() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }

    /// Score a snapshot into an action and confidence.
    pub fn score(&self, snapshot: &IndicatorSnapshot) -> ScoredSignal {
        let mut vector = SignalVector::default();

        // RSI, double-weighted
        if snapshot.rsi_14 < self.rsi_oversold {
            vector.rsi = 2;
        } else if snapshot.rsi_14 > self.rsi_overbought {
            vector.rsi = -2;
        }

        // EMA crossover
        vector.ema_cross = if snapshot.ema_12 > snapshot.ema_26 {
            1
        } else {
            -1
        };

        // MACD line against zero
        vector.macd = if snapshot.macd > 0.0 { 1 } else { -1 };

        // Bollinger band touch
        if snapshot.current_price <= snapshot.bollinger.lower {
            vector.bb = 1;
        } else if snapshot.current_price >= snapshot.bollinger.upper {
            vector.bb = -1;
        }

        let score = vector.strength();
        let (action, confidence) = if score >= 2 {
            (SignalAction::Buy, (score as f64 * 20.0).min(100.0))
        } else if score <= -2 {
            (SignalAction::Sell, (score.abs() as f64 * 20.0).min(100.0))
        } else {
            (SignalAction::Hold, 50.0)
        };

        ScoredSignal {
            action,
            confidence,
            score,
            vector,
        }
    }
}

impl Default for IndicatorScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-indicator entry votes for the live strategy.
///
/// Every component contributes exactly -1, 0, or +1; an entry requires a
/// total strength of at least +3 (long) or at most -3 (short). This is a
/// stricter, separately tuned policy from [`IndicatorScorer`].
pub struct EntrySignals;

impl EntrySignals {
    /// Strength required to trigger an entry.
    pub const ENTRY_THRESHOLD: i32 = 3;

    /// Evaluate the entry votes for a snapshot.
    pub fn evaluate(snapshot: &IndicatorSnapshot) -> SignalVector {
        let mut vector = SignalVector::default();

        vector.ema_cross = if snapshot.ema_12 > snapshot.ema_26 {
            1
        } else if snapshot.ema_12 < snapshot.ema_26 {
            -1
        } else {
            0
        };

        if snapshot.rsi_14 < 30.0 {
            vector.rsi = 1;
        } else if snapshot.rsi_14 > 70.0 {
            vector.rsi = -1;
        }

        // MACD line against its signal line
        vector.macd = if snapshot.macd > snapshot.macd_signal {
            1
        } else if snapshot.macd < snapshot.macd_signal {
            -1
        } else {
            0
        };

        if snapshot.current_price <= snapshot.bollinger.lower {
            vector.bb = 1;
        } else if snapshot.current_price >= snapshot.bollinger.upper {
            vector.bb = -1;
        }

        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traderd_indicators::BollingerOutput;

    fn snapshot(
        rsi: f64,
        ema_12: f64,
        ema_26: f64,
        macd: f64,
        macd_signal: f64,
        price: f64,
        lower: f64,
        upper: f64,
    ) -> IndicatorSnapshot {
        IndicatorSnapshot {
            sma_20: (lower + upper) / 2.0,
            ema_12,
            ema_26,
            rsi_14: rsi,
            macd,
            macd_signal,
            atr_14: 0.5,
            bollinger: BollingerOutput {
                upper,
                middle: (lower + upper) / 2.0,
                lower,
                bandwidth: (upper - lower) / ((lower + upper) / 2.0),
                percent_b: 0.5,
            },
            current_price: price,
        }
    }

    #[test]
    fn test_oversold_uptrend_scores_buy() {
        // RSI +2, EMA +1, MACD +1, BB neutral => +4
        let snap = snapshot(25.0, 1.2, 1.1, 0.5, 0.2, 1.15, 1.0, 1.3);
        let signal = IndicatorScorer::new().score(&snap);

        assert_eq!(signal.score, 4);
        assert_eq!(signal.action, SignalAction::Buy);
        assert!((signal.confidence - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_bearish_scores_sell_with_max_confidence() {
        // RSI -2, EMA -1, MACD -1, price at upper band -1 => -5
        let snap = snapshot(75.0, 1.0, 1.1, -0.5, 0.0, 1.3, 1.0, 1.3);
        let signal = IndicatorScorer::new().score(&snap);

        assert_eq!(signal.score, -5);
        assert_eq!(signal.action, SignalAction::Sell);
        assert!((signal.confidence - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_mixed_scores_hold() {
        // RSI neutral, EMA +1, MACD -1, BB neutral => 0
        let snap = snapshot(50.0, 1.2, 1.1, -0.5, 0.0, 1.15, 1.0, 1.3);
        let signal = IndicatorScorer::new().score(&snap);

        assert_eq!(signal.score, 0);
        assert_eq!(signal.action, SignalAction::Hold);
        assert!((signal.confidence - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_stays_in_bounds() {
        // Most bullish possible
        let bull = snapshot(10.0, 1.2, 1.1, 0.5, 0.2, 0.9, 1.0, 1.3);
        assert_eq!(IndicatorScorer::new().score(&bull).score, 5);

        // Most bearish possible
        let bear = snapshot(90.0, 1.0, 1.1, -0.5, 0.0, 1.4, 1.0, 1.3);
        assert_eq!(IndicatorScorer::new().score(&bear).score, -5);
    }

    #[test]
    fn test_entry_votes_are_single_weight() {
        // Everything bullish: each component contributes exactly +1
        let snap = snapshot(25.0, 1.2, 1.1, 0.5, 0.2, 0.9, 1.0, 1.3);
        let vector = EntrySignals::evaluate(&snap);

        assert_eq!(vector.rsi, 1);
        assert_eq!(vector.ema_cross, 1);
        assert_eq!(vector.macd, 1);
        assert_eq!(vector.bb, 1);
        assert_eq!(vector.strength(), 4);
    }

    #[test]
    fn test_entry_strength_bounds() {
        let bear = snapshot(75.0, 1.0, 1.1, -0.5, 0.0, 1.4, 1.0, 1.3);
        let vector = EntrySignals::evaluate(&bear);
        assert_eq!(vector.strength(), -4);
    }

    #[test]
    fn test_entry_macd_compares_against_signal_line() {
        // MACD line positive but below its signal line: bearish vote here,
        // bullish in the snapshot scorer
        let snap = snapshot(50.0, 1.2, 1.1, 0.2, 0.5, 1.15, 1.0, 1.3);

        assert_eq!(EntrySignals::evaluate(&snap).macd, -1);
        assert_eq!(IndicatorScorer::new().score(&snap).vector.macd, 1);
    }
}
