//! Momentum indicators.

use serde::{Deserialize, Serialize};
use traderd_core::traits::{Indicator, MultiOutputIndicator, StreamingIndicator};

use crate::moving_average::{Ema, StreamingEma};

/// Relative Strength Index (RSI).
///
/// Measures the speed and magnitude of recent price changes
/// to evaluate overbought or oversold conditions. Uses Wilder's smoothing
/// of average gains and losses; saturates at 100 when the average loss is
/// zero, so values always stay in [0, 100].
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Calculate using Wilder's smoothing method.
    fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
        if values.len() < period {
            return vec![];
        }

        let mut result = Vec::with_capacity(values.len() - period + 1);
        let period_f64 = period as f64;

        // Initial average
        let mut avg: f64 = values[..period].iter().sum::<f64>() / period_f64;
        result.push(avg);

        // Wilder's smoothing: avg = (prev_avg * (period-1) + value) / period
        for &value in &values[period..] {
            avg = (avg * (period_f64 - 1.0) + value) / period_f64;
            result.push(avg);
        }

        result
    }

    fn rsi_from_averages(gain: f64, loss: f64) -> f64 {
        if loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + gain / loss))
        }
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() <= self.period {
            return vec![];
        }

        // Calculate price changes
        let mut gains = Vec::with_capacity(data.len() - 1);
        let mut losses = Vec::with_capacity(data.len() - 1);

        for i in 1..data.len() {
            let change = data[i] - data[i - 1];
            if change > 0.0 {
                gains.push(change);
                losses.push(0.0);
            } else {
                gains.push(0.0);
                losses.push(-change);
            }
        }

        // Smooth gains and losses
        let avg_gains = Self::wilder_smooth(&gains, self.period);
        let avg_losses = Self::wilder_smooth(&losses, self.period);

        avg_gains
            .iter()
            .zip(avg_losses.iter())
            .map(|(&gain, &loss)| Self::rsi_from_averages(gain, loss))
            .collect()
    }

    fn period(&self) -> usize {
        self.period + 1 // Need period+1 data points
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// Streaming RSI maintaining Wilder-smoothed gain/loss averages.
#[derive(Debug, Clone)]
pub struct StreamingRsi {
    period: usize,
    prev_value: Option<f64>,
    deltas_seen: usize,
    avg_gain: f64,
    avg_loss: f64,
}

impl StreamingRsi {
    /// Create a new streaming RSI.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self {
            period,
            prev_value: None,
            deltas_seen: 0,
            avg_gain: 0.0,
            avg_loss: 0.0,
        }
    }
}

impl StreamingIndicator for StreamingRsi {
    type Output = f64;

    fn update(&mut self, value: f64) -> Option<f64> {
        let prev = match self.prev_value.replace(value) {
            Some(prev) => prev,
            None => return None,
        };

        let change = value - prev;
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };

        self.deltas_seen += 1;
        let period_f64 = self.period as f64;

        if self.deltas_seen < self.period {
            // Accumulating for the initial averages
            self.avg_gain += gain;
            self.avg_loss += loss;
            None
        } else if self.deltas_seen == self.period {
            self.avg_gain = (self.avg_gain + gain) / period_f64;
            self.avg_loss = (self.avg_loss + loss) / period_f64;
            self.current()
        } else {
            self.avg_gain = (self.avg_gain * (period_f64 - 1.0) + gain) / period_f64;
            self.avg_loss = (self.avg_loss * (period_f64 - 1.0) + loss) / period_f64;
            self.current()
        }
    }

    fn current(&self) -> Option<f64> {
        if self.deltas_seen >= self.period {
            Some(Rsi::rsi_from_averages(self.avg_gain, self.avg_loss))
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.prev_value = None;
        self.deltas_seen = 0;
        self.avg_gain = 0.0;
        self.avg_loss = 0.0;
    }

    fn is_ready(&self) -> bool {
        self.deltas_seen >= self.period
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// MACD (Moving Average Convergence Divergence) output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: f64,
    /// Signal line (EMA of MACD)
    pub signal: f64,
    /// Histogram (MACD - Signal)
    pub histogram: f64,
}

/// MACD indicator.
///
/// Uses two EMAs to identify trend direction and momentum.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Create a new MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast > 0 && slow > 0 && signal > 0);
        assert!(fast < slow, "Fast period must be less than slow period");
        Self {
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
        }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiOutputIndicator for Macd {
    type Outputs = MacdOutput;

    fn calculate(&self, data: &[f64]) -> Vec<MacdOutput> {
        if data.len() < self.period() {
            return vec![];
        }

        // Calculate EMAs
        let fast_ema = Ema::new(self.fast_period).calculate(data);
        let slow_ema = Ema::new(self.slow_period).calculate(data);

        // Align the EMAs (fast has more values)
        let offset = self.slow_period - self.fast_period;
        let fast_ema = &fast_ema[offset..];

        // Calculate MACD line
        let macd_line: Vec<f64> = fast_ema
            .iter()
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect();

        if macd_line.len() < self.signal_period {
            return vec![];
        }

        // Calculate signal line (EMA of MACD)
        let signal_line = Ema::new(self.signal_period).calculate(&macd_line);

        // Align and create output
        let offset = self.signal_period - 1;
        macd_line[offset..]
            .iter()
            .zip(signal_line.iter())
            .map(|(&macd, &signal)| MacdOutput {
                macd,
                signal,
                histogram: macd - signal,
            })
            .collect()
    }

    fn period(&self) -> usize {
        // Slow EMA warm-up plus signal-line seeding, sharing the first value
        self.slow_period + self.signal_period - 1
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

/// Streaming MACD built from three streaming EMAs.
#[derive(Debug, Clone)]
pub struct StreamingMacd {
    fast: StreamingEma,
    slow: StreamingEma,
    signal: StreamingEma,
    current: Option<MacdOutput>,
}

impl StreamingMacd {
    /// Create a new streaming MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a streaming MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast > 0 && slow > 0 && signal > 0);
        assert!(fast < slow, "Fast period must be less than slow period");
        Self {
            fast: StreamingEma::new(fast),
            slow: StreamingEma::new(slow),
            signal: StreamingEma::new(signal),
            current: None,
        }
    }
}

impl Default for StreamingMacd {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingIndicator for StreamingMacd {
    type Output = MacdOutput;

    fn update(&mut self, value: f64) -> Option<MacdOutput> {
        let fast = self.fast.update(value);
        let slow = self.slow.update(value);

        if let (Some(fast), Some(slow)) = (fast, slow) {
            let macd = fast - slow;
            if let Some(signal) = self.signal.update(macd) {
                self.current = Some(MacdOutput {
                    macd,
                    signal,
                    histogram: macd - signal,
                });
            }
        }

        self.current
    }

    fn current(&self) -> Option<MacdOutput> {
        self.current
    }

    fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
        self.signal.reset();
        self.current = None;
    }

    fn is_ready(&self) -> bool {
        self.current.is_some()
    }

    fn period(&self) -> usize {
        self.slow.period() + self.signal.period() - 1
    }

    fn name(&self) -> &str {
        "MACD"
    }
}
