//! Volatility indicators.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use traderd_core::traits::{MultiOutputIndicator, StreamingIndicator};
use traderd_core::types::Bar;

/// Average True Range (ATR).
///
/// Measures market volatility as the rolling mean of the True Range,
/// where True Range = max(high-low, |high - prev_close|, |low - prev_close|).
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator.
    ///
    /// Common period is 14.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Calculate ATR from OHLC data.
    pub fn calculate_ohlc(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
        let len = high.len().min(low.len()).min(close.len());
        if len < self.period + 1 {
            return vec![];
        }

        // True Range needs the previous close, so it starts at the second bar
        let mut tr = Vec::with_capacity(len - 1);

        for i in 1..len {
            let high_low = high[i] - low[i];
            let high_close = (high[i] - close[i - 1]).abs();
            let low_close = (low[i] - close[i - 1]).abs();
            tr.push(high_low.max(high_close).max(low_close));
        }

        // Rolling mean over the True Range window
        let period_f64 = self.period as f64;
        let mut result = Vec::with_capacity(tr.len() - self.period + 1);

        let mut sum: f64 = tr[..self.period].iter().sum();
        result.push(sum / period_f64);

        for i in self.period..tr.len() {
            sum = sum - tr[i - self.period] + tr[i];
            result.push(sum / period_f64);
        }

        result
    }

    /// Calculate ATR over a bar slice.
    pub fn calculate_bars(&self, bars: &[Bar]) -> Vec<f64> {
        let high: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let low: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let close: Vec<f64> = bars.iter().map(|b| b.close).collect();
        self.calculate_ohlc(&high, &low, &close)
    }

    /// Minimum bars required (True Range consumes one bar for the seed close).
    pub fn period(&self) -> usize {
        self.period + 1
    }
}

/// Streaming ATR fed one bar at a time.
#[derive(Debug, Clone)]
pub struct StreamingAtr {
    period: usize,
    prev_close: Option<f64>,
    window: VecDeque<f64>,
    sum: f64,
}

impl StreamingAtr {
    /// Create a new streaming ATR.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self {
            period,
            prev_close: None,
            window: VecDeque::with_capacity(period + 1),
            sum: 0.0,
        }
    }

    /// Update with a new bar and return the current ATR.
    pub fn update(&mut self, bar: &Bar) -> Option<f64> {
        let prev_close = self.prev_close.replace(bar.close);
        let prev_close = match prev_close {
            Some(pc) => pc,
            None => return None,
        };

        let tr = bar.true_range(Some(prev_close));
        if self.window.len() == self.period {
            let oldest = self.window.pop_front().unwrap();
            self.sum = self.sum - oldest + tr;
        } else {
            self.sum += tr;
        }
        self.window.push_back(tr);

        self.current()
    }

    /// Get the current ATR value.
    pub fn current(&self) -> Option<f64> {
        if self.window.len() == self.period {
            Some(self.sum / self.period as f64)
        } else {
            None
        }
    }

    /// Check if the indicator is ready.
    pub fn is_ready(&self) -> bool {
        self.window.len() == self.period
    }

    /// Reset the indicator.
    pub fn reset(&mut self) {
        self.prev_close = None;
        self.window.clear();
        self.sum = 0.0;
    }

    /// Minimum bars required.
    pub fn period(&self) -> usize {
        self.period + 1
    }
}

/// Bollinger Bands output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerOutput {
    /// Upper band
    pub upper: f64,
    /// Middle band (SMA)
    pub middle: f64,
    /// Lower band
    pub lower: f64,
    /// Bandwidth ((upper - lower) / middle)
    pub bandwidth: f64,
    /// %B ((price - lower) / (upper - lower))
    pub percent_b: f64,
}

/// Bollinger Bands.
///
/// Consists of a middle band (SMA) with upper and lower bands
/// at a specified number of standard deviations.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl BollingerBands {
    /// Create new Bollinger Bands with default parameters (20, 2.0).
    pub fn new() -> Self {
        Self::with_params(20, 2.0)
    }

    /// Create Bollinger Bands with custom parameters.
    pub fn with_params(period: usize, std_dev_multiplier: f64) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        assert!(
            std_dev_multiplier > 0.0,
            "Std dev multiplier must be positive"
        );
        Self {
            period,
            std_dev_multiplier,
        }
    }

    fn output_for_window(window_mean: f64, variance: f64, k: f64, price: f64) -> BollingerOutput {
        let std_dev = variance.sqrt();
        let upper = window_mean + k * std_dev;
        let lower = window_mean - k * std_dev;

        let bandwidth = if window_mean != 0.0 {
            (upper - lower) / window_mean
        } else {
            0.0
        };

        let percent_b = if upper != lower {
            (price - lower) / (upper - lower)
        } else {
            0.5
        };

        BollingerOutput {
            upper,
            middle: window_mean,
            lower,
            bandwidth,
            percent_b,
        }
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiOutputIndicator for BollingerBands {
    type Outputs = BollingerOutput;

    fn calculate(&self, data: &[f64]) -> Vec<BollingerOutput> {
        if data.len() < self.period {
            return vec![];
        }

        let period_f64 = self.period as f64;
        let mut result = Vec::with_capacity(data.len() - self.period + 1);

        for window in data.windows(self.period) {
            let mean: f64 = window.iter().sum::<f64>() / period_f64;
            let variance: f64 = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period_f64;
            let price = window[self.period - 1];
            result.push(Self::output_for_window(
                mean,
                variance,
                self.std_dev_multiplier,
                price,
            ));
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Bollinger Bands"
    }
}

/// Streaming Bollinger Bands keeping the rolling close window.
#[derive(Debug, Clone)]
pub struct StreamingBollinger {
    period: usize,
    std_dev_multiplier: f64,
    window: VecDeque<f64>,
}

impl StreamingBollinger {
    /// Create new streaming Bollinger Bands with default parameters (20, 2.0).
    pub fn new() -> Self {
        Self::with_params(20, 2.0)
    }

    /// Create with custom parameters.
    pub fn with_params(period: usize, std_dev_multiplier: f64) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        assert!(
            std_dev_multiplier > 0.0,
            "Std dev multiplier must be positive"
        );
        Self {
            period,
            std_dev_multiplier,
            window: VecDeque::with_capacity(period + 1),
        }
    }
}

impl Default for StreamingBollinger {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingIndicator for StreamingBollinger {
    type Output = BollingerOutput;

    fn update(&mut self, value: f64) -> Option<BollingerOutput> {
        if self.window.len() == self.period {
            self.window.pop_front();
        }
        self.window.push_back(value);

        self.current()
    }

    fn current(&self) -> Option<BollingerOutput> {
        if self.window.len() < self.period {
            return None;
        }

        // Same element order as the batch window pass
        let period_f64 = self.period as f64;
        let mean: f64 = self.window.iter().sum::<f64>() / period_f64;
        let variance: f64 =
            self.window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period_f64;
        let price = *self.window.back().unwrap();

        Some(BollingerBands::output_for_window(
            mean,
            variance,
            self.std_dev_multiplier,
            price,
        ))
    }

    fn reset(&mut self) {
        self.window.clear();
    }

    fn is_ready(&self) -> bool {
        self.window.len() >= self.period
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Bollinger Bands"
    }
}
