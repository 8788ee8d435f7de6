//! Single-pass backtest simulation.
//!
//! The rule under test is a simple SMA crossover: long while the close is
//! above the rolling mean, short while below. Execution lags the signal by
//! one bar, so a signal observed at bar t earns the return of bar t+1 and
//! the simulation carries no look-ahead bias.

use serde::{Deserialize, Serialize};
use tracing::debug;
use traderd_core::error::BacktestError;
use traderd_core::traits::Indicator;
use traderd_core::types::Bar;
use traderd_indicators::Sma;

use crate::metrics;

/// Simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestParams {
    /// Crossover window
    pub sma_period: usize,
    /// Starting capital, echoed into the result
    pub capital: f64,
    /// Risk fraction per trade, echoed into the result
    pub risk_per_trade: f64,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            sma_period: 20,
            capital: 10_000.0,
            risk_per_trade: 0.02,
        }
    }
}

/// Immutable result snapshot of one simulation.
///
/// Percentages (`total_return`, `max_drawdown`, `win_rate`, `var_95`,
/// `cvar_95`, `volatility`, `downside_deviation`) are expressed in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub symbol: String,
    pub period: String,
    pub capital: f64,
    pub risk_per_trade: f64,
    pub total_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub total_trades: usize,
    pub var_95: f64,
    pub cvar_95: f64,
    pub volatility: f64,
    pub downside_deviation: f64,
}

/// Parse a period label like "30d" into a day count.
pub fn parse_period_days(period: &str) -> Result<u32, BacktestError> {
    let digits = period
        .strip_suffix('d')
        .ok_or_else(|| BacktestError::InvalidPeriod(period.to_string()))?;
    let days: u32 = digits
        .parse()
        .map_err(|_| BacktestError::InvalidPeriod(period.to_string()))?;
    if days == 0 {
        return Err(BacktestError::InvalidPeriod(period.to_string()));
    }
    Ok(days)
}

/// Run the crossover simulation over a historical series.
pub fn simulate(
    symbol: &str,
    period: &str,
    bars: &[Bar],
    params: &BacktestParams,
) -> Result<BacktestResult, BacktestError> {
    if bars.is_empty() {
        return Err(BacktestError::NoData(symbol.to_string()));
    }
    if bars.len() < 2 {
        return Err(BacktestError::InsufficientData {
            required: 2,
            available: bars.len(),
        });
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let n = closes.len();

    // Close-to-close returns, defined from the second bar
    let returns: Vec<f64> = (1..n).map(|i| closes[i] / closes[i - 1] - 1.0).collect();

    // Crossover signal per bar; zero while the rolling mean is warming up
    let sma = Sma::new(params.sma_period).calculate(&closes);
    let mut signal = vec![0i8; n];
    for (j, &mean) in sma.iter().enumerate() {
        let i = params.sma_period - 1 + j;
        signal[i] = if closes[i] > mean {
            1
        } else if closes[i] < mean {
            -1
        } else {
            0
        };
    }

    // Position lags the signal by one bar
    let strategy_returns: Vec<f64> = (1..n)
        .map(|i| signal[i - 1] as f64 * returns[i - 1])
        .collect();

    // Each round trip flips the signal twice
    let flips: i32 = (1..n)
        .map(|i| (signal[i] as i32 - signal[i - 1] as i32).abs())
        .sum();
    let total_trades = (flips / 2) as usize;

    let var_threshold = metrics::percentile(&returns, 0.05);
    let tail: Vec<f64> = returns
        .iter()
        .copied()
        .filter(|r| *r <= var_threshold)
        .collect();

    let result = BacktestResult {
        symbol: symbol.to_string(),
        period: period.to_string(),
        capital: params.capital,
        risk_per_trade: params.risk_per_trade,
        total_return: metrics::total_return(&strategy_returns) * 100.0,
        sharpe_ratio: metrics::sharpe_ratio(&strategy_returns),
        sortino_ratio: metrics::sortino_ratio(&strategy_returns),
        max_drawdown: metrics::max_drawdown(&strategy_returns) * 100.0,
        win_rate: metrics::win_rate(&strategy_returns),
        profit_factor: metrics::profit_factor(&strategy_returns),
        total_trades,
        var_95: var_threshold * 100.0,
        cvar_95: metrics::mean(&tail) * 100.0,
        volatility: metrics::volatility(&returns),
        downside_deviation: metrics::downside_deviation(&returns),
    };

    debug!(
        symbol,
        bars = n,
        trades = result.total_trades,
        total_return = result.total_return,
        "backtest complete"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * 900_000, c, c + 0.5, c - 0.5, c, 100.0))
            .collect()
    }

    #[test]
    fn test_rejects_empty_and_single_bar() {
        let params = BacktestParams::default();
        assert!(matches!(
            simulate("EURUSD", "30d", &[], &params),
            Err(BacktestError::NoData(_))
        ));
        assert!(matches!(
            simulate("EURUSD", "30d", &bars_from_closes(&[1.0]), &params),
            Err(BacktestError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(parse_period_days("30d").unwrap(), 30);
        assert_eq!(parse_period_days("7d").unwrap(), 7);
        assert!(parse_period_days("30").is_err());
        assert!(parse_period_days("0d").is_err());
        assert!(parse_period_days("monthly").is_err());
    }

    #[test]
    fn test_hand_checked_small_series() {
        // closes [10, 11, 12, 11, 10, 11] with window 2:
        //   signal = [0, +1, +1, -1, -1, +1]
        //   2 round trips, total return = 12/11 * 0.9 - 1
        let params = BacktestParams {
            sma_period: 2,
            ..Default::default()
        };
        let bars = bars_from_closes(&[10.0, 11.0, 12.0, 11.0, 10.0, 11.0]);
        let result = simulate("TEST", "30d", &bars, &params).unwrap();

        assert_eq!(result.total_trades, 2);
        assert!((result.total_return - (12.0 / 11.0 * 0.9 - 1.0) * 100.0).abs() < 1e-9);
        assert!((result.win_rate - 50.0).abs() < 1e-9);
        assert!(result.max_drawdown <= 0.0);
    }

    #[test]
    fn test_monotonic_rise_equals_lagged_buy_and_hold() {
        // Strictly rising closes: always long once the SMA is ready at bar
        // 19, first position at bar 20, so the strategy earns buy-and-hold
        // from bar 19 to the end.
        let closes: Vec<f64> = (0..31).map(|i| 100.0 + 2.0 * i as f64).collect();
        let bars = bars_from_closes(&closes);
        let result = simulate("TEST", "30d", &bars, &BacktestParams::default()).unwrap();

        let expected = (closes[30] / closes[19] - 1.0) * 100.0;
        assert!((result.total_return - expected).abs() < 1e-9);
        assert_eq!(result.max_drawdown, 0.0);
        assert!((result.win_rate - 100.0).abs() < 1e-9);
        // One entry, never closed: a single half round trip truncates to 0
        assert_eq!(result.total_trades, 0);
        assert_eq!(result.profit_factor, 0.0);
        assert_eq!(result.sortino_ratio, 0.0);
    }

    #[test]
    fn test_deterministic_fixture_reproduces_bit_for_bit() {
        let closes: Vec<f64> = vec![
            100.0, 102.0, 104.0, 103.0, 105.0, 104.0, 106.0, 108.0, 107.0, 109.0, 111.0, 110.0,
            112.0, 114.0, 113.0, 115.0, 117.0, 116.0, 118.0, 120.0, 119.0, 121.0, 123.0, 122.0,
            124.0, 126.0, 125.0, 127.0, 129.0, 130.0,
        ];
        let bars = bars_from_closes(&closes);
        let params = BacktestParams::default();

        let first = simulate("TEST", "30d", &bars, &params).unwrap();
        let second = simulate("TEST", "30d", &bars, &params).unwrap();

        assert_eq!(first.total_trades, second.total_trades);
        assert_eq!(first.total_return.to_bits(), second.total_return.to_bits());
        assert_eq!(first.sharpe_ratio.to_bits(), second.sharpe_ratio.to_bits());
        assert_eq!(first.var_95.to_bits(), second.var_95.to_bits());
        assert!(first.max_drawdown <= 0.0);
    }

    #[test]
    fn test_short_series_produces_flat_result() {
        // Below the crossover window every signal is zero: no trades, no
        // strategy return
        let bars = bars_from_closes(&[10.0, 11.0, 12.0, 13.0]);
        let result = simulate("TEST", "30d", &bars, &BacktestParams::default()).unwrap();

        assert_eq!(result.total_trades, 0);
        assert_eq!(result.total_return, 0.0);
        assert_eq!(result.sharpe_ratio, 0.0);
        // Raw close-to-close volatility is still measured
        assert!(result.volatility > 0.0);
    }
}
