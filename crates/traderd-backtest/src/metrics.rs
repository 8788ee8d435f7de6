//! Statistical kernels for backtest results.
//!
//! Conventions: standard deviations are sample deviations (n-1 divisor),
//! percentiles use linear interpolation, and ratios annualize with sqrt(252)
//! assuming daily-equivalent bar frequency.

/// Trading periods per year used for annualization.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Arithmetic mean. Zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 divisor). Zero below two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Linearly interpolated percentile, `q` in [0, 1]. Zero for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;

    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (h - lo as f64)
    }
}

/// Compound total return: product(1 + r) - 1.
pub fn total_return(returns: &[f64]) -> f64 {
    returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

/// Annualized Sharpe ratio. Zero when the deviation vanishes.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    let std = sample_std(returns);
    if std == 0.0 {
        return 0.0;
    }
    mean(returns) / std * PERIODS_PER_YEAR.sqrt()
}

/// Annualized Sortino ratio over the downside deviation of `returns`.
/// Zero when there are no losing periods to measure against.
pub fn sortino_ratio(returns: &[f64]) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let downside_std = sample_std(&downside);
    if downside_std == 0.0 {
        return 0.0;
    }
    mean(returns) / downside_std * PERIODS_PER_YEAR.sqrt()
}

/// Maximum drawdown of the compounded equity curve; always <= 0.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut running_max = f64::MIN;
    let mut min_drawdown: f64 = 0.0;

    for r in returns {
        cumulative *= 1.0 + r;
        running_max = running_max.max(cumulative);
        let drawdown = cumulative / running_max - 1.0;
        min_drawdown = min_drawdown.min(drawdown);
    }

    min_drawdown
}

/// Gross profit over gross loss. Zero when there are no losing periods
/// (nothing to divide by), matching the equity-statistics convention.
pub fn profit_factor(returns: &[f64]) -> f64 {
    let gross_profit: f64 = returns.iter().filter(|r| **r > 0.0).sum();
    let gross_loss: f64 = -returns.iter().filter(|r| **r < 0.0).sum::<f64>();

    if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else {
        0.0
    }
}

/// Winning periods over decided periods, in percent. Zero-return periods
/// count as neither.
pub fn win_rate(returns: &[f64]) -> f64 {
    let winners = returns.iter().filter(|r| **r > 0.0).count();
    let losers = returns.iter().filter(|r| **r < 0.0).count();
    let decided = winners + losers;

    if decided == 0 {
        0.0
    } else {
        winners as f64 / decided as f64 * 100.0
    }
}

/// Annualized sample deviation of all returns, in percent.
pub fn volatility(returns: &[f64]) -> f64 {
    sample_std(returns) * PERIODS_PER_YEAR.sqrt() * 100.0
}

/// Annualized sample deviation of negative returns, in percent.
pub fn downside_deviation(returns: &[f64]) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    sample_std(&downside) * PERIODS_PER_YEAR.sqrt() * 100.0
}
