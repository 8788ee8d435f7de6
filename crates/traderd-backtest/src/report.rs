//! Text report rendering for backtest results.

use crate::simulator::BacktestResult;

impl BacktestResult {
    /// Generate a text summary for terminal output.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                     BACKTEST REPORT                        \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str(&format!("  Symbol:              {}\n", self.symbol));
        s.push_str(&format!("  Period:              {}\n", self.period));
        s.push_str(&format!("  Capital:             ${:.2}\n", self.capital));
        s.push('\n');

        s.push_str("PERFORMANCE\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Total Return:        {:.2}%\n", self.total_return));
        s.push_str(&format!("  Max Drawdown:        {:.2}%\n", self.max_drawdown));
        s.push_str(&format!("  Win Rate:            {:.2}%\n", self.win_rate));
        s.push_str(&format!("  Total Trades:        {}\n", self.total_trades));
        s.push('\n');

        s.push_str("RISK METRICS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Sharpe Ratio:        {:.2}\n", self.sharpe_ratio));
        s.push_str(&format!("  Sortino Ratio:       {:.2}\n", self.sortino_ratio));
        s.push_str(&format!("  Profit Factor:       {:.2}\n", self.profit_factor));
        s.push_str(&format!("  Volatility:          {:.2}%\n", self.volatility));
        s.push_str(&format!("  VaR (95%):           {:.2}%\n", self.var_95));
        s.push_str(&format!("  CVaR (95%):          {:.2}%\n", self.cvar_95));
        s.push_str(&format!(
            "  Downside Deviation:  {:.2}%\n",
            self.downside_deviation
        ));

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_contains_headline_numbers() {
        let result = BacktestResult {
            symbol: "EURUSD".to_string(),
            period: "30d".to_string(),
            capital: 10_000.0,
            risk_per_trade: 0.02,
            total_return: 4.2,
            sharpe_ratio: 1.3,
            sortino_ratio: 1.5,
            max_drawdown: -3.1,
            win_rate: 52.0,
            profit_factor: 1.4,
            total_trades: 17,
            var_95: -0.8,
            cvar_95: -1.1,
            volatility: 11.0,
            downside_deviation: 7.5,
        };

        let summary = result.summary();
        assert!(summary.contains("EURUSD"));
        assert!(summary.contains("4.20%"));
        assert!(summary.contains("Total Trades:        17"));
    }
}
