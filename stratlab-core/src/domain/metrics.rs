//! Normalized backtest metrics and qualification thresholds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One normalized metrics record per backtest run.
///
/// All percentage-like fields are stored as decimals (0.25 = 25%) regardless
/// of how the host encoded them. Created once by `ResultsParser::parse` and
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedMetrics {
    // Identity
    pub strategy_id: String,
    pub backtest_id: String,
    pub name: String,

    // Performance (decimals)
    pub total_return: f64,
    pub cagr: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,

    // Risk
    /// Largest peak-to-trough decline, stored as a positive decimal.
    pub max_drawdown: f64,
    pub volatility: f64,

    // Trading activity
    pub total_trades: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,

    // Factor exposure
    pub alpha: f64,
    pub beta: f64,
    pub information_ratio: f64,
    pub treynor_ratio: f64,

    // Metadata
    pub start_date: String,
    pub end_date: String,
    pub initial_capital: f64,
    pub final_equity: f64,

    /// Host statistics not otherwise modeled, passed through untouched.
    #[serde(default)]
    pub raw_statistics: BTreeMap<String, serde_json::Value>,
}

impl Default for ParsedMetrics {
    fn default() -> Self {
        Self {
            strategy_id: String::new(),
            backtest_id: String::new(),
            name: String::new(),
            total_return: 0.0,
            cagr: 0.0,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            max_drawdown: 0.0,
            volatility: 0.0,
            total_trades: 0,
            win_rate: 0.0,
            // Neutral multiplier, not zero: a missing profit factor should
            // neither reward nor punish a strategy.
            profit_factor: 1.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            alpha: 0.0,
            beta: 0.0,
            information_ratio: 0.0,
            treynor_ratio: 0.0,
            start_date: String::new(),
            end_date: String::new(),
            initial_capital: 0.0,
            final_equity: 0.0,
            raw_statistics: BTreeMap::new(),
        }
    }
}

impl ParsedMetrics {
    /// True iff every soft qualification threshold is met.
    ///
    /// All six conditions are conjunctive; any single failure disqualifies.
    pub fn passes_thresholds(&self, thresholds: &ThresholdConfig) -> bool {
        self.sharpe_ratio >= thresholds.min_sharpe
            && self.cagr >= thresholds.min_cagr
            && self.max_drawdown <= thresholds.max_drawdown
            && self.total_trades >= thresholds.min_trades
            && self.win_rate >= thresholds.min_win_rate
            && self.profit_factor >= thresholds.min_profit_factor
    }

    /// True iff drawdown breaches the hard ceiling.
    ///
    /// Distinct from `passes_thresholds`: a strategy can fail the soft
    /// thresholds without being actively disqualified.
    pub fn is_disqualified(&self, thresholds: &ThresholdConfig) -> bool {
        self.max_drawdown > thresholds.disqualify_drawdown
    }
}

/// Qualification thresholds for a metrics record.
///
/// `max_drawdown` is the soft ceiling used by `passes_thresholds`;
/// `disqualify_drawdown` is the looser hard ceiling used by `is_disqualified`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub min_sharpe: f64,
    pub min_cagr: f64,
    pub max_drawdown: f64,
    pub min_trades: usize,
    pub min_win_rate: f64,
    pub min_profit_factor: f64,
    pub disqualify_drawdown: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_sharpe: 1.0,
            min_cagr: 0.10,
            max_drawdown: 0.25,
            min_trades: 20,
            min_win_rate: 0.45,
            min_profit_factor: 1.3,
            disqualify_drawdown: 0.35,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing_metrics() -> ParsedMetrics {
        ParsedMetrics {
            strategy_id: "momentum_01".into(),
            sharpe_ratio: 1.5,
            cagr: 0.18,
            max_drawdown: 0.15,
            total_trades: 50,
            win_rate: 0.55,
            profit_factor: 1.8,
            ..ParsedMetrics::default()
        }
    }

    #[test]
    fn default_profit_factor_is_neutral() {
        assert_eq!(ParsedMetrics::default().profit_factor, 1.0);
    }

    #[test]
    fn passes_all_thresholds() {
        let t = ThresholdConfig::default();
        assert!(passing_metrics().passes_thresholds(&t));
    }

    #[test]
    fn single_failure_disqualifies() {
        let t = ThresholdConfig::default();

        let mut m = passing_metrics();
        m.sharpe_ratio = 0.9;
        assert!(!m.passes_thresholds(&t));

        let mut m = passing_metrics();
        m.total_trades = 19;
        assert!(!m.passes_thresholds(&t));

        let mut m = passing_metrics();
        m.max_drawdown = 0.26;
        assert!(!m.passes_thresholds(&t));
    }

    #[test]
    fn two_tier_drawdown_severity() {
        let t = ThresholdConfig::default();

        // Fails the soft threshold but is not actively disqualified.
        let mut m = passing_metrics();
        m.max_drawdown = 0.30;
        assert!(!m.passes_thresholds(&t));
        assert!(!m.is_disqualified(&t));

        // Breaches the hard ceiling.
        m.max_drawdown = 0.40;
        assert!(m.is_disqualified(&t));
    }

    #[test]
    fn boundary_values_pass() {
        let t = ThresholdConfig::default();
        let m = ParsedMetrics {
            sharpe_ratio: 1.0,
            cagr: 0.10,
            max_drawdown: 0.25,
            total_trades: 20,
            win_rate: 0.45,
            profit_factor: 1.3,
            ..ParsedMetrics::default()
        };
        assert!(m.passes_thresholds(&t));
        assert!(!m.is_disqualified(&t));
    }

    #[test]
    fn serde_round_trip() {
        let mut m = passing_metrics();
        m.raw_statistics
            .insert("Net Profit".into(), serde_json::json!("25.5%"));
        let json = serde_json::to_string_pretty(&m).unwrap();
        let back: ParsedMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
