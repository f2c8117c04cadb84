//! Raw backtest-result parsing with tolerant numeric coercion.
//!
//! The host reports statistics as a flat map from human-readable names
//! ("Net Profit", "Sharpe Ratio", ...) to values that may be numbers or
//! strings carrying "%", "$", or "," characters. The key names are a
//! compatibility contract with the host API and must not be changed.
//!
//! Nothing in here raises: a missing or malformed field falls back to its
//! default so that one bad statistic cannot prevent ranking the rest of the
//! comparison set.

use serde_json::Value;

use crate::domain::ParsedMetrics;

/// Coerce a JSON value to f64, stripping "%", "$", and "," from strings.
fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, '%' | '$' | ','))
                .collect();
            cleaned.trim().parse().ok()
        }
        _ => None,
    }
}

/// Look up `key` in a statistics map and coerce to f64.
///
/// Returns `default` on a missing key or any coercion failure.
pub fn get_float(stats: &Value, key: &str, default: f64) -> f64 {
    stats.get(key).and_then(coerce_float).unwrap_or(default)
}

/// Like [`get_float`], then rescale whole-number percentages to decimals.
///
/// Heuristic: a magnitude above 10 is assumed to be a whole-number
/// percentage and is divided by 100; anything else is assumed to already be
/// a decimal. This can misclassify genuine values in (-10, 10) — e.g. a
/// literal 10.5 meant as 10.5% stays 10.5 while 55 meant as 55% becomes
/// 0.55 — but it is preserved exactly for compatibility with prior runs.
/// Do not "fix" it without confirming the host's encoding field by field.
pub fn get_pct(stats: &Value, key: &str, default: f64) -> f64 {
    let value = get_float(stats, key, default);
    if value.abs() > 10.0 {
        value / 100.0
    } else {
        value
    }
}

/// Parser from one raw backtest-API response to a [`ParsedMetrics`] record.
pub struct ResultsParser;

impl ResultsParser {
    /// Parse `raw["backtest"]["statistics"]` into a normalized record.
    ///
    /// Pure function over its input; no I/O. An empty `name` falls back to
    /// the backtest's own name field when present.
    pub fn parse(
        raw: &Value,
        strategy_id: &str,
        backtest_id: &str,
        name: &str,
    ) -> ParsedMetrics {
        let backtest = raw.get("backtest").unwrap_or(&Value::Null);
        let stats = backtest.get("statistics").unwrap_or(&Value::Null);

        let name = if name.is_empty() {
            backtest
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
        } else {
            name
        };

        ParsedMetrics {
            strategy_id: strategy_id.to_string(),
            backtest_id: backtest_id.to_string(),
            name: name.to_string(),

            total_return: get_pct(stats, "Net Profit", 0.0),
            cagr: get_pct(stats, "Compounding Annual Return", 0.0),
            sharpe_ratio: get_float(stats, "Sharpe Ratio", 0.0),
            sortino_ratio: get_float(stats, "Sortino Ratio", 0.0),

            // The host reports drawdown as a negative percentage; stored
            // positive.
            max_drawdown: get_pct(stats, "Drawdown", 0.0).abs(),
            volatility: get_pct(stats, "Annual Standard Deviation", 0.0),

            total_trades: get_float(stats, "Total Orders", 0.0).max(0.0) as usize,
            win_rate: get_pct(stats, "Win Rate", 0.0),
            profit_factor: get_float(stats, "Profit-Loss Ratio", 1.0),
            avg_win: get_float(stats, "Average Win", 0.0),
            avg_loss: get_float(stats, "Average Loss", 0.0),

            alpha: get_float(stats, "Alpha", 0.0),
            beta: get_float(stats, "Beta", 0.0),
            information_ratio: get_float(stats, "Information Ratio", 0.0),
            treynor_ratio: get_float(stats, "Treynor Ratio", 0.0),

            start_date: backtest
                .get("created")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            end_date: backtest
                .get("ended")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            initial_capital: get_float(stats, "Start Equity", 0.0),
            final_equity: get_float(stats, "End Equity", 0.0),

            raw_statistics: stats
                .as_object()
                .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_float_strips_symbols() {
        let stats = json!({
            "Net Profit": "25.5%",
            "Average Win": "$1,234.56",
            "Sharpe Ratio": 1.8,
        });
        assert!((get_float(&stats, "Net Profit", 0.0) - 25.5).abs() < 1e-10);
        assert!((get_float(&stats, "Average Win", 0.0) - 1234.56).abs() < 1e-10);
        assert!((get_float(&stats, "Sharpe Ratio", 0.0) - 1.8).abs() < 1e-10);
    }

    #[test]
    fn get_float_defaults_on_garbage() {
        let stats = json!({"Win Rate": "abc", "Beta": null, "Alpha": [1.0]});
        assert_eq!(get_float(&stats, "Win Rate", 0.0), 0.0);
        assert_eq!(get_float(&stats, "Beta", 0.5), 0.5);
        assert_eq!(get_float(&stats, "Alpha", -1.0), -1.0);
        assert_eq!(get_float(&stats, "No Such Key", 7.0), 7.0);
    }

    #[test]
    fn get_pct_rescales_above_ten() {
        let stats = json!({"Win Rate": 55, "Drawdown": "-12.0%", "Net Profit": 0.08});
        assert!((get_pct(&stats, "Win Rate", 0.0) - 0.55).abs() < 1e-10);
        assert!((get_pct(&stats, "Drawdown", 0.0) - (-0.12)).abs() < 1e-10);
        // Below the threshold the value is taken as already-decimal.
        assert!((get_pct(&stats, "Net Profit", 0.0) - 0.08).abs() < 1e-10);
    }

    #[test]
    fn get_pct_ambiguous_band_is_left_alone() {
        // 10.5 meant as 10.5% stays 10.5 under the documented heuristic.
        let stats = json!({"Net Profit": 10.5});
        assert!((get_pct(&stats, "Net Profit", 0.0) - 0.105).abs() < 1e-10);
        let stats = json!({"Net Profit": 8.0});
        assert!((get_pct(&stats, "Net Profit", 0.0) - 8.0).abs() < 1e-10);
    }

    #[test]
    fn parse_end_to_end_fixture() {
        let raw = json!({
            "backtest": {
                "name": "momentum-v3",
                "created": "2024-01-01T00:00:00Z",
                "ended": "2024-06-30T00:00:00Z",
                "statistics": {
                    "Net Profit": "25.5%",
                    "Sharpe Ratio": 1.8,
                    "Total Orders": 42,
                    "Drawdown": "-12.0%",
                    "Win Rate": 55,
                }
            }
        });
        let m = ResultsParser::parse(&raw, "strat-1", "bt-1", "");

        assert!((m.total_return - 0.255).abs() < 1e-10);
        assert!((m.sharpe_ratio - 1.8).abs() < 1e-10);
        assert_eq!(m.total_trades, 42);
        assert!((m.max_drawdown - 0.12).abs() < 1e-10);
        assert!((m.win_rate - 0.55).abs() < 1e-10);

        assert_eq!(m.strategy_id, "strat-1");
        assert_eq!(m.backtest_id, "bt-1");
        assert_eq!(m.name, "momentum-v3");
        assert_eq!(m.start_date, "2024-01-01T00:00:00Z");
        assert_eq!(m.end_date, "2024-06-30T00:00:00Z");
    }

    #[test]
    fn explicit_name_wins_over_backtest_name() {
        let raw = json!({"backtest": {"name": "host-name", "statistics": {}}});
        let m = ResultsParser::parse(&raw, "s", "b", "mine");
        assert_eq!(m.name, "mine");
    }

    #[test]
    fn parse_empty_response_yields_defaults() {
        let m = ResultsParser::parse(&json!({}), "s", "b", "");
        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.profit_factor, 1.0);
        assert_eq!(m.total_trades, 0);
        assert!(m.raw_statistics.is_empty());
    }

    #[test]
    fn raw_statistics_passthrough() {
        let raw = json!({
            "backtest": {
                "statistics": {
                    "Sharpe Ratio": 1.2,
                    "Tracking Error": "0.09",
                }
            }
        });
        let m = ResultsParser::parse(&raw, "s", "b", "");
        assert_eq!(
            m.raw_statistics.get("Tracking Error"),
            Some(&json!("0.09"))
        );
    }

    #[test]
    fn negative_total_orders_clamps_to_zero() {
        let raw = json!({"backtest": {"statistics": {"Total Orders": -3}}});
        let m = ResultsParser::parse(&raw, "s", "b", "");
        assert_eq!(m.total_trades, 0);
    }
}
