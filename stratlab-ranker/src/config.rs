//! Serializable scoring configuration.
//!
//! Everything that shapes the ranking — sub-metric weights, normalization
//! ranges, qualification thresholds, penalty factors — lives in one struct
//! injected at ranker construction. Two rankers with different policies can
//! coexist in the same process; there is no global state.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use stratlab_core::ThresholdConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Weight of each sub-metric in the composite raw score.
///
/// The defaults sum to 1.0, putting the raw score in a [0, 1]-ish range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub sharpe: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
    pub profit_factor: f64,
    pub win_rate: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            sharpe: 0.25,
            cagr: 0.25,
            max_drawdown: 0.20,
            profit_factor: 0.15,
            win_rate: 0.15,
        }
    }
}

/// Min-max normalization range for one sub-metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Normalization ranges per sub-metric. Values outside a range clamp to the
/// nearest bound rather than being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreRanges {
    pub sharpe: ScoreRange,
    pub cagr: ScoreRange,
    pub max_drawdown: ScoreRange,
    pub profit_factor: ScoreRange,
    pub win_rate: ScoreRange,
}

impl Default for ScoreRanges {
    fn default() -> Self {
        Self {
            sharpe: ScoreRange::new(0.0, 3.0),
            cagr: ScoreRange::new(0.0, 0.5),
            max_drawdown: ScoreRange::new(0.0, 0.4),
            profit_factor: ScoreRange::new(0.5, 3.0),
            win_rate: ScoreRange::new(0.3, 0.7),
        }
    }
}

/// Configurable penalty knobs.
///
/// Penalties with fixed factors in the scoring contract (low consistency,
/// high beta, the alpha bonus cap) are constants in the ranker, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyConfig {
    /// Trades/year above this rate trigger the turnover penalty.
    pub max_trades_per_year: f64,
    pub turnover_penalty: f64,
    /// Minimum trade count for statistical confidence.
    pub min_trades_for_confidence: usize,
    pub low_sample_penalty: f64,
    /// Applied when the walk-forward validation failed outright.
    pub walk_forward_penalty: f64,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            max_trades_per_year: 200.0,
            turnover_penalty: 0.85,
            min_trades_for_confidence: 30,
            low_sample_penalty: 0.9,
            walk_forward_penalty: 0.7,
        }
    }
}

/// Full scoring policy for a ranker instance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
    pub ranges: ScoreRanges,
    pub thresholds: ThresholdConfig,
    pub penalties: PenaltyConfig,
}

impl ScoringConfig {
    /// Load a policy from a TOML file; unspecified fields take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let w = ScoreWeights::default();
        let sum = w.sharpe + w.cagr + w.max_drawdown + w.profit_factor + w.win_rate;
        assert!((sum - 1.0).abs() < 1e-10);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = ScoringConfig::from_toml(
            r#"
            [weights]
            sharpe = 0.5
            cagr = 0.5
            max_drawdown = 0.0
            profit_factor = 0.0
            win_rate = 0.0

            [penalties]
            max_trades_per_year = 150.0
            "#,
        )
        .unwrap();

        assert_eq!(config.weights.sharpe, 0.5);
        assert_eq!(config.penalties.max_trades_per_year, 150.0);
        // Unspecified sections and fields keep the reference policy.
        assert_eq!(config.penalties.turnover_penalty, 0.85);
        assert_eq!(config.ranges, ScoreRanges::default());
        assert_eq!(config.thresholds, ThresholdConfig::default());
    }

    #[test]
    fn empty_toml_is_default_policy() {
        let config = ScoringConfig::from_toml("").unwrap();
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(ScoringConfig::from_toml("weights = 3").is_err());
    }

    #[test]
    fn toml_round_trip() {
        let config = ScoringConfig::default();
        let text = toml::to_string(&config).unwrap();
        let back: ScoringConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, back);
    }
}
