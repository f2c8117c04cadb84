//! Composite scoring and ranking over a set of strategies.
//!
//! The raw score is a weighted sum of five min-max-normalized sub-metrics.
//! Penalties then apply in a fixed order as independent multiplicative
//! factors, so each one scales the remaining score and the effects compound.
//! Every triggered adjustment appends a human-readable description; silence
//! means the step did not fire.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use stratlab_core::{ParsedMetrics, ValidationResult};

use crate::config::{ScoreRange, ScoringConfig};

/// Fixed assumed backtest duration for the turnover estimate.
const ASSUMED_BACKTEST_YEARS: f64 = 4.5;

/// Consistency scores below this floor draw the milder validation penalty.
const LOW_CONSISTENCY_FLOOR: f64 = 0.5;
const LOW_CONSISTENCY_PENALTY: f64 = 0.85;

const HIGH_BETA_THRESHOLD: f64 = 1.3;
const HIGH_BETA_PENALTY: f64 = 0.9;

/// Alpha above this earns the (capped) bonus multiplier.
const ALPHA_BONUS_THRESHOLD: f64 = 0.05;
const ALPHA_BONUS_CAP: f64 = 1.1;

/// The five sub-metrics that feed the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreMetric {
    Sharpe,
    Cagr,
    MaxDrawdown,
    ProfitFactor,
    WinRate,
}

impl ScoreMetric {
    pub const ALL: [ScoreMetric; 5] = [
        Self::Sharpe,
        Self::Cagr,
        Self::MaxDrawdown,
        Self::ProfitFactor,
        Self::WinRate,
    ];

    /// Extract the relevant value from a metrics record.
    pub fn extract(&self, metrics: &ParsedMetrics) -> f64 {
        match self {
            Self::Sharpe => metrics.sharpe_ratio,
            Self::Cagr => metrics.cagr,
            Self::MaxDrawdown => metrics.max_drawdown,
            Self::ProfitFactor => metrics.profit_factor,
            Self::WinRate => metrics.win_rate,
        }
    }

    /// Breakdown key for this sub-metric.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sharpe => "sharpe",
            Self::Cagr => "cagr",
            Self::MaxDrawdown => "max_drawdown",
            Self::ProfitFactor => "profit_factor",
            Self::WinRate => "win_rate",
        }
    }

    /// Whether lower values are better (drawdown only); normalization
    /// inverts the sense before scaling.
    pub fn is_inverted(&self) -> bool {
        matches!(self, Self::MaxDrawdown)
    }
}

/// One strategy after scoring. Rank stays at the 0 sentinel until the batch
/// is sorted by `rank_strategies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStrategy {
    pub strategy_id: String,
    pub name: String,
    pub metrics: ParsedMetrics,
    pub validation: Option<ValidationResult>,
    /// Pre-penalty weighted sum.
    pub raw_score: f64,
    /// Post-penalty/bonus score used for ordering.
    pub final_score: f64,
    /// 1-based position after the batch sort; 0 = unassigned.
    pub rank: usize,
    /// Sub-metric name to its weighted contribution.
    pub score_breakdown: BTreeMap<String, f64>,
    /// Human-readable descriptions of the adjustments that fired, in order.
    pub penalties: Vec<String>,
}

/// Scores and ranks strategies under one injected policy.
///
/// Every operation is a pure function of its inputs; the configuration is
/// fixed for the ranker's lifetime.
pub struct StrategyRanker {
    config: ScoringConfig,
}

impl StrategyRanker {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    fn range(&self, metric: ScoreMetric) -> ScoreRange {
        let ranges = &self.config.ranges;
        match metric {
            ScoreMetric::Sharpe => ranges.sharpe,
            ScoreMetric::Cagr => ranges.cagr,
            ScoreMetric::MaxDrawdown => ranges.max_drawdown,
            ScoreMetric::ProfitFactor => ranges.profit_factor,
            ScoreMetric::WinRate => ranges.win_rate,
        }
    }

    fn weight(&self, metric: ScoreMetric) -> f64 {
        let weights = &self.config.weights;
        match metric {
            ScoreMetric::Sharpe => weights.sharpe,
            ScoreMetric::Cagr => weights.cagr,
            ScoreMetric::MaxDrawdown => weights.max_drawdown,
            ScoreMetric::ProfitFactor => weights.profit_factor,
            ScoreMetric::WinRate => weights.win_rate,
        }
    }

    /// Min-max normalize a value into [0, 1] over the metric's configured
    /// range, clamping out-of-range values.
    ///
    /// Drawdown is inverted first (`max - value`): the result reads as the
    /// distance below the worst acceptable drawdown as a fraction of the
    /// range. A degenerate range (max == min) returns 0.5 — no information.
    pub fn normalize(&self, value: f64, metric: ScoreMetric) -> f64 {
        let range = self.range(metric);
        let span = range.max - range.min;
        if span <= 0.0 {
            return 0.5;
        }
        let oriented = if metric.is_inverted() {
            range.max - value
        } else {
            value - range.min
        };
        (oriented / span).clamp(0.0, 1.0)
    }

    /// Weighted sum of the five normalized sub-scores, with the breakdown
    /// mapping each sub-metric to its weighted contribution.
    pub fn raw_score(&self, metrics: &ParsedMetrics) -> (f64, BTreeMap<String, f64>) {
        let mut breakdown = BTreeMap::new();
        let mut score = 0.0;
        for metric in ScoreMetric::ALL {
            let contribution =
                self.weight(metric) * self.normalize(metric.extract(metrics), metric);
            breakdown.insert(metric.name().to_string(), contribution);
            score += contribution;
        }
        (score, breakdown)
    }

    /// Apply the penalty/bonus chain to a raw score.
    ///
    /// Order: turnover, low sample, validation (walk-forward failure else
    /// low consistency — mutually exclusive), high beta, then the capped
    /// positive-alpha bonus. Each factor multiplies the remaining score.
    pub fn apply_penalties(
        &self,
        raw_score: f64,
        metrics: &ParsedMetrics,
        validation: Option<&ValidationResult>,
    ) -> (f64, Vec<String>) {
        let knobs = &self.config.penalties;
        let mut score = raw_score;
        let mut trail = Vec::new();

        let trades_per_year = metrics.total_trades as f64 / ASSUMED_BACKTEST_YEARS;
        if trades_per_year > knobs.max_trades_per_year {
            score *= knobs.turnover_penalty;
            trail.push(format!(
                "high turnover: {trades_per_year:.0} trades/year (limit {:.0})",
                knobs.max_trades_per_year
            ));
        }

        if metrics.total_trades < knobs.min_trades_for_confidence {
            score *= knobs.low_sample_penalty;
            trail.push(format!(
                "low sample: {} trades, {} required for confidence",
                metrics.total_trades, knobs.min_trades_for_confidence
            ));
        }

        if let Some(validation) = validation {
            if !validation.passes_walk_forward {
                score *= knobs.walk_forward_penalty;
                trail.push("failed walk-forward validation".to_string());
            } else if validation.consistency_score < LOW_CONSISTENCY_FLOOR {
                score *= LOW_CONSISTENCY_PENALTY;
                trail.push(format!(
                    "low consistency: {:.2}",
                    validation.consistency_score
                ));
            }
        }

        if metrics.beta > HIGH_BETA_THRESHOLD {
            score *= HIGH_BETA_PENALTY;
            trail.push(format!("high beta: {:.2}", metrics.beta));
        }

        if metrics.alpha > ALPHA_BONUS_THRESHOLD {
            let bonus = (1.0 + metrics.alpha).min(ALPHA_BONUS_CAP);
            score *= bonus;
            trail.push(format!("positive alpha bonus: x{bonus:.2}"));
        }

        (score, trail)
    }

    /// Score one strategy. Rank is left at the 0 sentinel.
    pub fn rank_strategy(
        &self,
        metrics: ParsedMetrics,
        validation: Option<ValidationResult>,
    ) -> RankedStrategy {
        let (raw_score, score_breakdown) = self.raw_score(&metrics);
        let (final_score, penalties) =
            self.apply_penalties(raw_score, &metrics, validation.as_ref());

        RankedStrategy {
            strategy_id: metrics.strategy_id.clone(),
            name: metrics.name.clone(),
            metrics,
            validation,
            raw_score,
            final_score,
            rank: 0,
            score_breakdown,
            penalties,
        }
    }

    /// Rank a batch: score each entry, sort descending by final score, and
    /// assign 1-based ranks. The sort is stable, so ties keep input order.
    pub fn rank_strategies(
        &self,
        inputs: Vec<(ParsedMetrics, Option<ValidationResult>)>,
    ) -> Vec<RankedStrategy> {
        let mut ranked: Vec<RankedStrategy> = inputs
            .into_iter()
            .map(|(metrics, validation)| self.rank_strategy(metrics, validation))
            .collect();

        ranked.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for (index, entry) in ranked.iter_mut().enumerate() {
            entry.rank = index + 1;
        }
        ranked
    }
}

impl Default for StrategyRanker {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
