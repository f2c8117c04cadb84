//! Stratlab ranker — turns normalized backtest metrics into a ranked,
//! explainable comparison across many strategy runs.
//!
//! This crate builds on `stratlab-core` to provide:
//! - An externalized scoring policy (weights, ranges, thresholds, penalties)
//! - The weighted composite score with a per-metric breakdown
//! - A multiplicative penalty/bonus chain with a human-readable trail
//! - On-disk metrics storage (per-strategy JSON, summary CSV)
//! - Plain-text ranking reports

pub mod config;
pub mod ranker;
pub mod report;
pub mod storage;

pub use config::{ConfigError, PenaltyConfig, ScoreRange, ScoreRanges, ScoreWeights, ScoringConfig};
pub use ranker::{RankedStrategy, ScoreMetric, StrategyRanker};
pub use report::generate_report;
pub use storage::{MetricsStore, StoreError};
