//! External validation summary consumed by the ranker.

use serde::{Deserialize, Serialize};

/// Summary of an out-of-sample robustness check run outside this pipeline.
///
/// Only two fields feed the ranker's penalty logic: the walk-forward
/// pass/fail flag and the consistency score in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passes_walk_forward: bool,
    pub consistency_score: f64,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            passes_walk_forward: true,
            consistency_score: 1.0,
        }
    }
}
