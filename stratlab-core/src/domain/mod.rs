//! Domain types shared across the pipeline.

pub mod metrics;
pub mod order;
pub mod validation;

pub use metrics::{ParsedMetrics, ThresholdConfig};
pub use order::{Order, Symbol, DIRECTION_BUY, DIRECTION_SELL};
pub use validation::ValidationResult;
