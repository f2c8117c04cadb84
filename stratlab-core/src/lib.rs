//! Stratlab core — the data layer of the strategy evaluation pipeline.
//!
//! This crate turns raw backtest-host output into typed domain records:
//! - Domain types: parsed metrics, orders, validation summaries
//! - Statistics parsing with tolerant numeric coercion
//! - FIFO lot-matched P&L reconstruction from raw order lists
//! - A paginated client for the host's backtest API
//!
//! Everything here is best-effort: a single missing or malformed statistic
//! degrades to a documented default instead of aborting the run.

pub mod api;
pub mod domain;
pub mod parser;
pub mod pnl;

pub use api::{load_cached_orders, ApiError, BacktestClient};
pub use domain::{Order, ParsedMetrics, Symbol, ThresholdConfig, ValidationResult};
pub use parser::{get_float, get_pct, ResultsParser};
pub use pnl::{end_prices, reconstruct, render_report, Lot, PnlBook, TickerPnl};
