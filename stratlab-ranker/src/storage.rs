//! On-disk metrics storage.
//!
//! Layout under the results directory:
//! - `<results_dir>/<strategy_id>/metrics.json` — one record per strategy
//! - `<results_dir>/<strategy_id>/validation.json` — optional validation
//! - `<results_dir>/summary.csv` — one human-readable row per strategy
//!
//! A missing file loads as `None`, not an error; malformed entries are
//! skipped during directory scans so one bad record cannot sink the batch.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use stratlab_core::{ParsedMetrics, ThresholdConfig, ValidationResult};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Per-strategy JSON store rooted at a results directory.
pub struct MetricsStore {
    results_dir: PathBuf,
}

impl MetricsStore {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn metrics_path(&self, strategy_id: &str) -> PathBuf {
        self.results_dir.join(strategy_id).join("metrics.json")
    }

    pub fn validation_path(&self, strategy_id: &str) -> PathBuf {
        self.results_dir.join(strategy_id).join("validation.json")
    }

    /// Write one metrics record as indented JSON, creating directories as
    /// needed. Returns the file path.
    pub fn save(&self, metrics: &ParsedMetrics) -> Result<PathBuf, StoreError> {
        self.write_json(self.metrics_path(&metrics.strategy_id), metrics)
    }

    /// Read a metrics record back; `Ok(None)` when the file is absent.
    pub fn load(&self, strategy_id: &str) -> Result<Option<ParsedMetrics>, StoreError> {
        self.read_json(self.metrics_path(strategy_id))
    }

    pub fn save_validation(
        &self,
        strategy_id: &str,
        validation: &ValidationResult,
    ) -> Result<PathBuf, StoreError> {
        self.write_json(self.validation_path(strategy_id), validation)
    }

    pub fn load_validation(
        &self,
        strategy_id: &str,
    ) -> Result<Option<ValidationResult>, StoreError> {
        self.read_json(self.validation_path(strategy_id))
    }

    /// Scan all strategy subdirectories and load every readable metrics
    /// record, sorted by strategy id. Malformed entries are logged to stderr
    /// and skipped; a missing results directory is an empty set.
    pub fn load_all(&self) -> Result<Vec<ParsedMetrics>, StoreError> {
        let entries = match fs::read_dir(&self.results_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut all = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let strategy_id = entry.file_name().to_string_lossy().to_string();
            match self.load(&strategy_id) {
                Ok(Some(metrics)) => all.push(metrics),
                Ok(None) => {}
                Err(err) => eprintln!("skipping {strategy_id}: {err}"),
            }
        }

        all.sort_by(|a, b| a.strategy_id.cmp(&b.strategy_id));
        Ok(all)
    }

    /// Write the human-readable summary CSV: percentage fields re-expanded
    /// to "NN.NN%" strings plus the two qualification booleans.
    pub fn write_summary_csv(
        &self,
        metrics: &[ParsedMetrics],
        thresholds: &ThresholdConfig,
        path: impl AsRef<Path>,
    ) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        writer.write_record([
            "strategy_id",
            "name",
            "sharpe_ratio",
            "cagr",
            "max_drawdown",
            "total_trades",
            "win_rate",
            "profit_factor",
            "alpha",
            "beta",
            "passes_thresholds",
            "is_disqualified",
        ])?;

        for m in metrics {
            writer.write_record([
                m.strategy_id.clone(),
                m.name.clone(),
                format!("{:.2}", m.sharpe_ratio),
                format_pct(m.cagr),
                format_pct(m.max_drawdown),
                m.total_trades.to_string(),
                format_pct(m.win_rate),
                format!("{:.2}", m.profit_factor),
                format!("{:.4}", m.alpha),
                format!("{:.4}", m.beta),
                m.passes_thresholds(thresholds).to_string(),
                m.is_disqualified(thresholds).to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_json<T: Serialize>(&self, path: PathBuf, value: &T) -> Result<PathBuf, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }

    fn read_json<T: DeserializeOwned>(&self, path: PathBuf) -> Result<Option<T>, StoreError> {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }
}

fn format_pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}
