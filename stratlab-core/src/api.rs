//! Client for the backtest host's read API.
//!
//! Two endpoints are consumed: the backtest result document (statistics) and
//! the paginated orders list. Orders are fetched 100 rows per page until a
//! short page; a failure on one page logs to stderr and returns whatever was
//! fetched so far — partial results beat none, and there is no retry.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::domain::Order;

/// Rows per orders page; a shorter page terminates pagination.
pub const ORDERS_PAGE_SIZE: usize = 100;

/// Structured error types for host API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api rejected request: {0}")]
    Rejected(String),

    #[error("unexpected response shape: {0}")]
    ResponseFormat(String),
}

/// Blocking client for the host's backtest read endpoints.
pub struct BacktestClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_token: Option<String>,
}

impl BacktestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        let value: Value = request.send()?.error_for_status()?.json()?;

        // The host wraps every payload in {"success": bool, "errors": [...]}.
        if value.get("success").and_then(Value::as_bool) == Some(false) {
            let errors = value
                .get("errors")
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join("; ")
                })
                .unwrap_or_default();
            return Err(ApiError::Rejected(errors));
        }
        Ok(value)
    }

    /// Fetch the raw backtest result document for the parser.
    pub fn read_backtest(&self, project_id: &str, backtest_id: &str) -> Result<Value, ApiError> {
        let url = format!(
            "{}/backtests/read?projectId={project_id}&backtestId={backtest_id}",
            self.base_url
        );
        self.get_json(&url)
    }

    /// Fetch the full order list, one page at a time.
    ///
    /// Stops at the first page shorter than [`ORDERS_PAGE_SIZE`]. A page
    /// error terminates the loop with the orders fetched so far.
    pub fn read_orders(&self, project_id: &str, backtest_id: &str) -> Vec<Order> {
        let mut orders = Vec::new();
        let mut start = 0usize;

        loop {
            let end = start + ORDERS_PAGE_SIZE;
            let url = format!(
                "{}/backtests/orders/read?projectId={project_id}&backtestId={backtest_id}\
                 &start={start}&end={end}",
                self.base_url
            );

            let page = match self.fetch_order_page(&url) {
                Ok(page) => page,
                Err(err) => {
                    eprintln!("order fetch failed at offset {start}: {err}");
                    break;
                }
            };

            let fetched = page.len();
            orders.extend(page);
            if fetched < ORDERS_PAGE_SIZE {
                break;
            }
            start = end;
        }

        orders
    }

    fn fetch_order_page(&self, url: &str) -> Result<Vec<Order>, ApiError> {
        let value = self.get_json(url)?;
        let list = value
            .get("orders")
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::ResponseFormat("missing 'orders' array".into()))?;

        // Malformed rows are skipped, not fatal.
        Ok(list
            .iter()
            .filter_map(|row| serde_json::from_value(row.clone()).ok())
            .collect())
    }
}

/// Load order pages previously cached as `/tmp/<prefix>N.json`, N = 1..9.
///
/// Missing files are skipped; malformed files are logged and skipped. The
/// downstream P&L computation is identical regardless of source.
pub fn load_cached_orders(prefix: &str) -> Vec<Order> {
    let mut orders = Vec::new();
    for n in 1..=9 {
        let path = format!("/tmp/{prefix}{n}.json");
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        match serde_json::from_str::<Vec<Order>>(&content) {
            Ok(mut page) => orders.append(&mut page),
            Err(err) => eprintln!("skipping {path}: {err}"),
        }
    }
    orders
}
