//! Raw order records as reported by the backtest host.

use serde::{Deserialize, Serialize};

/// Direction code for a buy order.
pub const DIRECTION_BUY: i64 = 0;
/// Direction code for a sell order.
pub const DIRECTION_SELL: i64 = 1;

fn unknown_direction() -> i64 {
    -1
}

/// Host symbol object; only the ticker string is consumed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    #[serde(default)]
    pub value: String,
}

/// One order as reported by the host's orders endpoint.
///
/// The direction is kept as the host's raw integer code. Anything other than
/// buy (0) or sell (1) is neither, and the P&L pass skips it rather than
/// failing the run. Quantity may arrive signed; consumers take `abs()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub symbol: Symbol,
    #[serde(default = "unknown_direction")]
    pub direction: i64,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub price: f64,
    /// ISO-sortable timestamp string; compared lexicographically.
    #[serde(default)]
    pub time: String,
}

impl Order {
    pub fn buy(ticker: &str, quantity: f64, price: f64, time: &str) -> Self {
        Self {
            symbol: Symbol {
                value: ticker.to_string(),
            },
            direction: DIRECTION_BUY,
            quantity,
            price,
            time: time.to_string(),
        }
    }

    pub fn sell(ticker: &str, quantity: f64, price: f64, time: &str) -> Self {
        Self {
            symbol: Symbol {
                value: ticker.to_string(),
            },
            direction: DIRECTION_SELL,
            quantity,
            price,
            time: time.to_string(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.symbol.value
    }

    pub fn is_buy(&self) -> bool {
        self.direction == DIRECTION_BUY
    }

    pub fn is_sell(&self) -> bool {
        self.direction == DIRECTION_SELL
    }

    pub fn abs_quantity(&self) -> f64 {
        self.quantity.abs()
    }
}
