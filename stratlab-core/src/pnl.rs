//! FIFO lot-matched P&L reconstruction from raw order lists.
//!
//! The host never reports position state, so realized and unrealized P&L are
//! rebuilt from the order stream alone. Buys push lots onto a per-ticker
//! queue; sells consume from the front, realizing against each lot's original
//! entry price, never a blended average.
//!
//! Two documented heuristics/edge cases, preserved rather than fixed:
//! - The end-of-backtest mark price is the ticker's most recent trade price
//!   (buy or sell). A position whose last order was its own entry therefore
//!   reads zero unrealized P&L.
//! - Sell quantity in excess of all open lots is silently dropped; short
//!   positions are not reconstructed.

use std::collections::{BTreeMap, VecDeque};
use std::fmt::Write as _;

use crate::domain::Order;

/// Quantities below this are treated as fully consumed lots.
const LOT_EPSILON: f64 = 1e-9;

/// One open buy lot awaiting FIFO matching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lot {
    pub quantity: f64,
    pub price: f64,
}

/// Reconstructed P&L state for one ticker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerPnl {
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    /// Sum over open lots of quantity * entry price.
    pub cost_basis: f64,
    /// Unconsumed buy lots, oldest first. The sum of quantities equals the
    /// net open position size.
    pub open_lots: VecDeque<Lot>,
}

impl TickerPnl {
    pub fn open_quantity(&self) -> f64 {
        self.open_lots.iter().map(|lot| lot.quantity).sum()
    }

    pub fn total_pnl(&self) -> f64 {
        self.realized_pnl + self.unrealized_pnl
    }

    /// Average entry price of the open position; 0 when flat.
    pub fn average_cost(&self) -> f64 {
        let qty = self.open_quantity();
        if qty > LOT_EPSILON {
            self.cost_basis / qty
        } else {
            0.0
        }
    }
}

/// Per-ticker P&L books for one backtest's order stream.
#[derive(Debug, Clone, Default)]
pub struct PnlBook {
    pub tickers: BTreeMap<String, TickerPnl>,
}

impl PnlBook {
    pub fn total_realized(&self) -> f64 {
        self.tickers.values().map(|t| t.realized_pnl).sum()
    }

    pub fn total_unrealized(&self) -> f64 {
        self.tickers.values().map(|t| t.unrealized_pnl).sum()
    }

    pub fn total_pnl(&self) -> f64 {
        self.total_realized() + self.total_unrealized()
    }
}

/// Proxy end-of-backtest mark price per ticker: the most recent trade price.
pub fn end_prices(orders: &[Order]) -> BTreeMap<String, f64> {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| a.time.cmp(&b.time));

    let mut prices = BTreeMap::new();
    for order in sorted {
        prices.insert(order.ticker().to_string(), order.price);
    }
    prices
}

/// Rebuild realized and unrealized P&L per ticker via FIFO lot matching.
///
/// Orders that are neither buys nor sells (unknown direction codes) are
/// skipped. A ticker with no end price carries zero unrealized P&L.
pub fn reconstruct(orders: &[Order], end_prices: &BTreeMap<String, f64>) -> PnlBook {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| a.time.cmp(&b.time));

    let mut book = PnlBook::default();

    for order in sorted {
        if order.ticker().is_empty() {
            continue;
        }
        let entry = book.tickers.entry(order.ticker().to_string()).or_default();

        if order.is_buy() {
            entry.open_lots.push_back(Lot {
                quantity: order.abs_quantity(),
                price: order.price,
            });
        } else if order.is_sell() {
            let mut remaining = order.abs_quantity();
            while remaining > LOT_EPSILON {
                let Some(front) = entry.open_lots.front_mut() else {
                    // Over-sold: no lots left to match. The excess quantity
                    // is dropped (short positions are not reconstructed).
                    break;
                };
                let matched = remaining.min(front.quantity);
                entry.realized_pnl += matched * (order.price - front.price);
                front.quantity -= matched;
                remaining -= matched;
                if front.quantity <= LOT_EPSILON {
                    entry.open_lots.pop_front();
                }
            }
        }
    }

    for (ticker, entry) in book.tickers.iter_mut() {
        entry.cost_basis = entry
            .open_lots
            .iter()
            .map(|lot| lot.quantity * lot.price)
            .sum();
        entry.unrealized_pnl = match end_prices.get(ticker) {
            Some(&end) => entry
                .open_lots
                .iter()
                .map(|lot| lot.quantity * (end - lot.price))
                .sum(),
            None => 0.0,
        };
    }

    book
}

/// Plain-text P&L report: a per-ticker table sorted by total P&L descending,
/// followed by a section listing only currently-open positions.
pub fn render_report(book: &PnlBook, end_prices: &BTreeMap<String, f64>) -> String {
    let mut out = String::new();

    let mut rows: Vec<(&String, &TickerPnl)> = book.tickers.iter().collect();
    rows.sort_by(|a, b| {
        b.1.total_pnl()
            .partial_cmp(&a.1.total_pnl())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let _ = writeln!(out, "=== P&L by Ticker ===");
    let _ = writeln!(
        out,
        "{:<8} {:>12} {:>12} {:>12} {:>10} {:>12}",
        "Ticker", "Realized", "Unrealized", "Total", "Open Qty", "Cost Basis"
    );
    let _ = writeln!(out, "{}", "-".repeat(70));
    for (ticker, pnl) in &rows {
        let _ = writeln!(
            out,
            "{:<8} {:>12.2} {:>12.2} {:>12.2} {:>10.0} {:>12.2}",
            ticker,
            pnl.realized_pnl,
            pnl.unrealized_pnl,
            pnl.total_pnl(),
            pnl.open_quantity(),
            pnl.cost_basis
        );
    }
    let _ = writeln!(out, "{}", "-".repeat(70));
    let _ = writeln!(
        out,
        "{:<8} {:>12.2} {:>12.2} {:>12.2}",
        "TOTAL",
        book.total_realized(),
        book.total_unrealized(),
        book.total_pnl()
    );

    let open: Vec<&(&String, &TickerPnl)> = rows
        .iter()
        .filter(|(_, pnl)| pnl.open_quantity() > LOT_EPSILON)
        .collect();

    if !open.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- Open Positions ---");
        let _ = writeln!(
            out,
            "{:<8} {:>10} {:>10} {:>10} {:>12} {:>8}",
            "Ticker", "Open Qty", "Avg Cost", "End Price", "Unrealized", "Gain%"
        );
        for (ticker, pnl) in open {
            let avg_cost = pnl.average_cost();
            let end = end_prices.get(*ticker).copied().unwrap_or(0.0);
            let gain_pct = if avg_cost > LOT_EPSILON {
                (end - avg_cost) / avg_cost * 100.0
            } else {
                0.0
            };
            let _ = writeln!(
                out,
                "{:<8} {:>10.0} {:>10.2} {:>10.2} {:>12.2} {:>7.2}%",
                ticker,
                pnl.open_quantity(),
                avg_cost,
                end,
                pnl.unrealized_pnl,
                gain_pct
            );
        }
    }

    out
}
