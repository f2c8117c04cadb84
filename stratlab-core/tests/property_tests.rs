//! Property tests for P&L reconstruction invariants.
//!
//! Uses proptest to verify:
//! 1. Conservation — open quantity always matches a scalar reference model
//! 2. Finiteness — realized/unrealized P&L never go non-finite
//! 3. Average cost stays within the range of open-lot entry prices

use proptest::prelude::*;
use stratlab_core::domain::Order;
use stratlab_core::pnl::{end_prices, reconstruct};

fn arb_quantity() -> impl Strategy<Value = f64> {
    (1.0..200.0_f64).prop_map(|q| q.round())
}

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_order_stream() -> impl Strategy<Value = Vec<Order>> {
    prop::collection::vec((any::<bool>(), arb_quantity(), arb_price()), 1..40).prop_map(|steps| {
        steps
            .into_iter()
            .enumerate()
            .map(|(i, (is_buy, qty, price))| {
                let time = format!("2024-01-01T00:00:{i:02}Z");
                if is_buy {
                    Order::buy("SPY", qty, price, &time)
                } else {
                    Order::sell("SPY", qty, price, &time)
                }
            })
            .collect()
    })
}

proptest! {
    /// The FIFO book's open quantity matches a scalar position model:
    /// buys add, sells remove at most what is open, excess is dropped.
    #[test]
    fn open_quantity_matches_reference_model(orders in arb_order_stream()) {
        let mut reference_open = 0.0_f64;
        for order in &orders {
            if order.is_buy() {
                reference_open += order.abs_quantity();
            } else {
                reference_open -= order.abs_quantity().min(reference_open);
            }
        }

        let prices = end_prices(&orders);
        let book = reconstruct(&orders, &prices);
        let open = book.tickers["SPY"].open_quantity();

        prop_assert!((open - reference_open).abs() < 1e-6,
            "book open {open} vs reference {reference_open}");
    }

    #[test]
    fn pnl_is_always_finite(orders in arb_order_stream()) {
        let prices = end_prices(&orders);
        let book = reconstruct(&orders, &prices);
        let spy = &book.tickers["SPY"];
        prop_assert!(spy.realized_pnl.is_finite());
        prop_assert!(spy.unrealized_pnl.is_finite());
        prop_assert!(spy.cost_basis.is_finite());
    }

    #[test]
    fn average_cost_within_lot_price_range(orders in arb_order_stream()) {
        let prices = end_prices(&orders);
        let book = reconstruct(&orders, &prices);
        let spy = &book.tickers["SPY"];

        if !spy.open_lots.is_empty() {
            let min = spy.open_lots.iter().map(|l| l.price).fold(f64::INFINITY, f64::min);
            let max = spy.open_lots.iter().map(|l| l.price).fold(f64::NEG_INFINITY, f64::max);
            let avg = spy.average_cost();
            prop_assert!(avg >= min - 1e-9 && avg <= max + 1e-9,
                "avg {avg} outside [{min}, {max}]");
        }
    }
}
