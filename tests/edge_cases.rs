//! Edge-case tests: adversarial inputs to the public API.

use rebalance::{
    Action, Allocation, Model, Portfolio, Position, RebalanceError, rebalance,
    rebalance_with_reserve,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn portfolio(rows: &[(&str, Decimal, i64)]) -> Portfolio {
    rows.iter().map(|&(s, p, q)| Position::new(s, p, q)).collect()
}

fn model(rows: &[(&str, Decimal)]) -> Model {
    rows.iter().map(|&(s, p)| Allocation::new(s, p)).collect()
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn cash_and_one_stock() {
    let plan = rebalance(
        &portfolio(&[("USD", dec!(1), 1000), ("AAPL", dec!(100), 5)]),
        &model(&[("USD", dec!(50)), ("AAPL", dec!(50))]),
    )
    .unwrap();

    assert_eq!(plan.total_value, dec!(1500));
    let usd = &plan.lines[0];
    let aapl = &plan.lines[1];
    assert_eq!((usd.current_qty, usd.target_qty), (1000, 700));
    assert_eq!((aapl.current_qty, aapl.target_qty), (5, 8));
    assert_eq!(aapl.trade_qty(), 3);
    assert_eq!(aapl.action(), Action::Buy);
    assert_eq!(usd.action(), Action::Sell);
}

#[test]
fn all_quantities_zero() {
    let plan = rebalance(
        &portfolio(&[("USD", dec!(1), 0), ("AAPL", dec!(100), 0), ("MSFT", dec!(400), 0)]),
        &model(&[("USD", dec!(20)), ("AAPL", dec!(40)), ("MSFT", dec!(40))]),
    )
    .unwrap();

    assert!(plan.total_value.is_zero());
    assert!(plan.iter().all(|l| l.target_percent.is_zero()));
    assert!(plan.iter().all(|l| l.action() == Action::Hold));
}

// ============================================================================
// Empty / degenerate inputs
// ============================================================================

#[test]
fn reserve_only() {
    let plan = rebalance(
        &portfolio(&[("USD", dec!(1), 250)]),
        &model(&[("USD", dec!(100))]),
    )
    .unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.lines[0].target_qty, 250);
    assert_eq!(plan.lines[0].target_percent, dec!(100));
}

#[test]
fn empty_portfolio() {
    let err = rebalance(&Portfolio::new(), &model(&[("USD", dec!(100))])).unwrap_err();
    assert_eq!(
        err,
        RebalanceError::MissingPrice {
            security: "USD".into()
        }
    );
}

#[test]
fn empty_model() {
    let err = rebalance(&portfolio(&[("USD", dec!(1), 1)]), &Model::new()).unwrap_err();
    assert!(matches!(err, RebalanceError::MissingReserve { .. }));
}

#[test]
fn zero_priced_reserve() {
    let err = rebalance(
        &portfolio(&[("USD", Decimal::ZERO, 10), ("AAPL", dec!(100), 1)]),
        &model(&[("USD", dec!(50)), ("AAPL", dec!(50))]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        RebalanceError::ZeroPrice {
            security: "USD".into()
        }
    );
}

#[test]
fn value_overflow_is_error() {
    let err = rebalance(
        &portfolio(&[("USD", Decimal::MAX, 2)]),
        &model(&[("USD", dec!(100))]),
    )
    .unwrap_err();
    assert!(matches!(err, RebalanceError::Overflow { .. }));
}

// ============================================================================
// Precision
// ============================================================================

#[test]
fn fractional_prices_and_percents() {
    // total = 10_000 + 3 × 33.33 = 10_099.99
    let plan = rebalance(
        &portfolio(&[("USD", dec!(1), 10_000), ("ODD", dec!(33.33), 3)]),
        &model(&[("USD", dec!(66.667)), ("ODD", dec!(33.333))]),
    )
    .unwrap();

    // ideal ODD value 3366.6296667 → 101.0090... units → 101
    let odd = &plan.lines[1];
    assert_eq!(odd.target_qty, 101);
    assert_eq!(odd.target_value, dec!(3366.33));
    assert_eq!(plan.lines[0].target_value, dec!(6733.66));
    assert_eq!(plan.lines[0].target_qty, 6733);
    assert_eq!(plan.target_value_sum(), Some(plan.total_value));
}

#[test]
fn sub_unit_reserve_price() {
    // Reserve priced in cents: residual 5.00 buys 500 units
    let plan = rebalance(
        &portfolio(&[("usd", dec!(0.01), 500), ("AAPL", dec!(5), 1)]),
        &model(&[("USD", dec!(50)), ("AAPL", dec!(50))]),
    )
    .unwrap();

    assert_eq!(plan.lines[0].security, "usd");
    assert_eq!(plan.lines[1].target_qty, 1);
    assert_eq!(plan.lines[0].target_qty, 500);
}

#[test]
fn custom_reserve_name() {
    let plan = rebalance_with_reserve(
        &portfolio(&[("EUR", dec!(1), 300), ("USD", dec!(1), 100)]),
        &model(&[("eur", dec!(100))]),
        "EUR",
    )
    .unwrap();

    // USD is an ordinary security here and is sold out into the reserve
    assert_eq!(plan.lines[0].security, "EUR");
    assert_eq!(plan.lines[0].target_qty, 400);
    assert_eq!(plan.lines[1].target_qty, 0);
}
