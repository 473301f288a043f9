//! # rebalance
//!
//! Deterministic portfolio rebalancing toward model weights, with one
//! designated reserve security absorbing the rounding slack.
//!
//! ## Quick Start
//!
//! ```
//! use rebalance::{Allocation, Model, Portfolio, Position, rebalance};
//! use rust_decimal::Decimal;
//!
//! let portfolio: Portfolio = [
//!     Position::new("USD", Decimal::from(1), 1000),
//!     Position::new("AAPL", Decimal::from(100), 5),
//! ]
//! .into_iter()
//! .collect();
//!
//! let model: Model = [
//!     Allocation::new("USD", Decimal::from(50)),
//!     Allocation::new("AAPL", Decimal::from(50)),
//! ]
//! .into_iter()
//! .collect();
//!
//! let plan = rebalance(&portfolio, &model).unwrap();
//!
//! // Reserve first, then the rest of the portfolio in input order
//! assert_eq!(plan.lines[0].security, "USD");
//! assert_eq!(plan.lines[0].target_qty, 700);
//! assert_eq!(plan.lines[1].target_qty, 8);
//! ```
//!
//! ## Decimal Arithmetic
//!
//! Prices, values and percents are [`rust_decimal::Decimal`]. Nothing is
//! computed in floating point; every rounding step is half-up at a fixed
//! scale (see [`engine`]).
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for the model types and
//!   [`RebalancePlan`]. Decimals serialize as strings.

pub mod engine;
pub mod error;
pub mod holdings;
pub mod types;

pub use engine::{
    IDEAL_SCALE, REALIZED_PERCENT_SCALE, REPORT_PERCENT_SCALE, RebalancePlan, percent_of,
    rebalance, rebalance_with_reserve, round_half_up,
};
pub use error::RebalanceError;
pub use holdings::{Holdings, Keyed, Model, Portfolio};
pub use types::{Action, Allocation, DEFAULT_RESERVE, Position, TargetLine, is_reserve};
