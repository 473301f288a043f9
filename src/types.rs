//! Core types: Position, Allocation, TargetLine, Action

use std::fmt;

use rust_decimal::Decimal;

/// Reserve security used when none is configured.
pub const DEFAULT_RESERVE: &str = "USD";

/// Case-insensitive comparison of a security identifier against the reserve name.
#[inline]
pub fn is_reserve(security: &str, reserve: &str) -> bool {
    security.eq_ignore_ascii_case(reserve)
}

/// A current holding in one security.
///
/// `price` is in currency units per unit of security and is kept at the
/// scale it was parsed with. `quantity` is a whole number of units.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub security: String,
    pub price: Decimal,
    pub quantity: i64,
}

impl Position {
    pub fn new(security: impl Into<String>, price: Decimal, quantity: i64) -> Self {
        Self {
            security: security.into(),
            price,
            quantity,
        }
    }

    /// Market value (price × quantity), or `None` on decimal overflow.
    pub fn market_value(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// A target model entry: the requested percent (0–100 scale) of total value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allocation {
    pub security: String,
    pub percent: Decimal,
}

impl Allocation {
    pub fn new(security: impl Into<String>, percent: Decimal) -> Self {
        Self {
            security: security.into(),
            percent,
        }
    }
}

/// One computed output row.
///
/// `target_percent` is the *realized* percent of total value that
/// `target_value` represents, not the percent requested by the model.
/// For the reserve line `target_value` is the residual, which can differ
/// from `price × target_qty` because the reserve quantity is truncated.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetLine {
    pub security: String,
    pub price: Decimal,
    pub current_qty: i64,
    pub target_qty: i64,
    pub target_value: Decimal,
    pub target_percent: Decimal,
}

impl TargetLine {
    /// Signed number of units to trade: positive = buy, negative = sell.
    pub fn trade_qty(&self) -> i64 {
        self.target_qty.saturating_sub(self.current_qty)
    }

    pub fn action(&self) -> Action {
        match self.trade_qty() {
            q if q > 0 => Action::Buy,
            q if q < 0 => Action::Sell,
            _ => Action::Hold,
        }
    }
}

/// Trade direction implied by a target line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}
