//! Rebalance engine: holdings + model weights → target quantities.
//!
//! Every non-reserve security is sized independently from its model percent.
//! Its trade is rounded to whole units and the resulting target value is
//! taken at the rounded quantity. The reserve security is sized last, from
//! whatever value the other lines leave over.
//!
//! # Numeric policy
//!
//! | Quantity | Scale | Rounding |
//! |----------|-------|----------|
//! | ideal target value, ideal target quantity | [`IDEAL_SCALE`] | half-up |
//! | trade quantity | 0 | half-up |
//! | reserve quantity | [`IDEAL_SCALE`], then truncated | half-up |
//! | realized percent | [`REALIZED_PERCENT_SCALE`] | half-up |
//!
//! # Known limitation
//!
//! A non-reserve target that would go negative is clamped to zero. The
//! reserve residual is computed from the clamped values, so the lines still
//! sum to the total, but the reserve then carries the clamped deficit.

use std::collections::BTreeSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rustc_hash::FxHashMap;

use crate::error::RebalanceError;
use crate::holdings::{Model, Portfolio};
use crate::types::{DEFAULT_RESERVE, Position, TargetLine, is_reserve};

/// Fractional digits kept for ideal target values and quantities.
pub const IDEAL_SCALE: u32 = 10;

/// Fractional digits of the realized percent on each [`TargetLine`].
pub const REALIZED_PERCENT_SCALE: u32 = 4;

/// Fractional digits of the percent written to the report.
pub const REPORT_PERCENT_SCALE: u32 = 2;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round half-up (ties away from zero) to `scale` fractional digits.
#[inline]
pub fn round_half_up(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// `value` as a percent of `total`, rounded half-up to `scale` digits.
///
/// Zero when `total` is zero. `None` on overflow.
pub fn percent_of(value: Decimal, total: Decimal, scale: u32) -> Option<Decimal> {
    if total.is_zero() {
        return Some(Decimal::ZERO);
    }
    let pct = value.checked_mul(HUNDRED)?.checked_div(total)?;
    Some(round_half_up(pct, scale))
}

/// Output of a rebalance run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebalancePlan {
    /// Total current value of the portfolio, the reserve included.
    pub total_value: Decimal,
    /// Reserve line first, then the portfolio's other securities in input order.
    pub lines: Vec<TargetLine>,
}

impl RebalancePlan {
    pub fn iter(&self) -> std::slice::Iter<'_, TargetLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of the engine's target values. Equals `total_value` exactly.
    ///
    /// `None` on overflow.
    pub fn target_value_sum(&self) -> Option<Decimal> {
        self.lines
            .iter()
            .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.target_value))
    }

    /// Sum of `price × target_qty` over all lines, i.e. the value actually
    /// represented by whole-unit targets. `None` on overflow.
    pub fn reported_value(&self) -> Option<Decimal> {
        self.lines.iter().try_fold(Decimal::ZERO, |acc, l| {
            l.price
                .checked_mul(Decimal::from(l.target_qty))
                .and_then(|v| acc.checked_add(v))
        })
    }
}

impl<'a> IntoIterator for &'a RebalancePlan {
    type Item = &'a TargetLine;
    type IntoIter = std::slice::Iter<'a, TargetLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Target quantity and value for a single security.
#[derive(Clone, Copy, Debug)]
struct Sizing {
    target_qty: i64,
    target_value: Decimal,
}

/// Rebalance against the default reserve security ([`DEFAULT_RESERVE`]).
pub fn rebalance(portfolio: &Portfolio, model: &Model) -> Result<RebalancePlan, RebalanceError> {
    rebalance_with_reserve(portfolio, model, DEFAULT_RESERVE)
}

/// Compute target lines for every portfolio security.
///
/// Fails if the model lacks the reserve, if any security in the union of
/// portfolio and model has no position (no price), on a zero price, or on
/// arithmetic overflow.
pub fn rebalance_with_reserve(
    portfolio: &Portfolio,
    model: &Model,
    reserve: &str,
) -> Result<RebalancePlan, RebalanceError> {
    if !model.contains_reserve(reserve) {
        return Err(RebalanceError::MissingReserve {
            reserve: reserve.to_string(),
        });
    }

    let universe: BTreeSet<&str> = portfolio.securities().chain(model.securities()).collect();
    let total_value = portfolio.total_value()?;

    let sized = universe
        .iter()
        .copied()
        .filter(|sec| !is_reserve(sec, reserve))
        .map(|sec| size_security(sec, portfolio, model, total_value).map(|s| (sec, s)))
        .collect::<Result<Vec<_>, _>>()?;

    let non_reserve_value = sized
        .iter()
        .try_fold(Decimal::ZERO, |acc, (sec, s)| {
            acc.checked_add(s.target_value)
                .ok_or_else(|| overflow(sec))
        })?;

    let reserve_pos = portfolio
        .get_reserve(reserve)
        .ok_or_else(|| RebalanceError::MissingPrice {
            security: reserve.to_string(),
        })?;
    let reserve_sizing = size_reserve(reserve_pos, total_value, non_reserve_value)?;
    let sized: FxHashMap<&str, Sizing> = sized.into_iter().collect();

    let reserve_line = std::iter::once((reserve_pos, reserve_sizing));
    let other_lines = portfolio
        .iter()
        .filter(|pos| !is_reserve(&pos.security, reserve))
        .filter_map(|pos| sized.get(pos.security.as_str()).map(|s| (pos, *s)));

    let lines = reserve_line
        .chain(other_lines)
        .map(|(pos, s)| target_line(pos, s, total_value))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RebalancePlan { total_value, lines })
}

/// Size one non-reserve security from its model percent (0 when absent).
fn size_security(
    security: &str,
    portfolio: &Portfolio,
    model: &Model,
    total_value: Decimal,
) -> Result<Sizing, RebalanceError> {
    let pos = portfolio
        .get(security)
        .ok_or_else(|| RebalanceError::MissingPrice {
            security: security.to_string(),
        })?;
    let percent = model.get(security).map_or(Decimal::ZERO, |a| a.percent);

    let ideal_value = total_value
        .checked_mul(percent)
        .and_then(|v| v.checked_div(HUNDRED))
        .map(|v| round_half_up(v, IDEAL_SCALE))
        .ok_or_else(|| overflow(security))?;
    let ideal_qty = round_half_up(divide_by_price(ideal_value, pos)?, IDEAL_SCALE);

    let trade_qty = ideal_qty
        .checked_sub(Decimal::from(pos.quantity))
        .map(|d| round_half_up(d, 0))
        .and_then(|d| d.to_i64())
        .ok_or_else(|| overflow(security))?;
    let target_qty = pos
        .quantity
        .checked_add(trade_qty)
        .ok_or_else(|| overflow(security))?
        .max(0);
    let target_value = pos
        .price
        .checked_mul(Decimal::from(target_qty))
        .ok_or_else(|| overflow(security))?;

    Ok(Sizing {
        target_qty,
        target_value,
    })
}

/// Size the reserve from the residual value.
///
/// The residual is not clamped; the quantity is rounded half-up at
/// [`IDEAL_SCALE`] and then truncated toward zero.
fn size_reserve(
    pos: &Position,
    total_value: Decimal,
    non_reserve_value: Decimal,
) -> Result<Sizing, RebalanceError> {
    let target_value = total_value
        .checked_sub(non_reserve_value)
        .ok_or_else(|| overflow(&pos.security))?;
    let target_qty = round_half_up(divide_by_price(target_value, pos)?, IDEAL_SCALE)
        .trunc()
        .to_i64()
        .ok_or_else(|| overflow(&pos.security))?;

    Ok(Sizing {
        target_qty,
        target_value,
    })
}

fn target_line(
    pos: &Position,
    sizing: Sizing,
    total_value: Decimal,
) -> Result<TargetLine, RebalanceError> {
    let target_percent = percent_of(sizing.target_value, total_value, REALIZED_PERCENT_SCALE)
        .ok_or_else(|| overflow(&pos.security))?;
    Ok(TargetLine {
        security: pos.security.clone(),
        price: pos.price,
        current_qty: pos.quantity,
        target_qty: sizing.target_qty,
        target_value: sizing.target_value,
        target_percent,
    })
}

fn divide_by_price(value: Decimal, pos: &Position) -> Result<Decimal, RebalanceError> {
    if pos.price.is_zero() {
        return Err(RebalanceError::ZeroPrice {
            security: pos.security.clone(),
        });
    }
    value
        .checked_div(pos.price)
        .ok_or_else(|| overflow(&pos.security))
}

fn overflow(security: &str) -> RebalanceError {
    RebalanceError::Overflow {
        security: security.to_string(),
    }
}
