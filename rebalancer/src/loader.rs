//! Portfolio and model file loading.
//!
//! Both inputs are comma-separated text. Rows with too few fields are
//! skipped with a warning; an unparsable number aborts the load.

use std::path::Path;
use std::str::FromStr;

use log::{info, warn};
use rebalance::{Allocation, Model, Portfolio, Position};
use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Parse a decimal in plain (`185.25`) or scientific (`1.8525e2`) notation.
///
/// A literal that `Decimal` cannot hold exactly (more than 28 significant
/// digits, or more than 28 fractional digits) is rejected instead of being
/// rounded to the nearest representable value.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let value = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()?;
    let exact = ExactValue::from_literal(raw)?;
    (ExactValue::from_decimal(value)? == exact).then_some(value)
}

/// A decimal as `±digits × 10^exponent` with leading and trailing zeros
/// stripped from `digits`. Zero is always `(false, "", 0)`.
#[derive(Debug, PartialEq, Eq)]
struct ExactValue {
    negative: bool,
    digits: String,
    exponent: i64,
}

impl ExactValue {
    fn new(negative: bool, digits: &str, exponent: i64) -> Option<Self> {
        let digits = digits.trim_start_matches('0');
        let significant = digits.trim_end_matches('0');
        if significant.is_empty() {
            return Some(Self {
                negative: false,
                digits: String::new(),
                exponent: 0,
            });
        }
        let trailing = i64::try_from(digits.len() - significant.len()).ok()?;
        Some(Self {
            negative,
            digits: significant.to_string(),
            exponent: exponent.checked_add(trailing)?,
        })
    }

    /// Read `[+-]int[.frac][(e|E)[+-]exp]` without any rounding.
    fn from_literal(raw: &str) -> Option<Self> {
        let (negative, unsigned) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        let (mantissa, exponent) = match unsigned.split_once(|c| c == 'e' || c == 'E') {
            Some((m, e)) => (m, e.parse::<i64>().ok()?),
            None => (unsigned, 0),
        };
        let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int.is_empty() && frac.is_empty() {
            return None;
        }
        if !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let frac_len = i64::try_from(frac.len()).ok()?;
        Self::new(negative, &format!("{int}{frac}"), exponent.checked_sub(frac_len)?)
    }

    fn from_decimal(value: Decimal) -> Option<Self> {
        let digits = value.mantissa().unsigned_abs().to_string();
        Self::new(value.is_sign_negative(), &digits, -i64::from(value.scale()))
    }
}

/// Parse portfolio rows `security,price,quantity`.
///
/// Blank lines and lines starting with `Security` (a header) are skipped.
/// Trailing empty fields do not count toward the three required fields.
pub fn parse_portfolio(contents: &str) -> Result<Portfolio> {
    let mut portfolio = Portfolio::new();

    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with("Security") {
            continue;
        }

        let mut fields: Vec<&str> = line.split(',').collect();
        while fields.last().is_some_and(|f| f.is_empty()) {
            fields.pop();
        }
        if fields.len() < 3 {
            warn!("Skipping malformed portfolio line: {line}");
            continue;
        }

        let security = fields[0].trim();
        let price = fields[1].trim();
        let quantity = fields[2].trim();

        let price = parse_decimal(price).ok_or_else(|| Error::InvalidNumber {
            field: "price",
            security: security.to_string(),
            value: price.to_string(),
        })?;
        let quantity: i64 = quantity.parse().map_err(|_| Error::InvalidNumber {
            field: "quantity",
            security: security.to_string(),
            value: quantity.to_string(),
        })?;

        portfolio.insert(Position::new(security, price, quantity));
    }

    Ok(portfolio)
}

/// Parse model rows `security,percent`.
///
/// The first line is always a header and is discarded without inspection.
/// After parsing, the model must contain `reserve` (ignoring case) and the
/// percents of all rows read must sum to exactly 100.
pub fn parse_model(contents: &str, reserve: &str) -> Result<Model> {
    let mut model = Model::new();
    let mut sum = Decimal::ZERO;

    for line in contents.lines().skip(1).map(str::trim) {
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 2 {
            warn!("Skipping malformed model line: {line}");
            continue;
        }

        let security = fields[0].trim();
        let invalid = || Error::InvalidNumber {
            field: "percentage",
            security: security.to_string(),
            value: fields[1].to_string(),
        };
        let percent = parse_decimal(fields[1].trim()).ok_or_else(invalid)?;

        sum = sum.checked_add(percent).ok_or_else(invalid)?;
        model.insert(Allocation::new(security, percent));
    }

    if !model.contains_reserve(reserve) {
        return Err(Error::MissingReserve {
            reserve: reserve.to_string(),
        });
    }
    if sum != Decimal::ONE_HUNDRED {
        return Err(Error::PercentSum { sum });
    }

    Ok(model)
}

/// Read and parse a portfolio file.
pub fn load_portfolio(path: &Path) -> Result<Portfolio> {
    let contents = read(path)?;
    let portfolio = parse_portfolio(&contents)?;
    info!(
        "Loaded {} positions from {}",
        portfolio.len(),
        path.display()
    );
    Ok(portfolio)
}

/// Read and parse a model file.
pub fn load_model(path: &Path, reserve: &str) -> Result<Model> {
    let contents = read(path)?;
    let model = parse_model(&contents, reserve)?;
    info!("Loaded {} allocations from {}", model.len(), path.display());
    Ok(model)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })
}
