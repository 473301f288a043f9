//! Drift report: requested model weights vs. what the plan achieves.

use rebalance::{
    Model, REALIZED_PERCENT_SCALE, REPORT_PERCENT_SCALE, RebalanceError, RebalancePlan,
    is_reserve, percent_of, round_half_up,
};
use rust_decimal::Decimal;
use serde::Serialize;

/// Per-security comparison plus plan-wide deviation figures.
#[derive(Debug, Clone, Serialize)]
pub struct DriftReport {
    pub entries: Vec<DriftEntry>,
    /// Largest |realized − requested| over all entries.
    pub max_abs_deviation: Decimal,
    /// Total value minus Σ price × target quantity.
    pub reported_gap: Decimal,
}

/// One security's drift entry. Percents are on the 0–100 scale.
#[derive(Debug, Clone, Serialize)]
pub struct DriftEntry {
    pub security: String,
    pub current_percent: Decimal,
    pub model_percent: Decimal,
    pub target_percent: Decimal,
    pub deviation: Decimal,
    pub current_qty: i64,
    pub target_qty: i64,
}

/// Compare each plan line against the model that produced it.
///
/// Securities without a model entry are compared against 0%. Fails with
/// [`RebalanceError::Overflow`] instead of panicking on out-of-range values.
pub fn drift(
    plan: &RebalancePlan,
    model: &Model,
    reserve: &str,
) -> Result<DriftReport, RebalanceError> {
    let entries = plan
        .iter()
        .map(|line| {
            let overflow = || RebalanceError::Overflow {
                security: line.security.clone(),
            };
            let allocation = if is_reserve(&line.security, reserve) {
                model.get_reserve(reserve)
            } else {
                model.get(&line.security)
            };
            let model_percent = allocation.map_or(Decimal::ZERO, |a| a.percent);
            let current_percent = line
                .price
                .checked_mul(Decimal::from(line.current_qty))
                .and_then(|v| percent_of(v, plan.total_value, REALIZED_PERCENT_SCALE))
                .ok_or_else(overflow)?;
            let deviation = line
                .target_percent
                .checked_sub(model_percent)
                .ok_or_else(overflow)?;

            Ok(DriftEntry {
                security: line.security.clone(),
                current_percent,
                model_percent,
                target_percent: line.target_percent,
                deviation,
                current_qty: line.current_qty,
                target_qty: line.target_qty,
            })
        })
        .collect::<Result<Vec<_>, RebalanceError>>()?;

    let max_abs_deviation = entries
        .iter()
        .map(|e| e.deviation.abs())
        .max()
        .unwrap_or_default();
    let reported_gap = plan
        .reported_value()
        .and_then(|v| plan.total_value.checked_sub(v))
        .ok_or_else(|| RebalanceError::Overflow {
            security: reserve.to_string(),
        })?;

    Ok(DriftReport {
        entries,
        max_abs_deviation,
        reported_gap,
    })
}

fn pct2(value: Decimal) -> Decimal {
    round_half_up(value, REPORT_PERCENT_SCALE)
}

impl std::fmt::Display for DriftReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DRIFT:")?;
        writeln!(
            f,
            "  {:10} {:>10} {:>10} {:>10} {:>10}",
            "Security", "Current%", "Model%", "Target%", "Diff%"
        )?;
        for e in &self.entries {
            writeln!(
                f,
                "  {:10} {:>9.2}% {:>9.2}% {:>9.2}% {:>9.2}%",
                e.security,
                pct2(e.current_percent),
                pct2(e.model_percent),
                pct2(e.target_percent),
                pct2(e.deviation),
            )?;
        }
        writeln!(f, "\n  Max deviation: {:.4}%", self.max_abs_deviation)?;
        writeln!(f, "  Unallocated value: {}", self.reported_gap.normalize())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebalance::{Allocation, Portfolio, Position, rebalance};
    use rust_decimal_macros::dec;

    fn scenario() -> (Portfolio, Model) {
        let portfolio = [
            Position::new("USD", dec!(1), 1000),
            Position::new("AAPL", dec!(100), 5),
        ]
        .into_iter()
        .collect();
        let model = [
            Allocation::new("USD", dec!(50)),
            Allocation::new("AAPL", dec!(50)),
        ]
        .into_iter()
        .collect();
        (portfolio, model)
    }

    #[test]
    fn drift_per_line() {
        let (portfolio, model) = scenario();
        let plan = rebalance(&portfolio, &model).unwrap();
        let report = drift(&plan, &model, "USD").unwrap();

        assert_eq!(report.entries.len(), 2);
        let usd = &report.entries[0];
        assert_eq!(usd.current_percent, dec!(66.6667));
        assert_eq!(usd.model_percent, dec!(50));
        assert_eq!(usd.deviation, dec!(-3.3333));

        let aapl = &report.entries[1];
        assert_eq!(aapl.current_percent, dec!(33.3333));
        assert_eq!(aapl.deviation, dec!(3.3333));

        assert_eq!(report.max_abs_deviation, dec!(3.3333));
        assert!(report.reported_gap.is_zero());
    }

    #[test]
    fn unmodelled_security_compared_to_zero() {
        let portfolio: Portfolio = [
            Position::new("USD", dec!(1), 100),
            Position::new("OLD", dec!(10), 10),
        ]
        .into_iter()
        .collect();
        let model: Model = [Allocation::new("USD", dec!(100))].into_iter().collect();
        let plan = rebalance(&portfolio, &model).unwrap();
        let report = drift(&plan, &model, "USD").unwrap();

        let old = &report.entries[1];
        assert_eq!(old.model_percent, Decimal::ZERO);
        assert_eq!(old.current_percent, dec!(50));
        assert_eq!(old.target_qty, 0);
    }

    #[test]
    fn reserve_looked_up_ignoring_case() {
        let portfolio: Portfolio = [Position::new("usd", dec!(1), 10)].into_iter().collect();
        let model: Model = [Allocation::new("USD", dec!(100))].into_iter().collect();
        let plan = rebalance(&portfolio, &model).unwrap();
        let report = drift(&plan, &model, "USD").unwrap();
        assert_eq!(report.entries[0].model_percent, dec!(100));
    }

    #[test]
    fn display_has_summary() {
        let (portfolio, model) = scenario();
        let plan = rebalance(&portfolio, &model).unwrap();
        let text = drift(&plan, &model, "USD").unwrap().to_string();
        assert!(text.starts_with("DRIFT:"));
        assert!(text.contains("Max deviation: 3.3333%"));
        assert!(text.contains("Unallocated value: 0"));
    }

    #[test]
    fn out_of_range_deviation_is_an_error() {
        let portfolio: Portfolio = [
            Position::new("USD", dec!(1), 10),
            Position::new("AAPL", dec!(1), 0),
        ]
        .into_iter()
        .collect();
        let model: Model = [
            Allocation::new("USD", dec!(100)),
            Allocation::new("AAPL", dec!(0)),
        ]
        .into_iter()
        .collect();
        let mut plan = rebalance(&portfolio, &model).unwrap();
        plan.lines[1].target_percent = dec!(1);

        // A model weight at the edge of the Decimal range cannot be subtracted
        let extreme: Model = [
            Allocation::new("USD", dec!(100)),
            Allocation::new("AAPL", Decimal::MIN),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            drift(&plan, &extreme, "USD").unwrap_err(),
            RebalanceError::Overflow {
                security: "AAPL".into()
            }
        );
    }

    #[test]
    fn out_of_range_reported_value_is_an_error() {
        let portfolio: Portfolio = [Position::new("USD", dec!(1), 10)].into_iter().collect();
        let model: Model = [Allocation::new("USD", dec!(100))].into_iter().collect();
        let mut plan = rebalance(&portfolio, &model).unwrap();
        plan.lines[0].price = Decimal::MAX;
        plan.lines[0].current_qty = 0;

        assert!(matches!(
            drift(&plan, &model, "USD"),
            Err(RebalanceError::Overflow { .. })
        ));
    }
}
