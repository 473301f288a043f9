//! Target report output.
//!
//! The CSV percent column is recomputed from `price × target_qty` at two
//! decimals, independently of the engine's four-decimal realized percent.
//! For the reserve line the two can therefore disagree.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rebalance::{
    REPORT_PERCENT_SCALE, RebalanceError, RebalancePlan, TargetLine, percent_of,
};
use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Header row of the report.
pub const HEADER: &str = "Security,Price,Current Qty.,Target Qty.,Target Percent";

/// Format one report row: `security,price,currentQty,targetQty,percent`.
pub fn format_row(line: &TargetLine, total_value: Decimal) -> Result<String> {
    let overflow = || RebalanceError::Overflow {
        security: line.security.clone(),
    };
    let target_value = line
        .price
        .checked_mul(Decimal::from(line.target_qty))
        .ok_or_else(overflow)?;
    let pct = percent_of(target_value, total_value, REPORT_PERCENT_SCALE).ok_or_else(overflow)?;
    // no "-0.00"
    let pct = if pct.is_zero() { Decimal::ZERO } else { pct };

    Ok(format!(
        "{},{},{},{},{:.2}",
        line.security,
        line.price.normalize(),
        line.current_qty,
        line.target_qty,
        pct,
    ))
}

/// Render the whole report, header included, one row per line.
pub fn render(plan: &RebalancePlan) -> Result<String> {
    let mut out = String::with_capacity(HEADER.len() + 1 + plan.len() * 48);
    out.push_str(HEADER);
    out.push('\n');
    for line in plan {
        out.push_str(&format_row(line, plan.total_value)?);
        out.push('\n');
    }
    Ok(out)
}

/// Render the report and write it to `path`.
///
/// The report is rendered before the file is created, so a formatting
/// failure leaves no file behind.
pub fn save_report(path: &Path, plan: &RebalancePlan) -> Result<()> {
    let contents = render(plan)?;
    let write_err = |e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    };

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(contents.as_bytes()).map_err(write_err)?;
    writer.flush().map_err(write_err)?;
    Ok(())
}

/// Console table of a plan: action, quantities and realized percent per line.
pub struct PlanTable<'a>(pub &'a RebalancePlan);

impl fmt::Display for PlanTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.0;
        writeln!(f, "REBALANCE PLAN (total value {}):", plan.total_value.normalize())?;
        writeln!(
            f,
            "  {:>3}  {:6} {:10} {:>12} {:>10} {:>10} {:>10} {:>9}",
            "#", "Action", "Security", "Price", "Current", "Target", "Trade", "Target%"
        )?;
        for (i, line) in plan.iter().enumerate() {
            writeln!(
                f,
                "  {:>3}  {:6} {:10} {:>12} {:>10} {:>10} {:>+10} {:>8.4}%",
                i + 1,
                line.action().to_string(),
                line.security,
                line.price.normalize().to_string(),
                line.current_qty,
                line.target_qty,
                line.trade_qty(),
                line.target_percent,
            )?;
        }
        Ok(())
    }
}
