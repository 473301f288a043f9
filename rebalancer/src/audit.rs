//! JSONL audit trail.
//!
//! When enabled, each run appends one JSON object per line to the audit
//! file: what was read, what was computed, and where it was written.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use rebalance::{Model, Portfolio, RebalancePlan};
use serde::Serialize;

use crate::error::Result;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger. A disabled logger accepts and drops events.
pub struct AuditLog {
    writer: Option<BufWriter<std::fs::File>>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
        })
    }

    /// A logger that records nothing.
    pub fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
        writer.flush()?;
        Ok(())
    }
}

/// Convenience: log a run start event.
pub fn log_run_started(
    audit: &mut AuditLog,
    portfolio: &Path,
    model: &Path,
    output: &Path,
    reserve: &str,
) -> Result<()> {
    audit.log(
        "run_started",
        serde_json::json!({
            "portfolio_file": portfolio.display().to_string(),
            "model_file": model.display().to_string(),
            "output_file": output.display().to_string(),
            "reserve": reserve,
        }),
    )
}

/// Convenience: log the parsed portfolio.
pub fn log_portfolio_loaded(audit: &mut AuditLog, portfolio: &Portfolio) -> Result<()> {
    let positions: Vec<_> = portfolio
        .iter()
        .map(|p| {
            serde_json::json!({
                "security": p.security,
                "price": p.price.to_string(),
                "qty": p.quantity,
            })
        })
        .collect();

    audit.log(
        "portfolio_loaded",
        serde_json::json!({ "positions": positions }),
    )
}

/// Convenience: log the parsed model.
pub fn log_model_loaded(audit: &mut AuditLog, model: &Model) -> Result<()> {
    let allocations: Vec<_> = model
        .iter()
        .map(|a| {
            serde_json::json!({
                "security": a.security,
                "percent": a.percent.to_string(),
            })
        })
        .collect();

    audit.log(
        "model_loaded",
        serde_json::json!({
            "allocations": allocations,
            "total_percent": model.total_percent().map(|p| p.to_string()),
        }),
    )
}

/// Convenience: log the computed plan.
pub fn log_plan_computed(audit: &mut AuditLog, plan: &RebalancePlan) -> Result<()> {
    let data = serde_json::to_value(plan)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    audit.log("plan_computed", data)
}

/// Convenience: log the written report.
pub fn log_report_written(audit: &mut AuditLog, output: &Path, rows: usize) -> Result<()> {
    audit.log(
        "report_written",
        serde_json::json!({
            "output_file": output.display().to_string(),
            "rows": rows,
        }),
    )
}

/// Convenience: log a failed run.
pub fn log_run_failed(audit: &mut AuditLog, message: &str) -> Result<()> {
    audit.log("run_failed", serde_json::json!({ "error": message }))
}
