//! Run orchestrator: load → rebalance → write.
//!
//! This is the main workflow that ties together all components.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rebalance::{RebalancePlan, rebalance_with_reserve};

use crate::audit::{self, AuditLog};
use crate::config::Config;
use crate::drift;
use crate::error::Result;
use crate::loader;
use crate::report::{self, PlanTable};

/// Inputs and output of a single run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub portfolio: PathBuf,
    pub model: PathBuf,
    pub output: PathBuf,
    /// Compute and print the plan without writing the report.
    pub dry_run: bool,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Report written to this (absolute) path.
    Written(PathBuf),
    /// Dry run: plan printed, nothing written.
    DryRun,
}

/// Execute a full run, recording it in the audit trail when enabled.
pub fn run(config: &Config, opts: &RunOptions) -> Result<Outcome> {
    let mut audit = if config.audit.enabled {
        AuditLog::open(&config.audit_path())?
    } else {
        AuditLog::disabled()
    };
    audit::log_run_started(
        &mut audit,
        &opts.portfolio,
        &opts.model,
        &opts.output,
        &config.rebalance.reserve,
    )?;

    let result = execute(config, opts, &mut audit);

    if let Err(e) = &result {
        if let Err(audit_err) = audit::log_run_failed(&mut audit, &e.to_string()) {
            warn!("Failed to record run failure in audit log: {audit_err}");
        }
    }
    result
}

fn execute(config: &Config, opts: &RunOptions, audit: &mut AuditLog) -> Result<Outcome> {
    let reserve = config.rebalance.reserve.as_str();

    // 1. Load inputs
    let portfolio = loader::load_portfolio(&opts.portfolio)?;
    audit::log_portfolio_loaded(audit, &portfolio)?;
    let model = loader::load_model(&opts.model, reserve)?;
    audit::log_model_loaded(audit, &model)?;

    // 2. Compute targets
    let plan = rebalance_with_reserve(&portfolio, &model, reserve)?;
    info!(
        "Total current value {} across {} lines",
        plan.total_value.normalize(),
        plan.len()
    );
    for line in &plan {
        debug!(
            "{}: {} -> {} ({} {}, {}%)",
            line.security,
            line.current_qty,
            line.target_qty,
            line.action(),
            line.trade_qty().abs(),
            line.target_percent,
        );
    }
    audit::log_plan_computed(audit, &plan)?;

    // 3. Dry run stops here
    if opts.dry_run {
        print!("{}", PlanTable(&plan));
        println!();
        print!("{}", drift::drift(&plan, &model, reserve)?);
        println!("\n[DRY RUN] No report written.");
        return Ok(Outcome::DryRun);
    }
    display_plan(&plan);

    // 4. Write the report
    report::save_report(&opts.output, &plan)?;
    let written = absolute(&opts.output);
    info!("Report written to {}", written.display());
    audit::log_report_written(audit, &written, plan.len())?;

    Ok(Outcome::Written(written))
}

fn display_plan(plan: &RebalancePlan) {
    for row in PlanTable(plan).to_string().lines() {
        info!("{row}");
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
