//! rebalance-cli: file-driven portfolio rebalancer.
//!
//! Reads current holdings and a target model from comma-separated files,
//! computes whole-unit target quantities with the `rebalance` engine, and
//! writes the targets back out as a comma-separated report.

pub mod audit;
pub mod config;
pub mod drift;
pub mod error;
pub mod execution;
pub mod loader;
pub mod report;
