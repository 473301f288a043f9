//! Error types for the rebalancer.

use std::path::PathBuf;

use rebalance::RebalanceError;
use rust_decimal::Decimal;

/// All errors that can occur during a rebalancer run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid {field} for security {security}: {value}")]
    InvalidNumber {
        field: &'static str,
        security: String,
        value: String,
    },

    #[error("model must include reserve security {reserve}")]
    MissingReserve { reserve: String },

    #[error("model percentages must sum to 100, got: {sum}")]
    PercentSum { sum: Decimal },

    #[error(transparent)]
    Rebalance(#[from] RebalanceError),

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
