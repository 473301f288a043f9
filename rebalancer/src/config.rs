//! TOML configuration loading and validation.
//!
//! Every field has a default, so a run without `--config` behaves like a
//! run with an empty file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rebalance: RebalanceConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RebalanceConfig {
    /// Reserve security, matched case-insensitively.
    #[serde(default = "default_reserve")]
    pub reserve: String,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            reserve: default_reserve(),
        }
    }
}

fn default_reserve() -> String {
    rebalance::DEFAULT_RESERVE.into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_audit_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub file: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_audit_dir(),
            file: default_audit_file(),
        }
    }
}

fn default_audit_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate config from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        let reserve = &self.rebalance.reserve;
        if reserve.is_empty() {
            return Err(Error::Config("reserve security must not be empty".into()));
        }
        if reserve.contains(',') || reserve.chars().any(char::is_whitespace) {
            return Err(Error::Config(format!(
                "reserve security '{reserve}' must not contain commas or whitespace"
            )));
        }
        if self.audit.file.is_empty() {
            return Err(Error::Config("audit file name must not be empty".into()));
        }
        Ok(())
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> PathBuf {
        Path::new(&self.audit.dir).join(&self.audit.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_toml() -> &'static str {
        r#"
[rebalance]
reserve = "CASH"

[audit]
enabled = true
dir = "./logs"
file = "audit.jsonl"
"#
    }

    #[test]
    fn parse_example_config() {
        let config = Config::from_toml(example_toml()).unwrap();
        assert_eq!(config.rebalance.reserve, "CASH");
        assert!(config.audit.enabled);
        assert_eq!(config.audit.file, "audit.jsonl");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.rebalance.reserve, "USD");
        assert!(!config.audit.enabled);
        assert_eq!(config.audit.dir, "./logs");
    }

    #[test]
    fn default_matches_empty_file() {
        let config = Config::default();
        assert_eq!(config.rebalance.reserve, "USD");
        assert!(!config.audit.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_catches_empty_reserve() {
        let mut config = Config::from_toml(example_toml()).unwrap();
        config.rebalance.reserve = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_catches_reserve_with_comma() {
        let toml = example_toml().replace("\"CASH\"", "\"CA,SH\"");
        assert!(matches!(Config::from_toml(&toml), Err(Error::Config(_))));
    }

    #[test]
    fn validate_catches_empty_audit_file() {
        let toml = example_toml().replace("\"audit.jsonl\"", "\"\"");
        assert!(Config::from_toml(&toml).is_err());
    }

    #[test]
    fn unknown_type_is_parse_error() {
        let toml = "[audit]\nenabled = \"yes\"\n";
        assert!(matches!(
            Config::from_toml(toml),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn audit_path() {
        let config = Config::from_toml(example_toml()).unwrap();
        assert_eq!(config.audit_path(), PathBuf::from("./logs/audit.jsonl"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Config::load(Path::new("/nonexistent/rebalancer.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
