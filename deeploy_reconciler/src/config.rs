//! Reconciler configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `DEEPLOY_*` environment variables.

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix every node address on the network carries.
pub const DEFAULT_NODE_ADDRESS_PREFIX: &str = "0xai_";

/// Prefix for the alias given to pipeline-only jobs that carry no name.
pub const DEFAULT_FALLBACK_ALIAS_PREFIX: &str = "job_";

pub const ENV_PREFIX: &str = "DEEPLOY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    pub node_address_prefix: String,
    pub fallback_alias_prefix: String,
    pub log_level: String, // "error", "warn", "info", "debug", "trace"
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        ReconcilerConfig {
            node_address_prefix: DEFAULT_NODE_ADDRESS_PREFIX.to_string(),
            fallback_alias_prefix: DEFAULT_FALLBACK_ALIAS_PREFIX.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ReconcilerConfig {
    /// Load configuration, reading `path` when given and then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("node_address_prefix", defaults.node_address_prefix)?
            .set_default("fallback_alias_prefix", defaults.fallback_alias_prefix)?
            .set_default("log_level", defaults.log_level)?;

        if let Some(path) = path {
            log::debug!("Loading reconciler config from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let loaded: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.node_address_prefix.trim().is_empty() {
            return Err(Error::invalid_config(
                "node_address_prefix",
                "must not be empty",
            ));
        }
        if self.fallback_alias_prefix.trim().is_empty() {
            return Err(Error::invalid_config(
                "fallback_alias_prefix",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.node_address_prefix, "0xai_");
        assert_eq!(config.fallback_alias_prefix, "job_");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "node_address_prefix = \"0xtest_\"").unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();

        let config = ReconcilerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.node_address_prefix, "0xtest_");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.fallback_alias_prefix, "job_");
    }

    #[test]
    fn test_blank_prefix_rejected() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "node_address_prefix = \"  \"").unwrap();

        let err = ReconcilerConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ReconcilerConfig::load(Some(Path::new("/nonexistent/deeploy.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
