//! TOML-based configuration system for Dirgate.

use crate::error::{DirgateError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level Dirgate configuration, deserialized from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirgateConfig {
    pub dirgate: DirgateSection,
    #[serde(default)]
    pub directory: DirectoryConfig,
}

/// Core instance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirgateSection {
    /// The managed email domain this instance serves.
    pub domain: String,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path for the credential/settings store.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Some("/var/lib/dirgate/dirgate.db".into()),
        }
    }
}

/// Directory API access configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DirectoryConfig {
    /// When true and no credentials are stored, fall back to a service
    /// account key file instead of failing with a setup error.
    #[serde(default)]
    pub service_account: bool,
    /// Path to the service account JSON key file.
    #[serde(default)]
    pub service_account_key_path: Option<String>,
    /// Workspace admin to impersonate when using a service account.
    #[serde(default)]
    pub delegated_admin: Option<String>,
}

impl DirgateConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| DirgateError::Config(format!("failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Validate the configuration, returning an error for invalid combinations.
    pub fn validate(&self) -> Result<()> {
        if self.dirgate.domain.is_empty() {
            return Err(DirgateError::Config(
                "dirgate.domain must not be empty".into(),
            ));
        }

        if self.directory.service_account && self.directory.service_account_key_path.is_none() {
            return Err(DirgateError::Config(
                "directory.service_account_key_path is required when service_account is enabled"
                    .into(),
            ));
        }

        Ok(())
    }
}
