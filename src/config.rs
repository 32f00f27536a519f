//! Runtime configuration for the lab binaries.
//!
//! Defaults, then an optional `labsim.toml`, then `LABSIM_STATE` /
//! `LABSIM_CATALOG`, then command-line flags.

use crate::{catalog::DEFAULT_CATALOG_PATH, error::EngineError, inventory::DEFAULT_STATE_PATH};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "labsim.toml";
pub const STATE_ENV_VAR: &str = "LABSIM_STATE";
pub const CATALOG_ENV_VAR: &str = "LABSIM_CATALOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabConfig {
    /// Inventory document path
    #[serde(default = "default_state_path")]
    pub state_path: String,

    /// Reagent catalog path
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
}

fn default_state_path() -> String {
    DEFAULT_STATE_PATH.to_string()
}

fn default_catalog_path() -> String {
    DEFAULT_CATALOG_PATH.to_string()
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            catalog_path: default_catalog_path(),
        }
    }
}

impl LabConfig {
    /// Loads `path` (or `labsim.toml`) and applies environment overrides.
    pub fn load(path: Option<&str>) -> Result<Self, EngineError> {
        let mut config = Self::load_from(Path::new(path.unwrap_or(DEFAULT_CONFIG_PATH)))?;
        config.apply_overrides(
            std::env::var(STATE_ENV_VAR).ok(),
            std::env::var(CATALOG_ENV_VAR).ok(),
        );
        config.validate()?;
        Ok(config)
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::io(format!("Could not read config '{}': {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            EngineError::invalid_input(format!("Could not parse config '{}': {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces paths with any non-empty override.
    pub fn apply_overrides(&mut self, state_path: Option<String>, catalog_path: Option<String>) {
        if let Some(state_path) = state_path.filter(|p| !p.trim().is_empty()) {
            self.state_path = state_path;
        }
        if let Some(catalog_path) = catalog_path.filter(|p| !p.trim().is_empty()) {
            self.catalog_path = catalog_path;
        }
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.state_path.trim().is_empty() {
            return Err(EngineError::invalid_input("state_path must not be empty"));
        }
        if self.catalog_path.trim().is_empty() {
            return Err(EngineError::invalid_input("catalog_path must not be empty"));
        }
        Ok(())
    }
}
