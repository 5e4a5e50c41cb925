//! Configuration types for the drydock core
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Main drydock configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrydockConfig {
    /// Ingester settings
    #[serde(default)]
    pub ingester: IngesterConfig,

    /// Effective-design resolution settings
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Validator settings
    #[serde(default)]
    pub validator: ValidatorConfig,
}

impl DrydockConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.orchestrator.validate()?;
        self.validator.validate()?;
        Ok(())
    }
}

/// What the ingester does with entities it cannot classify
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnrecognizedPolicy {
    /// Drop silently (debug log only)
    Drop,
    /// Log a warning and drop
    #[default]
    Warn,
    /// Fail the ingestion call with a processing error
    Reject,
}

impl FromStr for UnrecognizedPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "warn" => Ok(Self::Warn),
            "reject" => Ok(Self::Reject),
            other => Err(crate::Error::config(format!(
                "Unknown unrecognized-entity policy '{}' (expected drop, warn or reject)",
                other
            ))),
        }
    }
}

impl fmt::Display for UnrecognizedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drop => f.write_str("drop"),
            Self::Warn => f.write_str("warn"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Ingester configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngesterConfig {
    /// Handling of entities outside the six known kinds
    #[serde(default)]
    pub unrecognized: UnrecognizedPolicy,
}

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Name of the ingestion plugin used for design references
    #[serde(default = "default_plugin")]
    pub plugin: String,

    /// Upper bound on fetching, ingesting and resolving one design (in seconds)
    ///
    /// Set to 0 to disable the bound.
    #[serde(default = "default_resolve_timeout_secs")]
    pub resolve_timeout_secs: u64,
}

impl OrchestratorConfig {
    /// Validate the orchestrator configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.plugin.trim().is_empty() {
            return Err(crate::Error::config("Orchestrator plugin name cannot be empty"));
        }
        Ok(())
    }

    /// Use a different ingestion plugin
    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = plugin.into();
        self
    }

    /// Set the resolution timeout
    pub fn with_resolve_timeout_secs(mut self, secs: u64) -> Self {
        self.resolve_timeout_secs = secs;
        self
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            plugin: default_plugin(),
            resolve_timeout_secs: default_resolve_timeout_secs(),
        }
    }
}

/// Validator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Rules to run; empty means every registered rule
    #[serde(default)]
    pub rules: Vec<String>,

    /// Whether callers should treat any error message as a failed validation
    #[serde(default = "default_fail_on_error")]
    pub fail_on_error: bool,
}

impl ValidatorConfig {
    /// Validate the validator configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.rules.iter().any(|r| r.trim().is_empty()) {
            return Err(crate::Error::config("Validator rule names cannot be empty"));
        }
        Ok(())
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            fail_on_error: default_fail_on_error(),
        }
    }
}

fn default_plugin() -> String {
    "yaml".to_string()
}

fn default_resolve_timeout_secs() -> u64 {
    300
}

fn default_fail_on_error() -> bool {
    true
}
