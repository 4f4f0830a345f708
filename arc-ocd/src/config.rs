//! Description of a target, as loaded from a YAML file.
//!
//! ```yaml
//! name: arc700
//! reset:
//!   has_srst: true
//!   srst_pulls_trst: false
//!   srst_no_gating: true
//! reset_halt: true
//! timing:
//!   reset_settle_ms: 50
//! ```
//!
//! Every field is optional and falls back to its default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{architecture::Architecture, reset::ResetConfig};

/// The error type for loading a target description.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The description is not valid YAML, or doesn't match the schema.
    #[error("Failed to parse the target description")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration of a single ARC target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Name of the target, used in log messages.
    pub name: String,
    /// Core family of the target.
    pub architecture: Architecture,
    /// Wiring of the reset lines.
    pub reset: ResetConfig,
    /// Halt the core right after asserting reset.
    pub reset_halt: bool,
    /// Fixed delays used while sequencing the core.
    pub timing: Timing,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            name: "arc".to_string(),
            architecture: Architecture::Arc,
            reset: ResetConfig::default(),
            reset_halt: false,
            timing: Timing::default(),
        }
    }
}

impl TargetConfig {
    /// Parses a target description from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: TargetConfig = serde_yaml::from_str(yaml)?;

        tracing::debug!("Loaded target description: {:?}", config);

        Ok(config)
    }
}

/// Hardware dictated delays, in milliseconds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Time given to the reset condition to propagate after asserting reset.
    pub reset_settle_ms: u64,
    /// Time given to the core to come to rest after a forced halt during examination.
    pub force_halt_settle_ms: u64,
    /// Time after which a halt request is given up.
    pub halt_timeout_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            reset_settle_ms: 50,
            force_halt_settle_ms: 1000,
            halt_timeout_ms: 500,
        }
    }
}

impl Timing {
    /// Delay after asserting reset.
    pub fn reset_settle(&self) -> Duration {
        Duration::from_millis(self.reset_settle_ms)
    }

    /// Delay after the forced halt of the examination.
    pub fn force_halt_settle(&self) -> Duration {
        Duration::from_millis(self.force_halt_settle_ms)
    }

    /// Upper bound for waiting on a halt request.
    pub fn halt_timeout(&self) -> Duration {
        Duration::from_millis(self.halt_timeout_ms)
    }
}
