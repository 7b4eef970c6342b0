//! Module engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::version::{InterfaceRange, InterfaceVersion};

/// Module registration and dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModulesConfig {
    /// Oldest module interface version the host accepts.
    #[serde(default = "default_min_version")]
    pub interface_min_version: String,
    /// Newest module interface version the host accepts.
    #[serde(default = "default_max_version")]
    pub interface_max_version: String,
    /// Upper bound on a synchronous hook handler invocation.
    #[serde(default = "default_handler_timeout")]
    pub handler_timeout_seconds: u64,
    /// Modules registered at startup when not already known.
    #[serde(default)]
    pub autoload: Vec<String>,
}

impl ModulesConfig {
    /// Parses the configured interface bounds into a range.
    pub fn interface_range(&self) -> Result<InterfaceRange, AppError> {
        let min: InterfaceVersion = self.interface_min_version.parse()?;
        let max: InterfaceVersion = self.interface_max_version.parse()?;
        InterfaceRange::new(min, max)
    }
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            interface_min_version: default_min_version(),
            interface_max_version: default_max_version(),
            handler_timeout_seconds: default_handler_timeout(),
            autoload: Vec::new(),
        }
    }
}

fn default_min_version() -> String {
    "1.0".to_string()
}

fn default_max_version() -> String {
    "1.2".to_string()
}

fn default_handler_timeout() -> u64 {
    30
}
