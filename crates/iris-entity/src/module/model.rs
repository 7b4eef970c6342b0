//! Registered module entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use iris_core::types::{InterfaceVersion, ModuleId};

use super::config::ConfigOption;
use super::kind::{ModuleType, PipelineArg};

/// The durable record that a module is known and may be dispatched to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredModule {
    /// System-assigned identifier.
    pub module_id: ModuleId,
    /// Unique module name, the key used to instantiate the implementation.
    pub name: String,
    /// Human-readable name.
    pub human_name: String,
    /// Module description.
    pub description: String,
    /// Module implementation version.
    pub module_version: String,
    /// Interface version the module was built against.
    pub interface_version: InterfaceVersion,
    /// Pipeline or processor.
    pub module_type: ModuleType,
    /// Whether hooks are dispatched to this module.
    pub is_active: bool,
    /// Current configuration, seeded from the declared defaults.
    pub config: Vec<ConfigOption>,
    /// Whether the module provides an import pipeline.
    pub has_pipeline: bool,
    /// Arguments accepted by the pipeline.
    pub pipeline_args: Vec<PipelineArg>,
    /// Raw pipeline information as declared by the module.
    pub pipeline_info: Option<Value>,
    /// When the module was registered.
    pub date_added: DateTime<Utc>,
}

impl RegisteredModule {
    /// Current value of a configuration option.
    pub fn config_value(&self, param_name: &str) -> Option<&Value> {
        self.config
            .iter()
            .find(|option| option.param_name == param_name)
            .and_then(|option| option.value.as_ref())
    }

    /// Whether the module can be offered as an import pipeline.
    pub fn is_available_pipeline(&self) -> bool {
        self.has_pipeline && self.is_active
    }
}
