//! Module configuration options.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One configuration option a module declares, with its current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigOption {
    /// Internal option name.
    pub param_name: String,
    /// Name displayed to administrators.
    #[serde(default)]
    pub param_human_name: String,
    /// Option description.
    #[serde(default)]
    pub param_description: String,
    /// Declared type (`"string"`, `"bool"`, `"int"`, `"sensitive_string"`, ...).
    #[serde(rename = "type", default = "default_type")]
    pub param_type: String,
    /// Whether a value must be set before the module is usable.
    #[serde(default)]
    pub mandatory: bool,
    /// Declared default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Current value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// UI section the option belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl ConfigOption {
    /// Creates an option with no default and no value.
    pub fn new(param_name: impl Into<String>, param_type: impl Into<String>) -> Self {
        let param_name = param_name.into();
        Self {
            param_human_name: param_name.clone(),
            param_name,
            param_description: String::new(),
            param_type: param_type.into(),
            mandatory: false,
            default: None,
            value: None,
            section: None,
        }
    }

    /// Sets the declared default.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Marks the option as mandatory.
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.param_description = description.into();
        self
    }

    /// Copies a declared, non-null default into the current value.
    pub fn preset_from_default(&mut self) {
        if let Some(default) = self.default.as_ref().filter(|d| !d.is_null()) {
            self.value = Some(default.clone());
        }
    }
}

fn default_type() -> String {
    "string".to_string()
}
