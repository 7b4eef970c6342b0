//! Capability snapshot extracted from a module implementation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use iris_core::types::InterfaceVersion;
use iris_entity::{ConfigOption, ModuleType, PipelineArg, PipelineArgRequirement};

use crate::port::ModulePort;

/// Keys a pipeline information object must carry.
pub const REQUIRED_PIPELINE_FIELDS: [&str; 5] = [
    "pipeline_internal_name",
    "pipeline_human_name",
    "pipeline_args",
    "pipeline_update_support",
    "pipeline_import_support",
];

/// Identity and capabilities of a module, built on demand and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Name the module is loaded by.
    pub name: String,
    /// Human-readable name.
    pub human_name: String,
    /// Description.
    pub description: String,
    /// Implementation version.
    pub module_version: String,
    /// Interface version as declared.
    pub interface_version: String,
    /// Module type as declared.
    pub module_type: String,
    /// Whether a pipeline is provided.
    pub provides_pipeline: bool,
    /// Raw pipeline information object.
    pub pipeline_info: Value,
    /// Pipeline arguments, in declaration order.
    pub pipeline_args: Vec<PipelineArg>,
    /// Pipeline argument entries that could not be understood.
    pub pipeline_arg_errors: Vec<String>,
    /// Declared configuration options.
    pub init_configuration: Vec<ConfigOption>,
}

impl ModuleDescriptor {
    /// Extracts the descriptor of a loaded module.
    pub fn from_port(name: &str, port: &dyn ModulePort) -> Self {
        let provides_pipeline = port.is_providing_pipeline();
        let pipeline_info = if provides_pipeline {
            port.pipeline_info()
        } else {
            Value::Null
        };
        let (pipeline_args, pipeline_arg_errors) = match pipeline_info.get("pipeline_args") {
            Some(args) => parse_pipeline_args(args),
            None => (Vec::new(), Vec::new()),
        };

        Self {
            name: name.to_string(),
            human_name: port.module_name().to_string(),
            description: port.module_description().to_string(),
            module_version: port.module_version().to_string(),
            interface_version: port.interface_version().to_string(),
            module_type: port.module_type().to_string(),
            provides_pipeline,
            pipeline_info,
            pipeline_args,
            pipeline_arg_errors,
            init_configuration: port.init_configuration(),
        }
    }

    /// The declared interface version, if it parses.
    pub fn parsed_interface_version(&self) -> Option<InterfaceVersion> {
        self.interface_version.parse().ok()
    }

    /// The declared module type, if it is a known kind.
    pub fn parsed_module_type(&self) -> Option<ModuleType> {
        self.module_type.parse().ok()
    }

    /// Pipeline fields missing from the information object.
    ///
    /// A field is present when it exists and is not `null`.
    pub fn missing_pipeline_fields(&self) -> Vec<&'static str> {
        REQUIRED_PIPELINE_FIELDS
            .iter()
            .copied()
            .filter(|field| self.pipeline_info.get(field).is_none_or(Value::is_null))
            .collect()
    }

    /// Configuration options with declared defaults copied into their values.
    pub fn seeded_configuration(&self) -> Vec<ConfigOption> {
        let mut config = self.init_configuration.clone();
        for option in &mut config {
            option.preset_from_default();
        }
        config
    }
}

/// Parses pipeline arguments declared either as `[name, requirement, description]`
/// triples or as objects.
fn parse_pipeline_args(value: &Value) -> (Vec<PipelineArg>, Vec<String>) {
    let mut args = Vec::new();
    let mut errors = Vec::new();

    let Some(entries) = value.as_array() else {
        errors.push("pipeline_args is not a list".to_string());
        return (args, errors);
    };

    for (index, entry) in entries.iter().enumerate() {
        match parse_pipeline_arg(entry) {
            Ok(arg) => args.push(arg),
            Err(e) => errors.push(format!("pipeline_args[{index}]: {e}")),
        }
    }

    (args, errors)
}

fn parse_pipeline_arg(entry: &Value) -> Result<PipelineArg, String> {
    match entry {
        Value::Array(parts) => {
            let name = parts
                .first()
                .and_then(Value::as_str)
                .ok_or("missing argument name")?;
            let requirement: PipelineArgRequirement = parts
                .get(1)
                .and_then(Value::as_str)
                .ok_or("missing requirement")?
                .parse()?;
            let description = parts.get(2).and_then(Value::as_str).unwrap_or_default();
            Ok(PipelineArg {
                name: name.to_string(),
                requirement,
                description: description.to_string(),
            })
        }
        Value::Object(_) => serde_json::from_value(entry.clone()).map_err(|e| e.to_string()),
        _ => Err("expected a list or an object".to_string()),
    }
}
