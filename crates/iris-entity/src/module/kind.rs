//! Module type and pipeline argument enumerations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of pluggable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    /// Data-ingestion module providing an import pipeline.
    Pipeline,
    /// Event processor reacting to hooks.
    Processor,
}

impl ModuleType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pipeline => "pipeline",
            Self::Processor => "processor",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ModuleType {
    type Err = String;

    /// Accepts `pipeline`/`processor` and the `module_`-prefixed spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches("module_") {
            "pipeline" => Ok(Self::Pipeline),
            "processor" => Ok(Self::Processor),
            _ => Err(format!(
                "Unrecognised module type. Expected pipeline or processor, got '{s}'"
            )),
        }
    }
}

/// Whether a pipeline argument must be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineArgRequirement {
    /// The argument must be supplied.
    Required,
    /// The argument may be omitted.
    Optional,
}

impl FromStr for PipelineArgRequirement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "required" | "mandatory" => Ok(Self::Required),
            "optional" => Ok(Self::Optional),
            other => Err(format!("Unknown pipeline argument requirement '{other}'")),
        }
    }
}

/// An argument accepted by a module's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineArg {
    /// Argument name.
    pub name: String,
    /// Required or optional.
    pub requirement: PipelineArgRequirement,
    /// Description shown to the analyst.
    #[serde(default)]
    pub description: String,
}
