//! Registered module records.

pub mod config;
pub mod kind;
pub mod model;

pub use config::ConfigOption;
pub use kind::{ModuleType, PipelineArg, PipelineArgRequirement};
pub use model::RegisteredModule;
