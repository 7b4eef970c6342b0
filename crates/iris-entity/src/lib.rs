//! # iris-entity
//!
//! Records persisted by the IRIS module engine: registered modules, the
//! hook catalog, module-to-hook bindings, and the asynchronous hook task
//! message exchanged with the worker pool.

pub mod hook;
pub mod module;
pub mod task;

pub use hook::{CaseContext, HookBinding, HookDefinition, MANUAL_HOOK_MARKER, PRELOAD_HOOK_MARKER};
pub use module::{ConfigOption, ModuleType, PipelineArg, PipelineArgRequirement, RegisteredModule};
pub use task::{HookTask, TaskOutcome, TaskStatus};
