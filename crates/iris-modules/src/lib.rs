//! # iris-modules
//!
//! Module engine for IRIS. Provides:
//!
//! - The module contract ([`ModulePort`]) and its capability descriptor
//! - Name-based module instantiation through a [`ModuleLoader`]
//! - Interface compatibility validation before registration
//! - The module registry with configuration and activation state
//! - The hook catalog and module-to-hook bindings
//! - The hook dispatcher threading a payload through synchronous handlers
//!   and handing asynchronous ones to a [`TaskSubmitter`]

pub mod compat;
pub mod descriptor;
pub mod error;
pub mod hooks;
pub mod invoke;
pub mod loader;
pub mod manager;
pub mod port;
pub mod registry;
pub mod store;

pub use compat::{CompatibilityChecker, ValidationIssue, ValidationReport};
pub use descriptor::ModuleDescriptor;
pub use error::{BindError, HandlerFailure, RegistrationError};
pub use hooks::binding::{BindRequest, HookBinder, HookRegistrar};
pub use hooks::catalog::{HookCatalog, default_hooks};
pub use hooks::dispatcher::{Dispatcher, ManualHookEntry, fold_step};
pub use hooks::task::{TaskSubmitter, TaskTicket};
pub use invoke::invoke_handler;
pub use loader::{ModuleFactory, ModuleLoader, StaticModuleLoader};
pub use manager::ModuleManager;
pub use port::{InvocationContext, ModulePort};
pub use registry::{HealthReport, ModuleRegistry, PipelineEntry};
pub use store::{MemoryModuleStore, ModuleStore, NewBinding};
