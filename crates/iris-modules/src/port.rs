//! The contract every pluggable module implements.

use async_trait::async_trait;
use serde_json::Value;

use iris_core::types::{ModuleId, StatusResult};
use iris_entity::{CaseContext, ConfigOption};

use crate::hooks::binding::HookRegistrar;

/// What a module's hook handler gets besides the hook name and data.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    /// Case and user the hook was fired for.
    pub case: CaseContext,
    /// The module's current configuration as stored in the registry.
    pub config: Vec<ConfigOption>,
}

impl InvocationContext {
    /// Creates an invocation context.
    pub fn new(case: CaseContext, config: Vec<ConfigOption>) -> Self {
        Self { case, config }
    }

    /// Current value of a configuration option.
    pub fn config_value(&self, param_name: &str) -> Option<&Value> {
        self.config
            .iter()
            .find(|option| option.param_name == param_name)
            .and_then(|option| option.value.as_ref())
    }
}

/// Trait that all modules must implement.
///
/// Instances are created on demand by a [`crate::ModuleLoader`] for each
/// registration or invocation, so implementations should be cheap to build
/// and must not rely on state surviving between calls.
#[async_trait]
pub trait ModulePort: Send + Sync + std::fmt::Debug {
    /// Human-readable module name.
    fn module_name(&self) -> &str;

    /// Module description.
    fn module_description(&self) -> &str {
        ""
    }

    /// Module implementation version.
    fn module_version(&self) -> &str;

    /// Interface version the module was built against, e.g. `"1.2"`.
    fn interface_version(&self) -> &str;

    /// Declared module type: `pipeline` or `processor`.
    fn module_type(&self) -> &str;

    /// Whether the module provides an import pipeline.
    fn is_providing_pipeline(&self) -> bool {
        false
    }

    /// Pipeline information object, required when a pipeline is provided.
    fn pipeline_info(&self) -> Value {
        Value::Null
    }

    /// Configuration options the module declares.
    fn init_configuration(&self) -> Vec<ConfigOption> {
        Vec::new()
    }

    /// Whether the module is ready to be activated.
    fn is_ready(&self) -> bool {
        true
    }

    /// Lets a processor bind itself to the hooks it wants.
    ///
    /// Called once right after registration.
    async fn register_hooks(&self, _module_id: ModuleId, _registrar: &dyn HookRegistrar) -> StatusResult {
        StatusResult::ok("No hooks to register")
    }

    /// Handles a fired hook.
    ///
    /// A successful result carrying data replaces the payload seen by the
    /// next synchronous binding.
    async fn hooks_handler(&self, hook_name: &str, data: Value, context: &InvocationContext) -> StatusResult;

    /// Installs the module's log handler before an asynchronous invocation.
    fn set_log_handler(&self) {}
}
