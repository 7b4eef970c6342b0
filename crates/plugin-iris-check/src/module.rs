//! [`ModulePort`] implementation of the check module.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing;

use iris_core::types::{ModuleId, StatusResult};
use iris_entity::ConfigOption;
use iris_modules::{HookRegistrar, InvocationContext, ModulePort};

use crate::hooks::{bind_requests, stamp};

/// Name the module is registered under.
pub const MODULE_NAME: &str = "iris_check_module";

const DEFAULT_TAG_KEY: &str = "iris_check";

/// Processor that acknowledges every hook it is bound to.
#[derive(Debug, Default)]
pub struct IrisCheckModule;

impl IrisCheckModule {
    /// Create the module
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModulePort for IrisCheckModule {
    fn module_name(&self) -> &str {
        "IRIS Check"
    }

    fn module_description(&self) -> &str {
        "Logs every case lifecycle hook and stamps the payload with what it saw"
    }

    fn module_version(&self) -> &str {
        "1.0.0"
    }

    fn interface_version(&self) -> &str {
        "1.2"
    }

    fn module_type(&self) -> &str {
        "module_processor"
    }

    fn init_configuration(&self) -> Vec<ConfigOption> {
        vec![
            ConfigOption::new("log_received_hook", "bool")
                .with_default(json!(true))
                .with_description("Log every hook received"),
            ConfigOption::new("tag_key", "string")
                .with_default(json!(DEFAULT_TAG_KEY))
                .with_description("Payload key the stamp is written under"),
        ]
    }

    async fn register_hooks(&self, module_id: ModuleId, registrar: &dyn HookRegistrar) -> StatusResult {
        let mut logs = Vec::new();
        let mut failed = 0usize;

        for request in bind_requests(module_id) {
            let hook_name = request.hook_name.clone();
            match registrar.register_hook(request).await {
                Ok(_) => logs.push(format!("Registered to {}", hook_name)),
                Err(e) => {
                    failed += 1;
                    tracing::warn!("IRIS check could not bind to {}: {}", hook_name, e);
                    logs.push(format!("Failed to register to {}: {}", hook_name, e));
                }
            }
        }

        if failed > 0 {
            StatusResult::failure(format!("{} hook registrations failed", failed)).with_logs(logs)
        } else {
            StatusResult::ok(format!("Registered to {} hooks", logs.len())).with_logs(logs)
        }
    }

    async fn hooks_handler(&self, hook_name: &str, data: Value, context: &InvocationContext) -> StatusResult {
        let log_received = context
            .config_value("log_received_hook")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let tag_key = context
            .config_value("tag_key")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_TAG_KEY);

        if log_received {
            tracing::info!(
                "IRIS check received hook '{}' on case {} (user={:?})",
                hook_name,
                context.case.case_id,
                context.case.initiating_user
            );
        }

        StatusResult::success(stamp(data, tag_key, hook_name, context.case.case_id))
            .with_message(format!("Hook {} acknowledged", hook_name))
    }
}
