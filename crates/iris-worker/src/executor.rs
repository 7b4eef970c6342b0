//! Hook task executor: re-resolves the module and invokes its handler.

use std::sync::Arc;
use std::time::Duration;

use tracing;

use iris_core::error::AppError;
use iris_core::types::StatusResult;
use iris_entity::HookTask;
use iris_modules::{InvocationContext, ModuleLoader, ModuleStore, invoke_handler};

/// Error from hook task execution
#[derive(Debug, thiserror::Error)]
pub enum TaskExecutionError {
    /// Permanent failure, do not retry
    #[error("Permanent task failure: {0}")]
    Permanent(String),

    /// Transient failure, may retry
    #[error("Transient task failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

impl TaskExecutionError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Runs hook tasks against the current module registry state
#[derive(Debug, Clone)]
pub struct HookTaskExecutor {
    /// Module implementations
    loader: Arc<dyn ModuleLoader>,
    /// Registry store the module record is re-read from
    store: Arc<dyn ModuleStore>,
    /// Upper bound on one handler invocation
    handler_timeout: Duration,
}

impl HookTaskExecutor {
    /// Create a new executor
    pub fn new(loader: Arc<dyn ModuleLoader>, store: Arc<dyn ModuleStore>, handler_timeout: Duration) -> Self {
        Self {
            loader,
            store,
            handler_timeout,
        }
    }

    /// Execute one attempt of a task
    ///
    /// The module record is read again so that configuration changes and
    /// deactivation made after the task was queued are honored.
    pub async fn execute(&self, task: &HookTask) -> Result<StatusResult, TaskExecutionError> {
        let payload = task
            .decode_payload()
            .map_err(|e| TaskExecutionError::Permanent(format!("Payload could not be decoded: {}", e)))?;

        let module = self
            .store
            .find_module_by_name(&task.module_name)
            .await?
            .ok_or_else(|| {
                TaskExecutionError::Permanent(format!("Module '{}' is no longer registered", task.module_name))
            })?;

        if !module.is_active {
            return Err(TaskExecutionError::Permanent(format!(
                "Module '{}' is inactive",
                task.module_name
            )));
        }

        let port = self.loader.load(&task.module_name).ok_or_else(|| {
            TaskExecutionError::Permanent(format!("Module '{}' could not be instantiated", task.module_name))
        })?;
        port.set_log_handler();

        tracing::info!(
            "Executing hook task: id={}, module='{}', hook='{}', case={}",
            task.task_id,
            task.module_name,
            task.hook_name,
            task.case_id
        );

        let context = InvocationContext::new(task.context(), module.config.clone());
        invoke_handler(port, &task.hook_name, payload, context, self.handler_timeout)
            .await
            .map_err(|failure| TaskExecutionError::Transient(failure.to_string()))
    }
}
