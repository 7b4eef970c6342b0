//! Hook dispatcher: threads a payload through the modules bound to a hook.
//!
//! Bindings are processed strictly in creation order. A synchronous binding
//! sees the payload as transformed by every synchronous binding before it;
//! its result replaces the payload on success and is discarded on failure.
//! Asynchronous bindings are handed to the [`TaskSubmitter`] and never feed
//! back into the chain. Hooks whose name contains `on_preload_` are always
//! dispatched synchronously.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use iris_core::error::AppError;
use iris_core::result::AppResult;
use iris_core::types::{BindingId, ModuleId};
use iris_entity::{CaseContext, HookBinding, HookTask, RegisteredModule};

use super::task::TaskSubmitter;
use crate::error::HandlerFailure;
use crate::invoke::invoke_handler;
use crate::loader::ModuleLoader;
use crate::port::InvocationContext;
use crate::store::ModuleStore;

/// One fold step: keep the handler's payload on success, the previous one on failure.
pub fn fold_step(current: Value, step: Result<Value, HandlerFailure>) -> Value {
    step.unwrap_or(current)
}

/// A manual trigger offered to users for a hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualHookEntry {
    /// Binding to pass to [`Dispatcher::trigger_manual`].
    pub binding_id: BindingId,
    /// Module providing the trigger.
    pub module_id: ModuleId,
    /// Module name.
    pub module_name: String,
    /// Manual hook name.
    pub hook_name: String,
    /// Name shown to the user.
    pub display_name: String,
}

/// Dispatches fired hooks to bound modules.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: Arc<dyn ModuleStore>,
    loader: Arc<dyn ModuleLoader>,
    submitter: Option<Arc<dyn TaskSubmitter>>,
    handler_timeout: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher with no worker pool attached.
    ///
    /// Without a submitter, asynchronous bindings run on a detached task.
    pub fn new(store: Arc<dyn ModuleStore>, loader: Arc<dyn ModuleLoader>, handler_timeout: Duration) -> Self {
        Self {
            store,
            loader,
            submitter: None,
            handler_timeout,
        }
    }

    /// Attaches the worker pool asynchronous bindings are submitted to.
    pub fn with_submitter(mut self, submitter: Arc<dyn TaskSubmitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    /// Upper bound on one synchronous handler invocation.
    pub fn handler_timeout(&self) -> Duration {
        self.handler_timeout
    }

    /// Fires `hook_name` and returns the payload after every synchronous binding ran.
    ///
    /// Fails only when the hook is not in the catalog. Handler failures are
    /// logged and leave the payload unchanged.
    pub async fn fire(&self, hook_name: &str, payload: Value, case: &CaseContext) -> AppResult<Value> {
        let Some(hook) = self.store.find_hook_by_name(hook_name).await? else {
            error!(hook = %hook_name, case_id = %case.case_id, "Fired hook is not in the catalog");
            return Err(AppError::unknown_hook(format!("Hook {hook_name} is unknown")));
        };

        let bindings = self.store.active_bindings_for_hook(hook.hook_id).await?;
        if bindings.is_empty() {
            return Ok(payload);
        }

        debug!(
            hook = %hook.hook_name,
            case_id = %case.case_id,
            binding_count = bindings.len(),
            "Dispatching hook"
        );

        let mut payload = payload;
        for (binding, module) in &bindings {
            let step = self.run_binding(binding, module, &payload, case).await;
            payload = fold_step(payload, step);
        }

        Ok(payload)
    }

    /// Manual triggers active modules offer for `hook_name`.
    pub async fn manual_hooks(&self, hook_name: &str) -> AppResult<Vec<ManualHookEntry>> {
        let hook = self
            .store
            .find_hook_by_name(hook_name)
            .await?
            .ok_or_else(|| AppError::unknown_hook(format!("Hook {hook_name} is unknown")))?;

        Ok(self
            .store
            .active_bindings_for_hook(hook.hook_id)
            .await?
            .into_iter()
            .filter(|(binding, _)| binding.is_manual_hook)
            .map(|(binding, module)| ManualHookEntry {
                binding_id: binding.binding_id,
                module_id: module.module_id,
                display_name: binding
                    .manual_hook_display_name
                    .clone()
                    .unwrap_or_else(|| format!("{}::{}", module.name, binding.hook_name)),
                module_name: module.name,
                hook_name: binding.hook_name,
            })
            .collect())
    }

    /// Runs one manual trigger on behalf of a user.
    pub async fn trigger_manual(&self, binding_id: BindingId, payload: Value, case: &CaseContext) -> AppResult<Value> {
        let binding = self
            .store
            .find_binding(binding_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Binding {binding_id} not found")))?;

        if !binding.is_manual_hook {
            return Err(AppError::validation(format!(
                "Binding {binding_id} is not a manual trigger ({})",
                binding.hook_name
            )));
        }

        let module = self
            .store
            .find_module(binding.module_id)
            .await?
            .filter(|m| m.is_active)
            .ok_or_else(|| AppError::not_found(format!("Module ID {} is not available", binding.module_id)))?;

        info!(
            module = %module.name,
            hook = %binding.hook_name,
            case_id = %case.case_id,
            user = ?case.initiating_user,
            "Manual hook triggered"
        );

        let step = self.run_binding(&binding, &module, &payload, case).await;
        Ok(fold_step(payload, step))
    }

    async fn run_binding(
        &self,
        binding: &HookBinding,
        module: &RegisteredModule,
        payload: &Value,
        case: &CaseContext,
    ) -> Result<Value, HandlerFailure> {
        let result = if binding.dispatches_asynchronously() {
            self.enqueue(binding, module, payload, case).await.map(|()| payload.clone())
        } else {
            self.invoke_inline(binding, module, payload, case).await
        };

        if let Err(failure) = &result {
            warn!(
                module = %module.name,
                hook = %binding.hook_name,
                binding_id = %binding.binding_id,
                error = %failure,
                "Hook handler failed, payload left unchanged"
            );
        }
        result
    }

    async fn invoke_inline(
        &self,
        binding: &HookBinding,
        module: &RegisteredModule,
        payload: &Value,
        case: &CaseContext,
    ) -> Result<Value, HandlerFailure> {
        let port = self.loader.load(&module.name).ok_or(HandlerFailure::Unavailable)?;
        let context = InvocationContext::new(case.clone(), module.config.clone());

        let status = invoke_handler(port, &binding.hook_name, payload.clone(), context, self.handler_timeout).await?;

        debug!(
            module = %module.name,
            hook = %binding.hook_name,
            message = %status.message,
            "Hook handler succeeded"
        );
        Ok(status.into_data().unwrap_or_else(|| payload.clone()))
    }

    async fn enqueue(
        &self,
        binding: &HookBinding,
        module: &RegisteredModule,
        payload: &Value,
        case: &CaseContext,
    ) -> Result<(), HandlerFailure> {
        let Some(submitter) = &self.submitter else {
            return self.spawn_detached(binding, module, payload, case).await;
        };

        let task = HookTask::new(&module.name, &binding.hook_name, payload, case, binding.max_retry)
            .map_err(|e| HandlerFailure::Failed(format!("payload could not be serialized: {e}")))?;
        let ticket = submitter
            .submit(task)
            .await
            .map_err(|e| HandlerFailure::Failed(format!("task submission failed: {e}")))?;

        debug!(
            module = %module.name,
            hook = %binding.hook_name,
            task_id = %ticket.task_id,
            "Hook task enqueued"
        );

        if binding.wait_for_completion {
            match ticket.wait(self.handler_timeout).await {
                Some(outcome) => debug!(
                    task_id = %outcome.task_id,
                    status = %outcome.status,
                    attempts = outcome.attempts,
                    "Awaited hook task finished"
                ),
                None => warn!(
                    module = %module.name,
                    hook = %binding.hook_name,
                    "Awaited hook task did not report in time"
                ),
            }
        }

        Ok(())
    }

    async fn spawn_detached(
        &self,
        binding: &HookBinding,
        module: &RegisteredModule,
        payload: &Value,
        case: &CaseContext,
    ) -> Result<(), HandlerFailure> {
        let port = self.loader.load(&module.name).ok_or(HandlerFailure::Unavailable)?;
        let context = InvocationContext::new(case.clone(), module.config.clone());
        let module_name = module.name.clone();
        let hook_name = binding.hook_name.clone();
        let data = payload.clone();
        let timeout = self.handler_timeout;

        let handle = tokio::spawn(async move {
            port.set_log_handler();
            if let Err(failure) = invoke_handler(port, &hook_name, data, context, timeout).await {
                warn!(module = %module_name, hook = %hook_name, error = %failure, "Detached hook handler failed");
            }
        });

        if binding.wait_for_completion {
            if let Err(e) = handle.await {
                warn!(module = %module.name, hook = %binding.hook_name, error = %e, "Detached hook task failed");
            }
        }
        Ok(())
    }
}
