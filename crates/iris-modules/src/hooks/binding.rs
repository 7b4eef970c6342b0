//! Binding of registered modules to catalog hooks.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use iris_core::types::ModuleId;
use iris_entity::HookBinding;

use crate::error::BindError;
use crate::store::{ModuleStore, NewBinding};

/// Request to bind a module to a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    /// Module to bind.
    pub module_id: ModuleId,
    /// Hook to bind to.
    pub hook_name: String,
    /// Display name of a manual trigger.
    pub manual_display_name: Option<String>,
    /// Queue invocations to the worker pool.
    pub run_asynchronously: bool,
    /// Extra worker attempts after a failure.
    pub max_retry: u32,
    /// Await the worker outcome during dispatch.
    pub wait_for_completion: bool,
}

impl BindRequest {
    /// An asynchronous binding with no retry.
    pub fn new(module_id: ModuleId, hook_name: impl Into<String>) -> Self {
        Self {
            module_id,
            hook_name: hook_name.into(),
            manual_display_name: None,
            run_asynchronously: true,
            max_retry: 0,
            wait_for_completion: false,
        }
    }

    /// Sets the manual trigger display name.
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.manual_display_name = Some(name.into());
        self
    }

    /// Runs the handler inline during dispatch.
    pub fn synchronous(mut self) -> Self {
        self.run_asynchronously = false;
        self
    }

    /// Sets the number of extra worker attempts.
    pub fn max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = max_retry;
        self
    }

    /// Awaits the worker outcome before dispatch continues.
    pub fn wait_for_completion(mut self) -> Self {
        self.wait_for_completion = true;
        self
    }
}

/// What a module sees while binding itself to hooks.
#[async_trait]
pub trait HookRegistrar: Send + Sync {
    /// Binds a module to a hook. Binding the same pair again updates its policy.
    async fn register_hook(&self, request: BindRequest) -> Result<HookBinding, BindError>;
}

/// Store-backed [`HookRegistrar`].
#[derive(Debug, Clone)]
pub struct HookBinder {
    store: Arc<dyn ModuleStore>,
}

impl HookBinder {
    /// Creates a binder over `store`.
    pub fn new(store: Arc<dyn ModuleStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl HookRegistrar for HookBinder {
    async fn register_hook(&self, request: BindRequest) -> Result<HookBinding, BindError> {
        let module = self
            .store
            .find_module(request.module_id)
            .await?
            .ok_or(BindError::ModuleNotFound(request.module_id))?;

        let hook = match self.store.find_hook_by_name(&request.hook_name).await? {
            Some(hook) => hook,
            None => {
                warn!(module = %module.name, hook = %request.hook_name, "Bind to unknown hook refused");
                return Err(BindError::HookNotFound(request.hook_name));
            }
        };

        let is_manual_hook = hook.is_manual();
        let manual_hook_display_name = match (is_manual_hook, request.manual_display_name) {
            (false, Some(_)) => return Err(BindError::ManualNamingMismatch(hook.hook_name)),
            (false, None) => None,
            (true, Some(name)) => Some(name),
            (true, None) => {
                let existing = self
                    .store
                    .bindings_for_module(module.module_id)
                    .await?
                    .into_iter()
                    .find(|b| b.hook_id == hook.hook_id)
                    .and_then(|b| b.manual_hook_display_name);
                Some(existing.unwrap_or_else(|| format!("{}::{}", module.name, hook.hook_name)))
            }
        };

        let (binding, created) = self
            .store
            .upsert_binding(NewBinding {
                module_id: module.module_id,
                hook_id: hook.hook_id,
                hook_name: hook.hook_name.clone(),
                is_manual_hook,
                manual_hook_display_name,
                run_asynchronously: request.run_asynchronously,
                max_retry: request.max_retry,
                wait_for_completion: request.wait_for_completion,
            })
            .await?;

        info!(
            module = %module.name,
            hook = %hook.hook_name,
            binding_id = %binding.binding_id,
            run_asynchronously = binding.run_asynchronously,
            created,
            "Hook binding registered"
        );

        Ok(binding)
    }
}
