//! Persistence of modules, hooks, and bindings.
//!
//! [`ModuleStore`] is the seam to whatever relational store backs the host
//! application. [`MemoryModuleStore`] keeps everything behind a single lock
//! so that uniqueness checks and inserts are atomic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use iris_core::error::AppError;
use iris_core::result::AppResult;
use iris_core::types::{BindingId, HookId, ModuleId};
use iris_entity::{HookBinding, HookDefinition, RegisteredModule};

/// Data required to create or update a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBinding {
    /// Owning module.
    pub module_id: ModuleId,
    /// Target hook.
    pub hook_id: HookId,
    /// Target hook name.
    pub hook_name: String,
    /// Whether the hook is a manual trigger.
    pub is_manual_hook: bool,
    /// Display name for a manual trigger.
    pub manual_hook_display_name: Option<String>,
    /// Dispatch to the worker pool.
    pub run_asynchronously: bool,
    /// Extra worker attempts after a failure.
    pub max_retry: u32,
    /// Await the worker outcome during dispatch.
    pub wait_for_completion: bool,
}

/// Storage for the module engine's records.
#[async_trait]
pub trait ModuleStore: Send + Sync + std::fmt::Debug {
    /// Inserts a module and assigns its `module_id`. Fails with a conflict
    /// when the name is taken.
    async fn insert_module(&self, module: RegisteredModule) -> AppResult<RegisteredModule>;

    /// Replaces a stored module record.
    async fn update_module(&self, module: &RegisteredModule) -> AppResult<()>;

    /// Deletes a module together with its bindings. Returns `true` if deleted.
    async fn delete_module(&self, module_id: ModuleId) -> AppResult<bool>;

    /// Finds a module by id.
    async fn find_module(&self, module_id: ModuleId) -> AppResult<Option<RegisteredModule>>;

    /// Finds a module by name.
    async fn find_module_by_name(&self, name: &str) -> AppResult<Option<RegisteredModule>>;

    /// Lists all modules in registration order.
    async fn list_modules(&self) -> AppResult<Vec<RegisteredModule>>;

    /// Inserts a hook, or returns the existing one with the same name.
    async fn upsert_hook(&self, hook_name: &str, description: &str) -> AppResult<HookDefinition>;

    /// Finds a hook by name.
    async fn find_hook_by_name(&self, hook_name: &str) -> AppResult<Option<HookDefinition>>;

    /// Lists all hooks in insertion order.
    async fn list_hooks(&self) -> AppResult<Vec<HookDefinition>>;

    /// Creates a binding, or updates the policy of the existing binding for
    /// the same module and hook. Returns the binding and whether it is new.
    async fn upsert_binding(&self, binding: NewBinding) -> AppResult<(HookBinding, bool)>;

    /// Finds a binding by id.
    async fn find_binding(&self, binding_id: BindingId) -> AppResult<Option<HookBinding>>;

    /// Bindings of `hook_id` whose module is active, in binding creation order.
    async fn active_bindings_for_hook(&self, hook_id: HookId) -> AppResult<Vec<(HookBinding, RegisteredModule)>>;

    /// Bindings owned by a module, in creation order.
    async fn bindings_for_module(&self, module_id: ModuleId) -> AppResult<Vec<HookBinding>>;
}

#[derive(Debug, Default)]
struct StoreState {
    modules: BTreeMap<ModuleId, RegisteredModule>,
    hooks: BTreeMap<HookId, HookDefinition>,
    bindings: BTreeMap<BindingId, HookBinding>,
    next_module_id: i64,
    next_hook_id: i64,
    next_binding_id: i64,
}

impl StoreState {
    fn next_module_id(&mut self) -> ModuleId {
        self.next_module_id += 1;
        ModuleId::new(self.next_module_id)
    }

    fn next_hook_id(&mut self) -> HookId {
        self.next_hook_id += 1;
        HookId::new(self.next_hook_id)
    }

    fn next_binding_id(&mut self) -> BindingId {
        self.next_binding_id += 1;
        BindingId::new(self.next_binding_id)
    }
}

/// In-process [`ModuleStore`].
#[derive(Debug, Default)]
pub struct MemoryModuleStore {
    state: RwLock<StoreState>,
}

impl MemoryModuleStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModuleStore for MemoryModuleStore {
    async fn insert_module(&self, mut module: RegisteredModule) -> AppResult<RegisteredModule> {
        let mut state = self.state.write().await;

        if state.modules.values().any(|m| m.name == module.name) {
            return Err(AppError::conflict(format!("Module '{}' already exists", module.name)));
        }

        module.module_id = state.next_module_id();
        state.modules.insert(module.module_id, module.clone());

        debug!(module_id = %module.module_id, module = %module.name, "Module row inserted");
        Ok(module)
    }

    async fn update_module(&self, module: &RegisteredModule) -> AppResult<()> {
        let mut state = self.state.write().await;
        let slot = state
            .modules
            .get_mut(&module.module_id)
            .ok_or_else(|| AppError::not_found(format!("Module ID {} not found", module.module_id)))?;
        *slot = module.clone();
        Ok(())
    }

    async fn delete_module(&self, module_id: ModuleId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.modules.remove(&module_id).is_none() {
            return Ok(false);
        }
        let before = state.bindings.len();
        state.bindings.retain(|_, b| b.module_id != module_id);
        info!(
            module_id = %module_id,
            bindings_removed = before - state.bindings.len(),
            "Module row deleted"
        );
        Ok(true)
    }

    async fn find_module(&self, module_id: ModuleId) -> AppResult<Option<RegisteredModule>> {
        let state = self.state.read().await;
        Ok(state.modules.get(&module_id).cloned())
    }

    async fn find_module_by_name(&self, name: &str) -> AppResult<Option<RegisteredModule>> {
        let state = self.state.read().await;
        Ok(state.modules.values().find(|m| m.name == name).cloned())
    }

    async fn list_modules(&self) -> AppResult<Vec<RegisteredModule>> {
        let state = self.state.read().await;
        Ok(state.modules.values().cloned().collect())
    }

    async fn upsert_hook(&self, hook_name: &str, description: &str) -> AppResult<HookDefinition> {
        let mut state = self.state.write().await;

        if let Some(existing) = state.hooks.values().find(|h| h.hook_name == hook_name) {
            return Ok(existing.clone());
        }

        let hook = HookDefinition::new(state.next_hook_id(), hook_name, description);
        state.hooks.insert(hook.hook_id, hook.clone());
        Ok(hook)
    }

    async fn find_hook_by_name(&self, hook_name: &str) -> AppResult<Option<HookDefinition>> {
        let state = self.state.read().await;
        Ok(state.hooks.values().find(|h| h.hook_name == hook_name).cloned())
    }

    async fn list_hooks(&self) -> AppResult<Vec<HookDefinition>> {
        let state = self.state.read().await;
        Ok(state.hooks.values().cloned().collect())
    }

    async fn upsert_binding(&self, new: NewBinding) -> AppResult<(HookBinding, bool)> {
        let mut state = self.state.write().await;

        if !state.modules.contains_key(&new.module_id) {
            return Err(AppError::not_found(format!("Module ID {} not found", new.module_id)));
        }
        if !state.hooks.contains_key(&new.hook_id) {
            return Err(AppError::not_found(format!("Hook {} not found", new.hook_name)));
        }

        let now = Utc::now();

        if let Some(existing) = state
            .bindings
            .values_mut()
            .find(|b| b.module_id == new.module_id && b.hook_id == new.hook_id)
        {
            existing.is_manual_hook = new.is_manual_hook;
            existing.manual_hook_display_name = new.manual_hook_display_name;
            existing.run_asynchronously = new.run_asynchronously;
            existing.max_retry = new.max_retry;
            existing.wait_for_completion = new.wait_for_completion;
            existing.updated_at = now;
            return Ok((existing.clone(), false));
        }

        let binding = HookBinding {
            binding_id: state.next_binding_id(),
            module_id: new.module_id,
            hook_id: new.hook_id,
            hook_name: new.hook_name,
            is_manual_hook: new.is_manual_hook,
            manual_hook_display_name: new.manual_hook_display_name,
            run_asynchronously: new.run_asynchronously,
            max_retry: new.max_retry,
            wait_for_completion: new.wait_for_completion,
            created_at: now,
            updated_at: now,
        };
        state.bindings.insert(binding.binding_id, binding.clone());
        Ok((binding, true))
    }

    async fn find_binding(&self, binding_id: BindingId) -> AppResult<Option<HookBinding>> {
        let state = self.state.read().await;
        Ok(state.bindings.get(&binding_id).cloned())
    }

    async fn active_bindings_for_hook(&self, hook_id: HookId) -> AppResult<Vec<(HookBinding, RegisteredModule)>> {
        let state = self.state.read().await;
        Ok(state
            .bindings
            .values()
            .filter(|b| b.hook_id == hook_id)
            .filter_map(|b| {
                state
                    .modules
                    .get(&b.module_id)
                    .filter(|m| m.is_active)
                    .map(|m| (b.clone(), m.clone()))
            })
            .collect())
    }

    async fn bindings_for_module(&self, module_id: ModuleId) -> AppResult<Vec<HookBinding>> {
        let state = self.state.read().await;
        Ok(state
            .bindings
            .values()
            .filter(|b| b.module_id == module_id)
            .cloned()
            .collect())
    }
}
