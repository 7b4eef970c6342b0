//! Hook definition and binding models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use iris_core::types::{BindingId, HookId, ModuleId};

/// Hook names containing this marker are triggered by a user action.
pub const MANUAL_HOOK_MARKER: &str = "on_manual_trigger_";

/// Hook names containing this marker are always dispatched synchronously.
pub const PRELOAD_HOOK_MARKER: &str = "on_preload_";

/// A well-known lifecycle event the host application may fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookDefinition {
    /// Catalog identifier.
    pub hook_id: HookId,
    /// Unique hook name, e.g. `on_postload_ioc_create`.
    pub hook_name: String,
    /// Short description.
    pub hook_description: String,
}

impl HookDefinition {
    /// Creates a hook definition.
    pub fn new(hook_id: HookId, hook_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            hook_id,
            hook_name: hook_name.into(),
            hook_description: description.into(),
        }
    }

    /// Whether the hook is triggered manually by a user.
    pub fn is_manual(&self) -> bool {
        is_manual_hook_name(&self.hook_name)
    }

    /// Whether the hook runs before the primary action.
    pub fn is_preload(&self) -> bool {
        is_preload_hook_name(&self.hook_name)
    }
}

/// Whether `hook_name` follows the manual-trigger naming convention.
pub fn is_manual_hook_name(hook_name: &str) -> bool {
    hook_name.contains(MANUAL_HOOK_MARKER)
}

/// Whether `hook_name` follows the preload naming convention.
pub fn is_preload_hook_name(hook_name: &str) -> bool {
    hook_name.contains(PRELOAD_HOOK_MARKER)
}

/// Association of one registered module to one hook, with dispatch policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookBinding {
    /// Binding identifier; creation order.
    pub binding_id: BindingId,
    /// Owning module.
    pub module_id: ModuleId,
    /// Target hook.
    pub hook_id: HookId,
    /// Target hook name, copied at bind time.
    pub hook_name: String,
    /// Whether the target hook is a manual trigger.
    pub is_manual_hook: bool,
    /// Name shown to users for a manual trigger.
    pub manual_hook_display_name: Option<String>,
    /// Queue the invocation to the worker pool instead of calling inline.
    pub run_asynchronously: bool,
    /// Extra attempts the worker makes after a failed asynchronous invocation.
    pub max_retry: u32,
    /// Await the worker's outcome before continuing the dispatch chain.
    pub wait_for_completion: bool,
    /// When the binding was created.
    pub created_at: DateTime<Utc>,
    /// When the binding policy last changed.
    pub updated_at: DateTime<Utc>,
}

impl HookBinding {
    /// Whether this binding is dispatched to the worker pool for `hook_name`.
    ///
    /// Preload hooks are always run inline regardless of the binding policy.
    pub fn dispatches_asynchronously(&self) -> bool {
        self.run_asynchronously && !is_preload_hook_name(&self.hook_name)
    }
}
