//! Catalog of hooks the host application may fire.

use std::sync::Arc;

use tracing::{debug, info};

use iris_core::result::AppResult;
use iris_entity::HookDefinition;

use crate::store::ModuleStore;

/// Case lifecycle actions that carry their own hooks.
const CASE_ACTIONS: [&str; 3] = ["create", "delete", "info_update"];

/// Case objects that each have create, update, and delete hooks.
const OBJECT_SUBJECTS: [&str; 7] = ["asset", "note", "ioc", "event", "evidence", "task", "global_task"];

/// Objects a user can run a manual trigger on.
const MANUAL_SUBJECTS: [&str; 8] = ["case", "asset", "note", "ioc", "event", "evidence", "task", "global_task"];

/// Builds the default hook list: `(hook_name, description)` pairs.
pub fn default_hooks() -> Vec<(String, String)> {
    let mut events: Vec<(String, String)> = Vec::new();

    for action in CASE_ACTIONS {
        events.push((format!("case_{action}"), format!("case {}", action.replace('_', " "))));
    }
    for subject in OBJECT_SUBJECTS {
        let label = subject.replace('_', " ");
        for action in ["create", "update", "delete"] {
            events.push((format!("{subject}_{action}"), format!("{label} {action}")));
        }
    }
    events.push(("report_create".into(), "report generation".into()));
    events.push(("activities_report_create".into(), "activities report generation".into()));

    let mut hooks = Vec::with_capacity(events.len() * 2 + MANUAL_SUBJECTS.len());
    for (event, label) in &events {
        hooks.push((format!("on_preload_{event}"), format!("Triggered before {label}")));
        hooks.push((format!("on_postload_{event}"), format!("Triggered after {label}")));
    }
    for subject in MANUAL_SUBJECTS {
        hooks.push((
            format!("on_manual_trigger_{subject}"),
            format!("Triggered by a user on a {}", subject.replace('_', " ")),
        ));
    }
    hooks
}

/// Hook catalog backed by the module store.
#[derive(Debug, Clone)]
pub struct HookCatalog {
    store: Arc<dyn ModuleStore>,
}

impl HookCatalog {
    /// Creates a catalog over `store`.
    pub fn new(store: Arc<dyn ModuleStore>) -> Self {
        Self { store }
    }

    /// Inserts the default hooks that are not present yet.
    ///
    /// Returns how many hooks were added.
    pub async fn seed_defaults(&self) -> AppResult<usize> {
        let before = self.store.list_hooks().await?.len();
        for (name, description) in default_hooks() {
            self.store.upsert_hook(&name, &description).await?;
        }
        let added = self.store.list_hooks().await?.len() - before;

        info!(added, "Default hooks seeded");
        Ok(added)
    }

    /// Adds a hook, returning the existing definition if the name is known.
    pub async fn add(&self, hook_name: &str, description: &str) -> AppResult<HookDefinition> {
        let hook = self.store.upsert_hook(hook_name, description).await?;
        debug!(hook = %hook.hook_name, hook_id = %hook.hook_id, "Hook added to catalog");
        Ok(hook)
    }

    /// Looks a hook up by name.
    pub async fn resolve(&self, hook_name: &str) -> AppResult<Option<HookDefinition>> {
        self.store.find_hook_by_name(hook_name).await
    }

    /// Every hook in the catalog.
    pub async fn list(&self) -> AppResult<Vec<HookDefinition>> {
        self.store.list_hooks().await
    }
}
