//! Hook selection and payload stamping for the check module.

use serde_json::{Value, json};

use iris_core::types::{CaseId, ModuleId};
use iris_entity::hook::{is_manual_hook_name, is_preload_hook_name};
use iris_modules::{BindRequest, default_hooks};

/// Manual trigger offered on cases.
pub const CHECK_CASE_HOOK: &str = "on_manual_trigger_case";

/// Display name of the manual trigger.
pub const CHECK_CASE_DISPLAY_NAME: &str = "Check case";

/// Bind requests for every automatic lifecycle hook plus the manual case check.
///
/// Preload hooks are bound synchronously so the stamp is visible to the
/// host; postload hooks go to the worker pool.
pub fn bind_requests(module_id: ModuleId) -> Vec<BindRequest> {
    let mut requests: Vec<BindRequest> = default_hooks()
        .into_iter()
        .map(|(name, _)| name)
        .filter(|name| !is_manual_hook_name(name))
        .map(|name| {
            let request = BindRequest::new(module_id, name.as_str());
            if is_preload_hook_name(&name) {
                request.synchronous()
            } else {
                request
            }
        })
        .collect();

    requests.push(BindRequest::new(module_id, CHECK_CASE_HOOK).display_name(CHECK_CASE_DISPLAY_NAME));
    requests
}

/// Adds `{tag_key: {"hook": .., "case_id": ..}}` to an object payload.
///
/// Non-object payloads are returned unchanged.
pub fn stamp(mut data: Value, tag_key: &str, hook_name: &str, case_id: CaseId) -> Value {
    if let Some(object) = data.as_object_mut() {
        object.insert(
            tag_key.to_string(),
            json!({
                "hook": hook_name,
                "case_id": case_id,
            }),
        );
    }
    data
}
