//! Hook catalog and binding records.

pub mod context;
pub mod model;

pub use context::CaseContext;
pub use model::{
    HookBinding, HookDefinition, MANUAL_HOOK_MARKER, PRELOAD_HOOK_MARKER, is_manual_hook_name,
    is_preload_hook_name,
};
