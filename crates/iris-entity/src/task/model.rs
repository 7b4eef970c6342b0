//! Hook task message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use iris_core::types::CaseId;

use crate::hook::CaseContext;

/// One queued invocation of a module's hook handler.
///
/// The payload travels as JSON bytes so that producer and worker only share
/// the wire format, not in-memory types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookTask {
    /// Unique task identifier.
    pub task_id: Uuid,
    /// Name of the module to instantiate.
    pub module_name: String,
    /// Hook that was fired.
    pub hook_name: String,
    /// JSON-encoded hook payload.
    pub payload: Vec<u8>,
    /// Case the hook was fired on.
    pub case_id: CaseId,
    /// User whose action fired the hook.
    pub initiating_user: Option<String>,
    /// Extra attempts allowed after a failure.
    pub max_retry: u32,
    /// When the task was created.
    pub enqueued_at: DateTime<Utc>,
}

impl HookTask {
    /// Builds a task, encoding `payload` to JSON.
    pub fn new(
        module_name: impl Into<String>,
        hook_name: impl Into<String>,
        payload: &Value,
        context: &CaseContext,
        max_retry: u32,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            task_id: Uuid::new_v4(),
            module_name: module_name.into(),
            hook_name: hook_name.into(),
            payload: serde_json::to_vec(payload)?,
            case_id: context.case_id,
            initiating_user: context.initiating_user.clone(),
            max_retry,
            enqueued_at: Utc::now(),
        })
    }

    /// Decodes the JSON payload.
    pub fn decode_payload(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }

    /// Rebuilds the firing context.
    pub fn context(&self) -> CaseContext {
        CaseContext {
            case_id: self.case_id,
            initiating_user: self.initiating_user.clone(),
        }
    }

    /// Total attempts the worker may make.
    pub fn max_attempts(&self) -> u32 {
        self.max_retry.saturating_add(1)
    }
}
