//! Context a hook is fired in.

use serde::{Deserialize, Serialize};

use iris_core::types::CaseId;

/// The case and user a hook firing belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseContext {
    /// Case the event happened on.
    pub case_id: CaseId,
    /// User whose action fired the hook, if any.
    pub initiating_user: Option<String>,
}

impl CaseContext {
    /// Context for a case with no initiating user.
    pub fn new(case_id: CaseId) -> Self {
        Self {
            case_id,
            initiating_user: None,
        }
    }

    /// Sets the initiating user.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.initiating_user = Some(user.into());
        self
    }
}
