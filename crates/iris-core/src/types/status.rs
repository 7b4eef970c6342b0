//! Status result returned by module handlers and module operations.
//!
//! Core code branches on [`StatusResult::is_success`] /
//! [`StatusResult::is_failure`] rather than on errors for expected outcomes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Success/failure discriminant of a [`StatusResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The operation succeeded.
    Success,
    /// The operation failed.
    Failure,
}

/// Outcome of a module operation: discriminant, message, optional data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResult {
    /// Success or failure.
    pub status: Status,
    /// Human-readable message.
    pub message: String,
    /// Optional data payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Log lines the module produced while handling the call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
}

impl StatusResult {
    /// A successful result carrying `data`.
    pub fn success(data: Value) -> Self {
        Self {
            status: Status::Success,
            message: String::new(),
            data: Some(data),
            logs: Vec::new(),
        }
    }

    /// A successful result with a message and no data.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: None,
            logs: Vec::new(),
        }
    }

    /// A failed result.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: Status::Failure,
            message: message.into(),
            data: None,
            logs: Vec::new(),
        }
    }

    /// Replace the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach log lines.
    pub fn with_logs(mut self, logs: Vec<String>) -> Self {
        self.logs = logs;
        self
    }

    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Whether the operation failed.
    pub fn is_failure(&self) -> bool {
        self.status == Status::Failure
    }

    /// Borrow the data payload.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Take the data payload.
    pub fn into_data(self) -> Option<Value> {
        self.data
    }
}
