//! Hook task status and outcome.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use iris_core::types::StatusResult;

/// Lifecycle state of a hook task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting in the queue.
    Pending,
    /// Being processed by a worker.
    Running,
    /// The module handler reported success.
    Succeeded,
    /// Every attempt failed.
    Failed,
}

impl TaskStatus {
    /// Check if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the worker reports once it is done with a task.
///
/// Failures are encoded here; the worker never propagates an error to its
/// scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// Task this outcome belongs to.
    pub task_id: Uuid,
    /// Terminal status.
    pub status: TaskStatus,
    /// Attempts made.
    pub attempts: u32,
    /// Last status returned by the module, or the failure description.
    pub result: StatusResult,
    /// When the worker finished.
    pub finished_at: DateTime<Utc>,
}

impl TaskOutcome {
    /// Builds an outcome from the final module status.
    pub fn from_result(task_id: Uuid, attempts: u32, result: StatusResult) -> Self {
        let status = if result.is_success() {
            TaskStatus::Succeeded
        } else {
            TaskStatus::Failed
        };
        Self {
            task_id,
            status,
            attempts,
            result,
            finished_at: Utc::now(),
        }
    }
}
