//! Hand-off of asynchronous hook invocations to a worker pool.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use uuid::Uuid;

use iris_core::result::AppResult;
use iris_entity::{HookTask, TaskOutcome};

/// Accepts hook tasks for out-of-band execution.
///
/// Submitting only enqueues; the task runs later on a worker.
#[async_trait]
pub trait TaskSubmitter: Send + Sync + std::fmt::Debug {
    /// Enqueues a task.
    async fn submit(&self, task: HookTask) -> AppResult<TaskTicket>;
}

/// Receipt for a submitted task.
#[derive(Debug)]
pub struct TaskTicket {
    /// Submitted task.
    pub task_id: Uuid,
    outcome: oneshot::Receiver<TaskOutcome>,
}

impl TaskTicket {
    /// Creates a ticket resolved through `outcome`.
    pub fn new(task_id: Uuid, outcome: oneshot::Receiver<TaskOutcome>) -> Self {
        Self { task_id, outcome }
    }

    /// Waits for the worker's outcome.
    ///
    /// Returns `None` on timeout, or when the worker dropped the task
    /// without reporting.
    pub async fn wait(self, timeout: Duration) -> Option<TaskOutcome> {
        match tokio::time::timeout(timeout, self.outcome).await {
            Ok(Ok(outcome)) => Some(outcome),
            Ok(Err(_)) | Err(_) => None,
        }
    }
}
