//! Bounded in-process queue of hook tasks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing;

use iris_core::error::AppError;
use iris_core::result::AppResult;
use iris_entity::{HookTask, TaskOutcome, TaskStatus};
use iris_modules::{TaskSubmitter, TaskTicket};

/// A task waiting for a worker, with the channel its outcome is reported on
#[derive(Debug)]
pub struct QueuedTask {
    /// The task
    pub task: HookTask,
    /// Outcome channel; the submitter may have stopped listening
    pub reply: oneshot::Sender<TaskOutcome>,
}

/// Counters shared by the producer and consumer halves
#[derive(Debug, Default)]
pub(crate) struct QueueCounters {
    submitted: AtomicU64,
    started: AtomicU64,
    running: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
}

impl QueueCounters {
    pub(crate) fn task_started(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
        self.running.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn task_retried(&self) {
        self.retried.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn task_finished(&self, status: TaskStatus) {
        self.running.fetch_sub(1, Ordering::Relaxed);
        match status {
            TaskStatus::Succeeded => self.succeeded.fetch_add(1, Ordering::Relaxed),
            _ => self.failed.fetch_add(1, Ordering::Relaxed),
        };
    }

    fn snapshot(&self) -> QueueStats {
        let submitted = self.submitted.load(Ordering::Relaxed);
        let started = self.started.load(Ordering::Relaxed);
        QueueStats {
            pending: submitted.saturating_sub(started),
            running: self.running.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            retried: self.retried.load(Ordering::Relaxed),
        }
    }
}

/// Producer half of the hook task queue
#[derive(Debug, Clone)]
pub struct TaskQueue {
    sender: mpsc::Sender<QueuedTask>,
    counters: Arc<QueueCounters>,
}

/// Consumer half of the hook task queue, owned by the worker runner
#[derive(Debug)]
pub struct TaskReceiver {
    receiver: mpsc::Receiver<QueuedTask>,
    counters: Arc<QueueCounters>,
}

impl TaskQueue {
    /// Create a queue holding at most `capacity` waiting tasks
    pub fn bounded(capacity: usize) -> (Self, TaskReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let counters = Arc::new(QueueCounters::default());
        (
            Self {
                sender,
                counters: counters.clone(),
            },
            TaskReceiver { receiver, counters },
        )
    }

    /// Get queue statistics
    pub fn stats(&self) -> QueueStats {
        self.counters.snapshot()
    }

    /// Statistics handle that does not keep the queue open
    pub fn monitor(&self) -> QueueMonitor {
        QueueMonitor {
            counters: self.counters.clone(),
        }
    }
}

/// Read-only view of queue statistics
#[derive(Debug, Clone)]
pub struct QueueMonitor {
    counters: Arc<QueueCounters>,
}

impl QueueMonitor {
    /// Get queue statistics
    pub fn stats(&self) -> QueueStats {
        self.counters.snapshot()
    }
}

#[async_trait]
impl TaskSubmitter for TaskQueue {
    /// Enqueue a task without waiting; a full queue refuses it
    async fn submit(&self, task: HookTask) -> AppResult<TaskTicket> {
        let (reply, outcome) = oneshot::channel();
        let task_id = task.task_id;
        let module_name = task.module_name.clone();
        let hook_name = task.hook_name.clone();

        self.sender.try_send(QueuedTask { task, reply }).map_err(|e| match e {
            TrySendError::Full(_) => {
                tracing::warn!(
                    "Hook task queue is full, refusing task: module='{}', hook='{}'",
                    module_name,
                    hook_name
                );
                AppError::queue("Hook task queue is full")
            }
            TrySendError::Closed(_) => AppError::queue("Hook task queue is closed"),
        })?;
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            "Enqueued hook task: id={}, module='{}', hook='{}'",
            task_id,
            module_name,
            hook_name
        );

        Ok(TaskTicket::new(task_id, outcome))
    }
}

impl TaskReceiver {
    /// Receive the next task; `None` once every producer is gone and the queue is drained
    pub async fn recv(&mut self) -> Option<QueuedTask> {
        self.receiver.recv().await
    }

    pub(crate) fn counters(&self) -> Arc<QueueCounters> {
        self.counters.clone()
    }
}

/// Queue statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Tasks waiting for a worker
    pub pending: u64,
    /// Tasks being processed
    pub running: u64,
    /// Tasks whose handler succeeded
    pub succeeded: u64,
    /// Tasks that failed every attempt
    pub failed: u64,
    /// Retry attempts made
    pub retried: u64,
}
