//! Worker runner: main loop that drains the hook task queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tokio::time;
use tracing;

use iris_core::config::WorkerConfig;
use iris_core::types::StatusResult;
use iris_entity::TaskOutcome;

use crate::executor::{HookTaskExecutor, TaskExecutionError};
use crate::queue::{QueueCounters, QueuedTask, TaskReceiver};

/// Main worker runner that consumes queued hook tasks and executes them
#[derive(Debug)]
pub struct WorkerRunner {
    /// Hook task executor
    executor: Arc<HookTaskExecutor>,
    /// Worker configuration
    config: WorkerConfig,
    /// Worker identifier
    worker_id: String,
}

impl WorkerRunner {
    /// Create a new worker runner
    pub fn new(executor: Arc<HookTaskExecutor>, config: WorkerConfig, worker_id: String) -> Self {
        Self {
            executor,
            config,
            worker_id,
        }
    }

    /// Start the worker runner; runs until the cancel signal is received
    /// or every producer is gone
    pub async fn run(&self, mut receiver: TaskReceiver, mut cancel: watch::Receiver<bool>) {
        let concurrency = self.config.concurrency.max(1);
        tracing::info!(
            "Worker '{}' started with concurrency={}, retry_backoff={}ms",
            self.worker_id,
            concurrency,
            self.config.retry_backoff_ms
        );

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let counters = receiver.counters();
        let backoff = Duration::from_millis(self.config.retry_backoff_ms);

        loop {
            let permit = tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        tracing::info!("Worker '{}' received shutdown signal", self.worker_id);
                        break;
                    }
                    continue;
                }
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(p) => p,
                    Err(_) => break,
                },
            };

            let queued = tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        tracing::info!("Worker '{}' received shutdown signal", self.worker_id);
                        break;
                    }
                    continue;
                }
                queued = receiver.recv() => match queued {
                    Some(q) => q,
                    None => {
                        tracing::info!("Worker '{}' task queue closed", self.worker_id);
                        break;
                    }
                },
            };

            let executor = Arc::clone(&self.executor);
            let counters = Arc::clone(&counters);

            tokio::spawn(async move {
                let _permit = permit;
                process_task(&executor, &counters, queued, backoff).await;
            });
        }

        tracing::info!(
            "Worker '{}' waiting for in-flight tasks to complete...",
            self.worker_id
        );

        let grace = Duration::from_secs(self.config.shutdown_grace_seconds);
        if time::timeout(grace, semaphore.acquire_many(concurrency as u32)).await.is_err() {
            tracing::warn!(
                "Worker '{}' grace period elapsed with tasks still running",
                self.worker_id
            );
        }

        tracing::info!("Worker '{}' shut down complete", self.worker_id);
    }
}

/// Run a task to completion, retrying transient failures, and report the outcome
async fn process_task(executor: &HookTaskExecutor, counters: &QueueCounters, queued: QueuedTask, backoff: Duration) {
    let QueuedTask { task, reply } = queued;
    let max_attempts = task.max_attempts();
    counters.task_started();

    let mut attempt = 0;
    let result = loop {
        attempt += 1;
        tracing::debug!(
            "Processing hook task: id={}, hook='{}', attempt={}/{}",
            task.task_id,
            task.hook_name,
            attempt,
            max_attempts
        );

        match executor.execute(&task).await {
            Ok(status) => {
                tracing::info!("Hook task {} completed successfully", task.task_id);
                break status;
            }
            Err(TaskExecutionError::Transient(msg)) if attempt < max_attempts => {
                tracing::warn!(
                    "Hook task {} failed (transient), retrying: {}",
                    task.task_id,
                    msg
                );
                counters.task_retried();
                time::sleep(backoff * attempt).await;
            }
            Err(e) => {
                tracing::error!(
                    "Hook task {} failed: module='{}', hook='{}', error={}",
                    task.task_id,
                    task.module_name,
                    task.hook_name,
                    e
                );
                break StatusResult::failure(e.to_string());
            }
        }
    };

    let outcome = TaskOutcome::from_result(task.task_id, attempt, result);
    counters.task_finished(outcome.status);
    // The submitter may not be waiting.
    let _ = reply.send(outcome);
}
