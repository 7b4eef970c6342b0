//! Asynchronous hook worker configuration.

use serde::{Deserialize, Serialize};

/// Worker pool configuration for asynchronously dispatched hooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker pool is started.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of hook tasks processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Capacity of the task queue; further submissions are refused until a worker takes one.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Base delay between retries of a failed task, multiplied by the attempt number.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
    /// Time allowed for in-flight tasks to finish on shutdown.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            concurrency: default_concurrency(),
            queue_capacity: default_queue_capacity(),
            retry_backoff_ms: default_retry_backoff(),
            shutdown_grace_seconds: default_shutdown_grace(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_retry_backoff() -> u64 {
    500
}

fn default_shutdown_grace() -> u64 {
    30
}
