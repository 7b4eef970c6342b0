//! Asynchronous hook execution for IRIS.
//!
//! This crate provides:
//! - A bounded in-process task queue that implements the dispatcher's
//!   `TaskSubmitter` seam
//! - A task executor that re-resolves the module and invokes its handler
//! - A worker runner that drains the queue with bounded concurrency and
//!   retries failed tasks

pub mod executor;
pub mod queue;
pub mod runner;

pub use executor::{HookTaskExecutor, TaskExecutionError};
pub use queue::{QueueMonitor, QueueStats, QueuedTask, TaskQueue, TaskReceiver};
pub use runner::WorkerRunner;
