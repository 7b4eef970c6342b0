//! Asynchronous hook task messages.

pub mod model;
pub mod status;

pub use model::HookTask;
pub use status::{TaskOutcome, TaskStatus};
