//! Bounded invocation of a module's hook handler.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use iris_core::types::StatusResult;

use crate::error::HandlerFailure;
use crate::port::{InvocationContext, ModulePort};

/// Calls `port.hooks_handler` on its own task, bounded by `timeout`.
///
/// A panic inside the handler is caught and reported as
/// [`HandlerFailure::Panicked`]; a handler that outlives `timeout` is
/// aborted and reported as [`HandlerFailure::Timeout`]. A handler returning
/// a failure status is reported as [`HandlerFailure::Failed`].
pub async fn invoke_handler(
    port: Arc<dyn ModulePort>,
    hook_name: &str,
    data: Value,
    context: InvocationContext,
    timeout: Duration,
) -> Result<StatusResult, HandlerFailure> {
    let hook_name = hook_name.to_string();
    let handle = tokio::spawn(async move { port.hooks_handler(&hook_name, data, &context).await });
    let abort = handle.abort_handle();

    let status = match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(status)) => status,
        Ok(Err(join_err)) if join_err.is_panic() => {
            return Err(HandlerFailure::Panicked(panic_message(join_err.into_panic())));
        }
        Ok(Err(join_err)) => return Err(HandlerFailure::Panicked(join_err.to_string())),
        Err(_) => {
            abort.abort();
            return Err(HandlerFailure::Timeout(timeout));
        }
    };

    if status.is_failure() {
        return Err(HandlerFailure::Failed(status.message));
    }
    Ok(status)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
