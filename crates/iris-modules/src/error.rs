//! Error types for registration, binding, and handler invocation.

use std::time::Duration;

use iris_core::error::{AppError, ErrorKind};
use iris_core::types::ModuleId;

use crate::compat::ValidationReport;

/// Why a module could not be registered.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// No module name was given.
    #[error("Provided module has no name")]
    NoName,

    /// The loader does not know the module, or could not build it.
    #[error("Module '{0}' could not be instantiated")]
    InstantiationFailed(String),

    /// A module with the same name is already registered.
    #[error("Module '{0}' already exists")]
    AlreadyRegistered(String),

    /// The module failed compatibility validation.
    #[error("Module '{name}' is not compatible: {report}")]
    Incompatible {
        /// Module name.
        name: String,
        /// Every issue found.
        report: ValidationReport,
    },

    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl RegistrationError {
    /// Human-readable lines for the administrative caller.
    pub fn logs(&self) -> Vec<String> {
        match self {
            Self::Incompatible { report, .. } => {
                let mut logs = report.logs();
                logs.push(self.to_string());
                logs
            }
            Self::Store(err) if !err.logs.is_empty() => err.logs.clone(),
            other => vec![other.to_string()],
        }
    }

    fn kind(&self) -> ErrorKind {
        match self {
            Self::NoName | Self::Incompatible { .. } => ErrorKind::Validation,
            Self::InstantiationFailed(_) => ErrorKind::Module,
            Self::AlreadyRegistered(_) => ErrorKind::Conflict,
            Self::Store(err) => err.kind,
        }
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        let logs = err.logs();
        AppError::new(err.kind(), err.to_string()).with_logs(logs)
    }
}

/// Why a hook binding could not be created.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// The module does not exist.
    #[error("Module ID {0} not found")]
    ModuleNotFound(ModuleId),

    /// The hook is not in the catalog.
    #[error("Hook {0} is unknown")]
    HookNotFound(String),

    /// A manual display name was given for a hook that is not a manual trigger.
    #[error("Hook {0} is not a manual trigger hook; a manual display name cannot be set")]
    ManualNamingMismatch(String),

    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl BindError {
    /// Human-readable lines for the administrative caller.
    pub fn logs(&self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl From<BindError> for AppError {
    fn from(err: BindError) -> Self {
        let kind = match &err {
            BindError::ModuleNotFound(_) | BindError::HookNotFound(_) => ErrorKind::NotFound,
            BindError::ManualNamingMismatch(_) => ErrorKind::Validation,
            BindError::Store(inner) => inner.kind,
        };
        let logs = err.logs();
        AppError::new(kind, err.to_string()).with_logs(logs)
    }
}

/// Why one handler invocation left the payload untouched.
///
/// Contained at the binding boundary; never propagated to the firing caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerFailure {
    /// The module could not be instantiated.
    #[error("module could not be instantiated")]
    Unavailable,

    /// The handler reported a failure status.
    #[error("handler reported failure: {0}")]
    Failed(String),

    /// The handler did not return in time.
    #[error("handler timed out after {0:?}")]
    Timeout(Duration),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}
