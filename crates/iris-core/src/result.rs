//! Convenience result type alias for IRIS.

use crate::error::AppError;

/// A specialized `Result` type for IRIS operations.
pub type AppResult<T> = Result<T, AppError>;
