//! # iris-core
//!
//! Core crate for the IRIS module engine. Contains configuration schemas,
//! typed identifiers, the module status result type, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other IRIS crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
pub use types::status::StatusResult;
