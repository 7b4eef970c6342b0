//! Core type definitions used across the IRIS workspace.

pub mod id;
pub mod status;
pub mod version;

pub use id::*;
pub use status::StatusResult;
pub use version::{InterfaceRange, InterfaceVersion};
