//! IRIS check module.
//!
//! A processor module that binds to every case lifecycle hook, logs what it
//! receives, and stamps object payloads with the hook and case it saw. It
//! also offers a manual "Check case" trigger. Mainly used to verify that
//! hook dispatch works end to end on a deployment.

pub mod hooks;
pub mod module;

pub use module::{IrisCheckModule, MODULE_NAME};
