//! Hook catalog, bindings, and dispatch.

pub mod binding;
pub mod catalog;
pub mod dispatcher;
pub mod task;
