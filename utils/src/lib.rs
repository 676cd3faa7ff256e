//! Shared utilities for the covault workspace.

pub mod logging;

pub use logging::init_tracing;
