//! Nullable infrastructure for testing and ephemeral runs.
//!
//! In-memory stand-ins for the durable pieces of the system: a thread-safe
//! transaction log store and executors that record or fail on demand.

pub mod executor;
pub mod store;

pub use executor::{FailingExecutor, RecordingExecutor};
pub use store::NullStore;
