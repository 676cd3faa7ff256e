//! Abstract storage traits for the covault authorization engine.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the workspace depends only on the traits. Backends
//! store opaque bytes; serialization is the caller's concern.

pub mod error;
pub mod log;
pub mod meta;

pub use error::StoreError;
pub use log::TransactionLogStore;
pub use meta::MetaStore;
