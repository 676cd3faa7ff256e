//! LMDB storage backend for the covault authorization engine.
//!
//! Implements the storage traits from `covault-store` using the `heed` LMDB
//! bindings. The transaction log and the metadata table are two databases
//! within a single environment.

pub mod environment;
pub mod error;
pub mod log;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use log::LmdbLogStore;
