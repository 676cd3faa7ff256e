//! JSON-over-HTTP server for the covault authorization engine.
//!
//! Provides endpoints for:
//! - Transaction submission
//! - Approval and rejection votes
//! - Execution of quorum-approved transactions
//! - Transaction, quorum, and admission queries
//!
//! The server owns the engine behind a single write lock, giving the
//! linearizable single-writer discipline the engine requires, and persists
//! every touched transaction record through the configured store.

pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::RpcError;
pub use server::RpcServer;
pub use state::{VaultState, VaultStore};
