//! Fundamental types for the covault authorization engine.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: addresses, action requests, and the transaction index.

pub mod action;
pub mod address;

pub use action::ActionRequest;
pub use address::Address;

/// Index of a transaction in the append-only authorization log.
///
/// Assigned at submission, starting at 0, increasing by exactly 1. The index
/// is the addressing scheme used by every operation, so it is never reused
/// and the log is never compacted or reordered.
pub type TxIndex = u64;
