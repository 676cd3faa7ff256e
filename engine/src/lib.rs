//! Authorization engine — multi-owner control over a shared resource.
//!
//! A fixed owner roster jointly authorizes actions: a submitted transaction
//! must collect a quorum of approvals before any owner may execute it, or a
//! quorum of rejections before it is abandoned. At most one transaction is
//! in flight at a time.
//!
//! ## Module overview
//!
//! - [`engine`] — The state machine itself: submission, voting, execution, queries.
//! - [`roster`] — Immutable owner set and confirmation threshold.
//! - [`transaction`] — Log records with per-owner vote sets and derived quorum state.
//! - [`executor`] — The external collaborator that carries out an authorized action.
//! - [`error`] — Engine error types.

pub mod engine;
pub mod error;
pub mod executor;
pub mod roster;
pub mod transaction;

pub use engine::{AuthEngine, ExecutionRecord};
pub use error::EngineError;
pub use executor::{ActionExecutor, ExecutorError, NullExecutor};
pub use roster::OwnerRoster;
pub use transaction::{AuthTransaction, Ballot};
