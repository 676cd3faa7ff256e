//! The external collaborator that carries out an authorized action.

use covault_types::ActionRequest;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("action dispatch failed: {0}")]
    Dispatch(String),
}

/// Carries out the value transfer (or whatever else) a confirmed transaction
/// authorizes.
///
/// Invoked exactly once per transaction, after the engine has marked it
/// executed. A failure here is the executor's problem: the authorization
/// decision stands and the transaction stays executed, so the engine's
/// invariants never depend on downstream outcomes.
pub trait ActionExecutor {
    fn dispatch(&self, action: &ActionRequest) -> Result<(), ExecutorError>;
}

/// An executor that does nothing and always succeeds.
///
/// The default for deployments where execution is handled entirely out of
/// band, and a convenient stand-in for tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullExecutor;

impl ActionExecutor for NullExecutor {
    fn dispatch(&self, _action: &ActionRequest) -> Result<(), ExecutorError> {
        Ok(())
    }
}
