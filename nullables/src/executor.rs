//! Instrumented action executors for testing.

use covault_engine::{ActionExecutor, ExecutorError};
use covault_types::ActionRequest;
use std::sync::Mutex;

/// Records every dispatched action for later inspection.
#[derive(Default)]
pub struct RecordingExecutor {
    dispatched: Mutex<Vec<ActionRequest>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything dispatched so far, in order.
    pub fn dispatched(&self) -> Vec<ActionRequest> {
        self.dispatched.lock().unwrap().clone()
    }
}

impl ActionExecutor for RecordingExecutor {
    fn dispatch(&self, action: &ActionRequest) -> Result<(), ExecutorError> {
        self.dispatched.lock().unwrap().push(action.clone());
        Ok(())
    }
}

/// Fails every dispatch, for exercising the executed-despite-failure path.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingExecutor;

impl ActionExecutor for FailingExecutor {
    fn dispatch(&self, _action: &ActionRequest) -> Result<(), ExecutorError> {
        Err(ExecutorError::Dispatch("nullable failure".into()))
    }
}
