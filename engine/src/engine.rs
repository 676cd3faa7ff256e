//! The authorization state machine.
//!
//! A fixed roster of owners jointly controls an external resource. Any action
//! on it must accumulate `required_approvals` owner approvals before it may
//! be executed, or the same number of rejections before it is abandoned.
//! Exactly one transaction may be pending at a time: proposals are processed
//! serially, so approval sets of concurrent proposals never interleave.

use crate::error::EngineError;
use crate::executor::ActionExecutor;
use crate::roster::OwnerRoster;
use crate::transaction::{AuthTransaction, Ballot};
use covault_types::{ActionRequest, Address, TxIndex};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Audit record emitted when a transaction is executed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub index: TxIndex,
    pub caller: Address,
}

/// The authorization engine: owner roster, threshold, and the append-only
/// transaction log.
///
/// Every mutating method takes `&mut self` and either completes fully or
/// fails with no partial mutation. Callers that share the engine across
/// threads must serialize mutating calls behind a single lock.
#[derive(Debug)]
pub struct AuthEngine {
    roster: OwnerRoster,
    log: Vec<AuthTransaction>,
}

impl AuthEngine {
    /// Create an engine with an empty transaction log.
    pub fn new(roster: OwnerRoster) -> Self {
        Self {
            roster,
            log: Vec::new(),
        }
    }

    /// Rebuild an engine from a previously persisted log.
    ///
    /// The records must arrive in index order with no gaps; anything else
    /// means the backing store lost or reordered entries.
    pub fn from_log(
        roster: OwnerRoster,
        log: Vec<AuthTransaction>,
    ) -> Result<Self, EngineError> {
        for (position, tx) in log.iter().enumerate() {
            if tx.index != position as TxIndex {
                return Err(EngineError::CorruptLog(format!(
                    "record at position {position} carries index {}",
                    tx.index
                )));
            }
        }
        Ok(Self { roster, log })
    }

    /// The roster this engine was constructed with.
    pub fn roster(&self) -> &OwnerRoster {
        &self.roster
    }

    /// The full log, ordered by index.
    pub fn transactions(&self) -> &[AuthTransaction] {
        &self.log
    }

    // ── Submission & admission control ──────────────────────────────────

    /// Submit a new transaction for authorization.
    ///
    /// Only one transaction may be in flight: submission fails while the most
    /// recently submitted transaction is neither executed nor quorum-rejected.
    pub fn submit(
        &mut self,
        caller: &Address,
        action: ActionRequest,
    ) -> Result<TxIndex, EngineError> {
        self.check_owner(caller)?;

        if let Some(last) = self.log.last() {
            if !last.is_finalized(self.roster.required_approvals()) {
                return Err(EngineError::PendingTransactionExists(last.index));
            }
        }

        let index = self.log.len() as TxIndex;
        self.log.push(AuthTransaction::new(index, action));
        info!(index, submitter = %caller, "transaction submitted");
        Ok(index)
    }

    /// Index of the most recently submitted transaction.
    pub fn last_index(&self) -> Result<TxIndex, EngineError> {
        self.log
            .last()
            .map(|tx| tx.index)
            .ok_or(EngineError::NoTransactions)
    }

    /// True iff a new submission would currently be admitted.
    pub fn has_no_pending(&self) -> bool {
        match self.log.last() {
            None => true,
            Some(last) => last.is_finalized(self.roster.required_approvals()),
        }
    }

    // ── Vote casting ────────────────────────────────────────────────────

    /// Cast an approval vote.
    pub fn approve(&mut self, index: TxIndex, caller: &Address) -> Result<(), EngineError> {
        self.cast_vote(index, caller, Ballot::Approve)
    }

    /// Cast a rejection vote.
    pub fn reject(&mut self, index: TxIndex, caller: &Address) -> Result<(), EngineError> {
        self.cast_vote(index, caller, Ballot::Reject)
    }

    /// Shared vote path for both polarities. Precondition order is part of
    /// the contract: owner, existence, finalized, duplicate.
    fn cast_vote(
        &mut self,
        index: TxIndex,
        caller: &Address,
        ballot: Ballot,
    ) -> Result<(), EngineError> {
        self.check_owner(caller)?;
        let required = self.roster.required_approvals();

        let tx = self
            .log
            .get_mut(index as usize)
            .ok_or(EngineError::NotFound(index))?;

        if tx.is_finalized(required) {
            return Err(EngineError::AlreadyFinalized(index));
        }

        // One vote of either polarity per owner per transaction; a repeat
        // call of the same polarity is an error, not an idempotent no-op.
        if tx.has_voted(caller) {
            return Err(EngineError::DuplicateVote {
                index,
                owner: caller.to_string(),
            });
        }

        tx.record_vote(caller.clone(), ballot);
        info!(index, voter = %caller, ?ballot, "vote recorded");

        if ballot == Ballot::Reject && tx.is_rejected(required) {
            info!(index, "rejection quorum formed, transaction abandoned");
        }
        Ok(())
    }

    // ── Execution ───────────────────────────────────────────────────────

    /// Execute a quorum-approved transaction.
    ///
    /// Marks the transaction executed, then dispatches the action through
    /// `executor`. A dispatch failure does not roll back the executed flag:
    /// the authorization decision and the action attempt are separate
    /// concerns, and replaying the action is the caller's call to make
    /// outside the engine.
    pub fn execute(
        &mut self,
        index: TxIndex,
        caller: &Address,
        executor: &dyn ActionExecutor,
    ) -> Result<ExecutionRecord, EngineError> {
        self.check_owner(caller)?;
        let required = self.roster.required_approvals();

        let tx = self
            .log
            .get_mut(index as usize)
            .ok_or(EngineError::NotFound(index))?;

        if tx.executed {
            return Err(EngineError::AlreadyExecuted(index));
        }
        // A rejection quorum wins over any approvals collected before it.
        if tx.is_rejected(required) {
            return Err(EngineError::TransactionRejected(index));
        }
        if !tx.is_approved(required) {
            return Err(EngineError::QuorumNotReached {
                index,
                approvals: tx.approvals.len(),
                required,
            });
        }

        tx.executed = true;
        let action = tx.action.clone();

        if let Err(e) = executor.dispatch(&action) {
            warn!(index, error = %e, "action dispatch failed, transaction stays executed");
        }

        let record = ExecutionRecord {
            index,
            caller: caller.clone(),
        };
        info!(index, executor = %caller, "transaction executed");
        Ok(record)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Snapshot of a transaction by index.
    pub fn transaction(&self, index: TxIndex) -> Result<&AuthTransaction, EngineError> {
        self.log
            .get(index as usize)
            .ok_or(EngineError::NotFound(index))
    }

    /// Whether the approval quorum has formed for a transaction.
    pub fn is_approved(&self, index: TxIndex) -> Result<bool, EngineError> {
        Ok(self
            .transaction(index)?
            .is_approved(self.roster.required_approvals()))
    }

    /// Whether the rejection quorum has formed for a transaction.
    pub fn is_rejected(&self, index: TxIndex) -> Result<bool, EngineError> {
        Ok(self
            .transaction(index)?
            .is_rejected(self.roster.required_approvals()))
    }

    fn check_owner(&self, caller: &Address) -> Result<(), EngineError> {
        if self.roster.is_owner(caller) {
            Ok(())
        } else {
            Err(EngineError::Unauthorized(caller.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::NullExecutor;

    fn addr(name: &str) -> Address {
        Address::new(format!("0x{name}"))
    }

    fn action() -> ActionRequest {
        ActionRequest::new(addr("target"), 42, vec![0xab])
    }

    /// Three owners, two approvals required.
    fn engine() -> AuthEngine {
        let roster =
            OwnerRoster::new(vec![addr("o1"), addr("o2"), addr("o3")], 2).unwrap();
        AuthEngine::new(roster)
    }

    #[test]
    fn submit_assigns_index_zero_first() {
        let mut e = engine();
        let index = e.submit(&addr("o1"), action()).unwrap();
        assert_eq!(index, 0);
        assert_eq!(e.last_index().unwrap(), 0);
        assert!(!e.has_no_pending());
    }

    #[test]
    fn submit_by_non_owner_fails() {
        let mut e = engine();
        let err = e.submit(&addr("mallory"), action()).unwrap_err();
        assert_eq!(err, EngineError::Unauthorized("0xmallory".into()));
        assert!(e.transactions().is_empty());
    }

    #[test]
    fn second_submit_blocked_while_pending() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        let err = e.submit(&addr("o2"), action()).unwrap_err();
        assert_eq!(err, EngineError::PendingTransactionExists(0));
    }

    #[test]
    fn last_index_on_empty_log_fails() {
        let e = engine();
        assert_eq!(e.last_index().unwrap_err(), EngineError::NoTransactions);
        assert!(e.has_no_pending());
    }

    #[test]
    fn approve_collects_votes_without_eager_finalization() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        e.approve(0, &addr("o1")).unwrap();

        assert!(!e.is_approved(0).unwrap());
        e.approve(0, &addr("o2")).unwrap();
        assert!(e.is_approved(0).unwrap());
        assert!(!e.is_rejected(0).unwrap());
        // Approval quorum alone does not finalize; execution does.
        assert!(!e.has_no_pending());
    }

    #[test]
    fn vote_by_non_owner_fails() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        let err = e.approve(0, &addr("mallory")).unwrap_err();
        assert_eq!(err, EngineError::Unauthorized("0xmallory".into()));
    }

    #[test]
    fn vote_on_missing_index_fails() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        assert_eq!(e.approve(1, &addr("o1")).unwrap_err(), EngineError::NotFound(1));
        assert_eq!(e.reject(9, &addr("o1")).unwrap_err(), EngineError::NotFound(9));
    }

    #[test]
    fn repeat_approval_is_an_error_not_idempotent() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        e.approve(0, &addr("o1")).unwrap();

        let err = e.approve(0, &addr("o1")).unwrap_err();
        assert_eq!(
            err,
            EngineError::DuplicateVote {
                index: 0,
                owner: "0xo1".into()
            }
        );
        assert_eq!(e.transaction(0).unwrap().approvals.len(), 1);
    }

    #[test]
    fn opposite_polarity_after_voting_fails() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        e.approve(0, &addr("o1")).unwrap();

        let err = e.reject(0, &addr("o1")).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateVote { index: 0, .. }));
        assert!(e.transaction(0).unwrap().rejections.is_empty());

        // Same check starting from a rejection.
        e.reject(0, &addr("o2")).unwrap();
        let err = e.approve(0, &addr("o2")).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateVote { index: 0, .. }));
    }

    #[test]
    fn votes_rejected_after_rejection_quorum() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        e.reject(0, &addr("o1")).unwrap();
        e.reject(0, &addr("o2")).unwrap();

        let err = e.approve(0, &addr("o3")).unwrap_err();
        assert_eq!(err, EngineError::AlreadyFinalized(0));
        let err = e.reject(0, &addr("o3")).unwrap_err();
        assert_eq!(err, EngineError::AlreadyFinalized(0));
    }

    #[test]
    fn votes_rejected_after_execution() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        e.approve(0, &addr("o1")).unwrap();
        e.approve(0, &addr("o2")).unwrap();
        e.execute(0, &addr("o1"), &NullExecutor).unwrap();

        let err = e.approve(0, &addr("o3")).unwrap_err();
        assert_eq!(err, EngineError::AlreadyFinalized(0));
    }

    #[test]
    fn execute_happy_path() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        e.approve(0, &addr("o1")).unwrap();
        e.approve(0, &addr("o2")).unwrap();

        let record = e.execute(0, &addr("o1"), &NullExecutor).unwrap();
        assert_eq!(record, ExecutionRecord { index: 0, caller: addr("o1") });
        assert!(e.transaction(0).unwrap().executed);
        assert!(e.has_no_pending());
    }

    #[test]
    fn execute_twice_fails() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        e.approve(0, &addr("o1")).unwrap();
        e.approve(0, &addr("o2")).unwrap();
        e.execute(0, &addr("o1"), &NullExecutor).unwrap();

        let err = e.execute(0, &addr("o2"), &NullExecutor).unwrap_err();
        assert_eq!(err, EngineError::AlreadyExecuted(0));
    }

    #[test]
    fn execute_without_quorum_fails() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        e.approve(0, &addr("o1")).unwrap();

        let err = e.execute(0, &addr("o1"), &NullExecutor).unwrap_err();
        assert_eq!(
            err,
            EngineError::QuorumNotReached {
                index: 0,
                approvals: 1,
                required: 2
            }
        );
        assert!(!e.transaction(0).unwrap().executed);
    }

    #[test]
    fn rejection_quorum_blocks_execution_despite_approvals() {
        // With threshold 2 of 4, both quorums can form; rejection wins.
        let roster = OwnerRoster::new(
            vec![addr("o1"), addr("o2"), addr("o3"), addr("o4")],
            2,
        )
        .unwrap();
        let mut e = AuthEngine::new(roster);
        e.submit(&addr("o1"), action()).unwrap();
        e.approve(0, &addr("o1")).unwrap();
        e.approve(0, &addr("o2")).unwrap();
        e.reject(0, &addr("o3")).unwrap();
        e.reject(0, &addr("o4")).unwrap();

        assert!(e.is_approved(0).unwrap());
        assert!(e.is_rejected(0).unwrap());
        let err = e.execute(0, &addr("o1"), &NullExecutor).unwrap_err();
        assert_eq!(err, EngineError::TransactionRejected(0));
    }

    #[test]
    fn execute_by_non_owner_leaves_state_untouched() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        e.approve(0, &addr("o1")).unwrap();
        e.approve(0, &addr("o2")).unwrap();
        let before = e.transaction(0).unwrap().clone();

        let err = e.execute(0, &addr("mallory"), &NullExecutor).unwrap_err();
        assert_eq!(err, EngineError::Unauthorized("0xmallory".into()));
        assert_eq!(e.transaction(0).unwrap(), &before);
    }

    #[test]
    fn execute_on_missing_index_fails() {
        let mut e = engine();
        let err = e.execute(3, &addr("o1"), &NullExecutor).unwrap_err();
        assert_eq!(err, EngineError::NotFound(3));
    }

    #[test]
    fn executor_failure_keeps_transaction_executed() {
        struct FailingExecutor;
        impl ActionExecutor for FailingExecutor {
            fn dispatch(
                &self,
                _action: &ActionRequest,
            ) -> Result<(), crate::executor::ExecutorError> {
                Err(crate::executor::ExecutorError::Dispatch("downstream".into()))
            }
        }

        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        e.approve(0, &addr("o1")).unwrap();
        e.approve(0, &addr("o2")).unwrap();

        let record = e.execute(0, &addr("o1"), &FailingExecutor).unwrap();
        assert_eq!(record.index, 0);
        assert!(e.transaction(0).unwrap().executed);
    }

    #[test]
    fn submit_admitted_after_execution() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        e.approve(0, &addr("o1")).unwrap();
        e.approve(0, &addr("o2")).unwrap();
        e.execute(0, &addr("o1"), &NullExecutor).unwrap();

        let index = e.submit(&addr("o2"), action()).unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn submit_admitted_after_rejection_quorum() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        e.reject(0, &addr("o1")).unwrap();
        e.reject(0, &addr("o2")).unwrap();

        assert!(e.has_no_pending());
        let index = e.submit(&addr("o3"), action()).unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn query_on_missing_index_fails() {
        let e = engine();
        assert_eq!(e.transaction(0).unwrap_err(), EngineError::NotFound(0));
        assert_eq!(e.is_approved(0).unwrap_err(), EngineError::NotFound(0));
        assert_eq!(e.is_rejected(0).unwrap_err(), EngineError::NotFound(0));
    }

    #[test]
    fn from_log_accepts_contiguous_records() {
        let mut e = engine();
        e.submit(&addr("o1"), action()).unwrap();
        e.approve(0, &addr("o1")).unwrap();
        e.approve(0, &addr("o2")).unwrap();
        e.execute(0, &addr("o1"), &NullExecutor).unwrap();
        e.submit(&addr("o1"), action()).unwrap();

        let log = e.transactions().to_vec();
        let roster = e.roster().clone();
        let rebuilt = AuthEngine::from_log(roster, log).unwrap();
        assert_eq!(rebuilt.last_index().unwrap(), 1);
        assert!(rebuilt.transaction(0).unwrap().executed);
    }

    #[test]
    fn from_log_rejects_gaps() {
        let roster =
            OwnerRoster::new(vec![addr("o1"), addr("o2"), addr("o3")], 2).unwrap();
        let log = vec![AuthTransaction::new(1, action())];
        let err = AuthEngine::from_log(roster, log).unwrap_err();
        assert!(matches!(err, EngineError::CorruptLog(_)));
    }
}
