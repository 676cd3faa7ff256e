//! Transaction records and their derived quorum state.

use crate::error::EngineError;
use covault_types::{ActionRequest, Address, TxIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The polarity of a vote cast on a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ballot {
    Approve,
    Reject,
}

/// A single entry in the append-only authorization log.
///
/// Stores only what the engine mutates: the opaque action, the executed flag,
/// and the two disjoint vote sets. Quorum outcomes (`is_approved`,
/// `is_rejected`, `is_finalized`) are derived on read against the roster's
/// threshold — never stored, so they can never drift out of sync with the
/// vote sets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTransaction {
    /// Position in the log; the address every operation uses.
    pub index: TxIndex,
    /// What the transaction authorizes, uninterpreted.
    pub action: ActionRequest,
    /// True once the action has been carried out. Terminal, never reset.
    pub executed: bool,
    /// Owners who voted to approve.
    pub approvals: HashSet<Address>,
    /// Owners who voted to reject. Always disjoint from `approvals`.
    pub rejections: HashSet<Address>,
}

impl AuthTransaction {
    /// Create a fresh transaction with empty vote sets.
    pub fn new(index: TxIndex, action: ActionRequest) -> Self {
        Self {
            index,
            action,
            executed: false,
            approvals: HashSet::new(),
            rejections: HashSet::new(),
        }
    }

    /// Whether the given owner has already voted, in either direction.
    pub fn has_voted(&self, owner: &Address) -> bool {
        self.approvals.contains(owner) || self.rejections.contains(owner)
    }

    /// Record a vote. The caller is responsible for the owner and
    /// duplicate-vote checks; this only mutates the matching set.
    pub fn record_vote(&mut self, owner: Address, ballot: Ballot) {
        match ballot {
            Ballot::Approve => self.approvals.insert(owner),
            Ballot::Reject => self.rejections.insert(owner),
        };
    }

    /// Whether the approval quorum has formed.
    pub fn is_approved(&self, required_approvals: usize) -> bool {
        self.approvals.len() >= required_approvals
    }

    /// Whether the rejection quorum has formed.
    pub fn is_rejected(&self, required_approvals: usize) -> bool {
        self.rejections.len() >= required_approvals
    }

    /// A transaction is finalized once it is executed or quorum-rejected.
    /// Finalized transactions accept no further votes.
    pub fn is_finalized(&self, required_approvals: usize) -> bool {
        self.executed || self.is_rejected(required_approvals)
    }

    /// Serialize for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EngineError> {
        bincode::serialize(self).map_err(|e| EngineError::CorruptLog(e.to_string()))
    }

    /// Deserialize a stored record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        bincode::deserialize(bytes).map_err(|e| EngineError::CorruptLog(e.to_string()))
    }
}
