use covault_types::TxIndex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("caller {0} is not an owner")]
    Unauthorized(String),

    #[error("transaction {0} does not exist")]
    NotFound(TxIndex),

    #[error("transaction {0} is finalized, no further votes accepted")]
    AlreadyFinalized(TxIndex),

    #[error("owner {owner} already voted on transaction {index}")]
    DuplicateVote { index: TxIndex, owner: String },

    #[error("transaction {0} already executed")]
    AlreadyExecuted(TxIndex),

    #[error("transaction {0} was rejected by quorum and can never execute")]
    TransactionRejected(TxIndex),

    #[error("transaction {index} has {approvals} approvals, needs {required}")]
    QuorumNotReached {
        index: TxIndex,
        approvals: usize,
        required: usize,
    },

    #[error("transaction {0} is still pending, only one may be in flight")]
    PendingTransactionExists(TxIndex),

    #[error("no transactions have been submitted")]
    NoTransactions,

    #[error("owner roster is empty")]
    EmptyRoster,

    #[error("duplicate owner {0} in roster")]
    DuplicateOwner(String),

    #[error("required approvals {required} out of range for {owners} owners")]
    ThresholdOutOfRange { required: usize, owners: usize },

    #[error("transaction log is corrupt: {0}")]
    CorruptLog(String),
}
