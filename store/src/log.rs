//! Transaction log storage trait.

use crate::StoreError;
use covault_types::TxIndex;

/// Trait for the ordered, append-only transaction log.
///
/// Records are serialized transaction snapshots keyed by index. `put` at an
/// existing index overwrites the record in place (vote and execution updates);
/// indices are never deleted, so the count equals `last index + 1`.
pub trait TransactionLogStore {
    /// Store a transaction record (serialized bytes keyed by index).
    fn put_transaction(&self, index: TxIndex, tx_bytes: &[u8]) -> Result<(), StoreError>;

    /// Retrieve a transaction record by index.
    fn get_transaction(&self, index: TxIndex) -> Result<Vec<u8>, StoreError>;

    /// Number of records in the log.
    fn transaction_count(&self) -> Result<u64, StoreError>;

    /// All records, in index order. Used to rehydrate the engine at startup.
    fn iter_transactions(&self) -> Result<Vec<Vec<u8>>, StoreError>;
}
