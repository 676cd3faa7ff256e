//! LMDB implementation of the transaction log and metadata stores.

use crate::{LmdbEnvironment, LmdbError};
use covault_store::{MetaStore, StoreError, TransactionLogStore};
use covault_types::TxIndex;
use std::sync::Arc;

/// Durable transaction log backed by LMDB.
///
/// Each `put` commits its own write transaction; the admission rule keeps
/// writes serial, so there is nothing to batch.
pub struct LmdbLogStore {
    env: Arc<LmdbEnvironment>,
}

impl LmdbLogStore {
    pub fn new(env: Arc<LmdbEnvironment>) -> Self {
        Self { env }
    }
}

fn index_key(index: TxIndex) -> [u8; 8] {
    index.to_be_bytes()
}

impl TransactionLogStore for LmdbLogStore {
    fn put_transaction(&self, index: TxIndex, tx_bytes: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.env().write_txn().map_err(LmdbError::from)?;
        self.env
            .log_db
            .put(&mut wtxn, &index_key(index), tx_bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_transaction(&self, index: TxIndex) -> Result<Vec<u8>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .env
            .log_db
            .get(&rtxn, &index_key(index))
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("transaction {index}")))?;
        Ok(bytes.to_vec())
    }

    fn transaction_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let count = self.env.log_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }

    fn iter_transactions(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let mut records = Vec::new();
        // Big-endian keys make LMDB's iteration order the log order.
        let iter = self.env.log_db.iter(&rtxn).map_err(LmdbError::from)?;
        for entry in iter {
            let (_, bytes) = entry.map_err(LmdbError::from)?;
            records.push(bytes.to_vec());
        }
        Ok(records)
    }
}

impl MetaStore for LmdbLogStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.env().write_txn().map_err(LmdbError::from)?;
        self.env
            .meta_db
            .put(&mut wtxn, key.as_bytes(), value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let value = self
            .env
            .meta_db
            .get(&rtxn, key.as_bytes())
            .map_err(LmdbError::from)?
            .map(|b| b.to_vec());
        Ok(value)
    }
}
