//! Nullable store — thread-safe in-memory storage for testing.

use covault_store::{MetaStore, StoreError, TransactionLogStore};
use covault_types::TxIndex;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory transaction log + metadata store.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullStore {
    log: Mutex<BTreeMap<TxIndex, Vec<u8>>>,
    meta: Mutex<HashMap<String, Vec<u8>>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            log: Mutex::new(BTreeMap::new()),
            meta: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionLogStore for NullStore {
    fn put_transaction(&self, index: TxIndex, tx_bytes: &[u8]) -> Result<(), StoreError> {
        self.log.lock().unwrap().insert(index, tx_bytes.to_vec());
        Ok(())
    }

    fn get_transaction(&self, index: TxIndex) -> Result<Vec<u8>, StoreError> {
        self.log
            .lock()
            .unwrap()
            .get(&index)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("transaction {index}")))
    }

    fn transaction_count(&self) -> Result<u64, StoreError> {
        Ok(self.log.lock().unwrap().len() as u64)
    }

    fn iter_transactions(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        // BTreeMap keeps index order for us.
        Ok(self.log.lock().unwrap().values().cloned().collect())
    }
}

impl MetaStore for NullStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.meta
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.meta.lock().unwrap().get(key).cloned())
    }
}
