//! Shared server state: the engine behind its write lock, plus the
//! persistence glue that keeps the store in step with every mutation.

use crate::error::RpcError;
use covault_engine::{ActionExecutor, AuthEngine, AuthTransaction, ExecutionRecord, OwnerRoster};
use covault_store::meta::ROSTER_KEY;
use covault_store::{MetaStore, StoreError, TransactionLogStore};
use covault_types::{ActionRequest, Address, TxIndex};
use tokio::sync::RwLock;
use tracing::info;

/// What the server needs from a storage backend.
pub trait VaultStore: TransactionLogStore + MetaStore + Send + Sync {}

impl<T: TransactionLogStore + MetaStore + Send + Sync> VaultStore for T {}

/// The engine, its durable store, and the action executor, shared across
/// request handlers.
///
/// All mutating operations take the engine's write lock, so they serialize
/// exactly as the engine's single-writer model requires; queries take the
/// read lock. The lock is never held across an external await.
pub struct VaultState {
    engine: RwLock<AuthEngine>,
    store: Box<dyn VaultStore>,
    executor: Box<dyn ActionExecutor + Send + Sync>,
}

impl std::fmt::Debug for VaultState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultState")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl VaultState {
    /// Open the vault against a store, rehydrating any persisted state.
    ///
    /// The stored roster is authoritative. On first boot the configured
    /// roster is persisted; on later boots a configured roster that differs
    /// from the stored one is refused, since the roster never changes after
    /// construction.
    pub fn open(
        configured_roster: Option<OwnerRoster>,
        store: Box<dyn VaultStore>,
        executor: Box<dyn ActionExecutor + Send + Sync>,
    ) -> Result<Self, RpcError> {
        let roster = match store.get_meta(ROSTER_KEY)? {
            Some(bytes) => {
                let stored: OwnerRoster = bincode::deserialize(&bytes)
                    .map_err(|e| RpcError::Store(StoreError::Corruption(e.to_string())))?;
                if let Some(configured) = configured_roster {
                    if configured != stored {
                        return Err(RpcError::InvalidRequest(
                            "configured roster conflicts with the stored roster".into(),
                        ));
                    }
                }
                stored
            }
            None => {
                let roster = configured_roster.ok_or_else(|| {
                    RpcError::InvalidRequest("no roster configured and none stored".into())
                })?;
                let bytes = bincode::serialize(&roster)
                    .map_err(|e| RpcError::Store(StoreError::Serialization(e.to_string())))?;
                store.put_meta(ROSTER_KEY, &bytes)?;
                roster
            }
        };

        let mut log = Vec::new();
        for bytes in store.iter_transactions()? {
            log.push(AuthTransaction::from_bytes(&bytes)?);
        }
        let replayed = log.len();
        let engine = AuthEngine::from_log(roster, log)?;
        info!(
            transactions = replayed,
            owners = engine.roster().owner_count(),
            required = engine.roster().required_approvals(),
            "vault opened"
        );

        Ok(Self {
            engine: RwLock::new(engine),
            store,
            executor,
        })
    }

    // ── Mutations ───────────────────────────────────────────────────────

    pub async fn submit(
        &self,
        caller: &Address,
        action: ActionRequest,
    ) -> Result<TxIndex, RpcError> {
        let mut engine = self.engine.write().await;
        let index = engine.submit(caller, action)?;
        self.persist(&engine, index)?;
        Ok(index)
    }

    pub async fn approve(&self, index: TxIndex, caller: &Address) -> Result<(), RpcError> {
        let mut engine = self.engine.write().await;
        engine.approve(index, caller)?;
        self.persist(&engine, index)
    }

    pub async fn reject(&self, index: TxIndex, caller: &Address) -> Result<(), RpcError> {
        let mut engine = self.engine.write().await;
        engine.reject(index, caller)?;
        self.persist(&engine, index)
    }

    pub async fn execute(
        &self,
        index: TxIndex,
        caller: &Address,
    ) -> Result<ExecutionRecord, RpcError> {
        let mut engine = self.engine.write().await;
        let record = engine.execute(index, caller, self.executor.as_ref())?;
        self.persist(&engine, index)?;
        Ok(record)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Snapshot of a transaction plus its derived quorum state.
    pub async fn transaction(
        &self,
        index: TxIndex,
    ) -> Result<(AuthTransaction, bool, bool), RpcError> {
        let engine = self.engine.read().await;
        let tx = engine.transaction(index)?.clone();
        let required = engine.roster().required_approvals();
        let approved = tx.is_approved(required);
        let rejected = tx.is_rejected(required);
        Ok((tx, approved, rejected))
    }

    pub async fn last_index(&self) -> Result<TxIndex, RpcError> {
        Ok(self.engine.read().await.last_index()?)
    }

    pub async fn has_no_pending(&self) -> bool {
        self.engine.read().await.has_no_pending()
    }

    /// Write the touched record through to the store.
    ///
    /// The in-memory engine has already advanced when this runs; a store
    /// failure is surfaced to the caller and leaves disk one record behind
    /// until the next successful write to the same index.
    fn persist(&self, engine: &AuthEngine, index: TxIndex) -> Result<(), RpcError> {
        let tx = engine.transaction(index)?;
        self.store.put_transaction(index, &tx.to_bytes()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covault_engine::EngineError;
    use covault_nullables::{FailingExecutor, NullStore, RecordingExecutor};
    use std::sync::Arc;

    fn addr(name: &str) -> Address {
        Address::new(format!("0x{name}"))
    }

    fn roster() -> OwnerRoster {
        OwnerRoster::new(vec![addr("o1"), addr("o2"), addr("o3")], 2).unwrap()
    }

    fn action() -> ActionRequest {
        ActionRequest::new(addr("target"), 9, vec![0x01])
    }

    /// A NullStore that can be shared between two VaultState instances to
    /// simulate a restart against the same backing storage.
    struct SharedStore(Arc<NullStore>);

    impl TransactionLogStore for SharedStore {
        fn put_transaction(&self, index: TxIndex, b: &[u8]) -> Result<(), StoreError> {
            self.0.put_transaction(index, b)
        }
        fn get_transaction(&self, index: TxIndex) -> Result<Vec<u8>, StoreError> {
            self.0.get_transaction(index)
        }
        fn transaction_count(&self) -> Result<u64, StoreError> {
            self.0.transaction_count()
        }
        fn iter_transactions(&self) -> Result<Vec<Vec<u8>>, StoreError> {
            self.0.iter_transactions()
        }
    }

    impl MetaStore for SharedStore {
        fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
            self.0.put_meta(key, value)
        }
        fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.0.get_meta(key)
        }
    }

    #[tokio::test]
    async fn lifecycle_with_write_through() {
        let state = VaultState::open(
            Some(roster()),
            Box::new(NullStore::new()),
            Box::new(RecordingExecutor::new()),
        )
        .unwrap();

        let index = state.submit(&addr("o1"), action()).await.unwrap();
        assert_eq!(index, 0);
        state.approve(0, &addr("o1")).await.unwrap();
        state.approve(0, &addr("o2")).await.unwrap();

        let record = state.execute(0, &addr("o3")).await.unwrap();
        assert_eq!(record.caller, addr("o3"));

        let (tx, approved, rejected) = state.transaction(0).await.unwrap();
        assert!(tx.executed);
        assert!(approved);
        assert!(!rejected);
        assert!(state.has_no_pending().await);
    }

    #[tokio::test]
    async fn restart_rehydrates_from_store() {
        let backing = Arc::new(NullStore::new());

        {
            let state = VaultState::open(
                Some(roster()),
                Box::new(SharedStore(backing.clone())),
                Box::new(RecordingExecutor::new()),
            )
            .unwrap();
            state.submit(&addr("o1"), action()).await.unwrap();
            state.approve(0, &addr("o2")).await.unwrap();
        }

        // No configured roster: the stored one carries over.
        let state = VaultState::open(
            None,
            Box::new(SharedStore(backing)),
            Box::new(RecordingExecutor::new()),
        )
        .unwrap();

        assert_eq!(state.last_index().await.unwrap(), 0);
        let (tx, approved, _) = state.transaction(0).await.unwrap();
        assert_eq!(tx.approvals.len(), 1);
        assert!(!approved);
        assert!(!state.has_no_pending().await);
    }

    #[tokio::test]
    async fn conflicting_roster_refused_on_reopen() {
        let backing = Arc::new(NullStore::new());
        VaultState::open(
            Some(roster()),
            Box::new(SharedStore(backing.clone())),
            Box::new(RecordingExecutor::new()),
        )
        .unwrap();

        let other = OwnerRoster::new(vec![addr("x1"), addr("x2")], 1).unwrap();
        let err = VaultState::open(
            Some(other),
            Box::new(SharedStore(backing)),
            Box::new(RecordingExecutor::new()),
        )
        .unwrap_err();
        assert!(matches!(err, RpcError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn empty_store_without_roster_refused() {
        let err = VaultState::open(
            None,
            Box::new(NullStore::new()),
            Box::new(RecordingExecutor::new()),
        )
        .unwrap_err();
        assert!(matches!(err, RpcError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn executor_failure_still_persists_executed_flag() {
        let state = VaultState::open(
            Some(roster()),
            Box::new(NullStore::new()),
            Box::new(FailingExecutor),
        )
        .unwrap();

        state.submit(&addr("o1"), action()).await.unwrap();
        state.approve(0, &addr("o1")).await.unwrap();
        state.approve(0, &addr("o2")).await.unwrap();
        state.execute(0, &addr("o1")).await.unwrap();

        let (tx, _, _) = state.transaction(0).await.unwrap();
        assert!(tx.executed);
    }

    #[tokio::test]
    async fn engine_failures_pass_through() {
        let state = VaultState::open(
            Some(roster()),
            Box::new(NullStore::new()),
            Box::new(RecordingExecutor::new()),
        )
        .unwrap();

        let err = state.approve(0, &addr("o1")).await.unwrap_err();
        assert!(matches!(
            err,
            RpcError::Engine(EngineError::NotFound(0))
        ));
    }
}
