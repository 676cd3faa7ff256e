//! LMDB environment setup.

use crate::LmdbError;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use std::path::Path;

/// Default map size: 256 MiB, plenty for a serial authorization log.
pub const DEFAULT_MAP_SIZE: usize = 256 * 1024 * 1024;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Env,
    /// Transaction records, keyed by big-endian index so LMDB's key order is
    /// the log order.
    pub(crate) log_db: Database<Bytes, Bytes>,
    /// Metadata (roster, schema version), keyed by name.
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("create {}: {e}", path.display())))?;

        let env = unsafe {
            EnvOpenOptions::new()
                .max_dbs(4)
                .map_size(map_size)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let log_db = env.create_database(&mut wtxn, Some("transactions"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        Ok(Self {
            env,
            log_db,
            meta_db,
        })
    }

    pub(crate) fn env(&self) -> &Env {
        &self.env
    }
}
