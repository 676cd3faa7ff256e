//! Metadata storage trait.

use crate::StoreError;

/// Key under which backends persist the serialized owner roster.
pub const ROSTER_KEY: &str = "roster";

/// Trait for storing database metadata (roster, schema version).
///
/// A generic key-value store for internal bookkeeping that doesn't belong in
/// the transaction log.
pub trait MetaStore {
    /// Store a metadata value.
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Retrieve a metadata value, `None` if the key was never written.
    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
}
