//! Store trait definitions

use crate::StoreResult;

/// One write of an atomic batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWrite {
    Put { key: String, value: String },
    Remove { key: String },
}

impl StoreWrite {
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        StoreWrite::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        StoreWrite::Remove { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            StoreWrite::Put { key, .. } | StoreWrite::Remove { key } => key,
        }
    }
}

/// Key-value substrate.
///
/// Values are JSON documents stored as text. Every call is synchronous and
/// either completes or fails before returning.
pub trait Store: Send + Sync {
    /// Read the raw JSON stored under `key`
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    fn put(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key` if present
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Apply all `writes` or none of them
    fn apply(&self, writes: &[StoreWrite]) -> StoreResult<()>;

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
