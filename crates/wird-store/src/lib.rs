//! Persistence layer for wird
//!
//! Provides:
//! - A synchronous key-value substrate holding JSON values (`Store`)
//! - A SQLite implementation (`SqliteStore`)
//! - Typed access to the persisted collections (`RecordStore`)
//! - Normalization of records written by older releases

mod keys;
mod migrate;
mod records;
mod sqlite;
mod traits;

pub use keys::*;
pub use migrate::*;
pub use records::*;
pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<StoreError> for wird_util::WirdError {
    fn from(e: StoreError) -> Self {
        wird_util::WirdError::store(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
