//! Storage errors.

use thiserror::Error;

/// Errors that can occur when reading or writing the tracker database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A referenced row does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity label ("Project", "Milestone", "Risk")
        entity: &'static str,
        /// Requested id
        id: i64,
    },

    /// A value was rejected before reaching the database
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A stored row could not be decoded
    #[error("Corrupt {table} row {id}: {reason}")]
    CorruptRow {
        /// Table name
        table: &'static str,
        /// Row id
        id: i64,
        /// What failed to decode
        reason: String,
    },
}

impl StorageError {
    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        StorageError::NotFound { entity, id }
    }

    pub(crate) fn corrupt(table: &'static str, id: i64, reason: impl Into<String>) -> Self {
        StorageError::CorruptRow {
            table,
            id,
            reason: reason.into(),
        }
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
