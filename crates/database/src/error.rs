//! Database error types.

use std::path::PathBuf;

use halodex_core::ValidationError;
use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The database could not be opened at all.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] sqlx::Error),

    /// Operation attempted before `initialize()` completed.
    #[error("database not initialized")]
    NotInitialized,

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A mutation failed to reach storage (I/O error, disk full, ...).
    #[error("write failed: {0}")]
    WriteFailed(#[source] sqlx::Error),

    /// Record rejected before persistence.
    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),

    /// Stored row that no longer decodes into a record.
    #[error("corrupt {entity} record {id}: {reason}")]
    Corrupt {
        entity: &'static str,
        id: i64,
        reason: String,
    },

    /// SQLx error (query, decode, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Removing the database files during a reset failed.
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
