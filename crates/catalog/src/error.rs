//! Error types for catalog operations.

use std::path::PathBuf;

use database::DatabaseError;
use preferences::StorageError;
use thiserror::Error;

/// Errors that can occur in catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Record store error.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Preference storage could not be opened.
    #[error("preference storage error: {0}")]
    Storage(#[from] StorageError),

    /// The id is not in the loaded collection.
    #[error("no character with id {0}")]
    UnknownCharacter(i64),

    /// Import payload is not a JSON array.
    #[error("malformed import: {0}")]
    MalformedImport(String),

    /// An element failed part-way through an import. Earlier elements stay
    /// imported.
    #[error("import stopped after {imported} record(s): {source}")]
    ImportAborted {
        imported: usize,
        #[source]
        source: Box<CatalogError>,
    },

    /// An import element does not describe a character.
    #[error("invalid import element: {0}")]
    InvalidElement(#[from] serde_json::Error),

    /// Writing the export file failed.
    #[error("failed to write export file {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
