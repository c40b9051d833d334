use thiserror::Error;

use crate::model::Collection;

pub type StoreResult<T> = Result<T, StoreError>;

/// Typed store failure, classified once at the API boundary. Anything
/// the controller does not recognize travels in `Other` and surfaces as
/// a generic server error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("conflicting revision on document: {0}")]
    VersionConflict(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found(collection: Collection, key: &str) -> Self {
        StoreError::NotFound(collection.qualified_id(key))
    }

    pub fn conflict(collection: Collection, key: &str) -> Self {
        StoreError::Conflict(collection.qualified_id(key))
    }

    pub fn version_conflict(collection: Collection, key: &str) -> Self {
        StoreError::VersionConflict(collection.qualified_id(key))
    }
}
