//! Typed errors for BFF services

use thiserror::Error;

use crate::storage::StorageError;

/// Errors from running or deleting a saved shortcut by id
#[derive(Debug, Error)]
pub enum ShortcutError {
    #[error("No saved shortcut with id {0}")]
    NotFound(i64),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
