//! Persistent storage for saved query shortcuts
//!
//! Layout under the data directory (see `config::data_dir`):
//!
//! <data dir>/
//! └── savedQueries.json      # ordered array of {id, label, query}
//!
//! The file is read once when the store is opened and rewritten on every
//! mutation. A missing file is an empty list.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Namespace key for the shortcuts list
pub const SAVED_QUERIES_KEY: &str = "savedQueries";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode saved queries: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A user-named reusable query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedQuery {
    /// Creation timestamp in milliseconds, bumped to stay unique
    pub id: i64,
    pub label: String,
    pub query: String,
}

/// Durable, session-independent list of saved queries
#[derive(Debug)]
pub struct ShortcutStore {
    path: PathBuf,
    items: Vec<SavedQuery>,
}

impl ShortcutStore {
    /// Open the store rooted at `dir`, loading any saved list.
    ///
    /// An unreadable or corrupt file is moved aside and the store starts
    /// empty; the session must stay usable.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(format!("{}.json", SAVED_QUERIES_KEY));

        let items = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<SavedQuery>>(&content) {
                Ok(items) => items,
                Err(e) => {
                    let backup = path.with_extension("json.corrupt");
                    tracing::warn!(
                        "Saved queries at {} are unreadable ({}); moving to {}",
                        path.display(),
                        e,
                        backup.display()
                    );
                    if let Err(e) = std::fs::rename(&path, &backup) {
                        tracing::warn!("Failed to move corrupt saved queries aside: {}", e);
                    }
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        tracing::debug!("Loaded {} saved queries from {}", items.len(), path.display());
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All saved queries in creation order
    pub fn list(&self) -> &[SavedQuery] {
        &self.items
    }

    pub fn get(&self, id: i64) -> Option<&SavedQuery> {
        self.items.iter().find(|q| q.id == id)
    }

    /// Append a new saved query. Duplicates by query text are allowed.
    pub fn save(&mut self, query: &str, label: &str) -> Result<SavedQuery, StorageError> {
        let saved = SavedQuery {
            id: self.next_id(),
            label: label.to_string(),
            query: query.to_string(),
        };
        self.items.push(saved.clone());
        if let Err(e) = self.persist() {
            self.items.pop();
            return Err(e);
        }
        tracing::info!("Saved query {} as '{}'", saved.id, saved.label);
        Ok(saved)
    }

    /// Remove the query with this id. Returns the removed entry, if any.
    pub fn delete(&mut self, id: i64) -> Result<Option<SavedQuery>, StorageError> {
        let Some(pos) = self.items.iter().position(|q| q.id == id) else {
            return Ok(None);
        };
        let removed = self.items.remove(pos);
        if let Err(e) = self.persist() {
            self.items.insert(pos, removed);
            return Err(e);
        }
        tracing::info!("Deleted saved query {}", id);
        Ok(Some(removed))
    }

    fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let last = self.items.iter().map(|q| q.id).max().unwrap_or(i64::MIN);
        now.max(last.saturating_add(1))
    }

    /// Write via temp file + rename so a crash never leaves half a list
    fn persist(&self) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(&self.items)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
