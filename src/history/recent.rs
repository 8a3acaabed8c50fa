//! Bounded most-recent-first list of search queries

use super::storage::HistoryStorage;
use crate::error::StorageError;
use std::sync::Arc;
use tracing::{debug, warn};

/// Recent searches for one domain key.
///
/// Entries are unique ignoring case, newest first, and never more than
/// `max_entries` long. Every mutation is persisted before returning;
/// persistence failures are logged and the in-memory list stays authoritative.
pub struct RecentHistory {
    key: String,
    max_entries: usize,
    entries: Vec<String>,
    storage: Arc<dyn HistoryStorage>,
}

impl RecentHistory {
    /// Load the list stored under `key`. Unreadable or corrupt data yields an
    /// empty list.
    pub fn load(storage: Arc<dyn HistoryStorage>, key: impl Into<String>, max_entries: usize) -> Self {
        let mut history = Self {
            key: key.into(),
            max_entries,
            entries: Vec::new(),
            storage,
        };
        history.reload();
        history
    }

    /// Re-read the persisted list, replacing the in-memory copy
    pub fn reload(&mut self) {
        self.entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Discarding recent searches for {}: {}", self.key, e);
                Vec::new()
            }
        };
    }

    fn read_entries(&self) -> Result<Vec<String>, StorageError> {
        let Some(raw) = self.storage.read(&self.key)? else {
            return Ok(Vec::new());
        };
        let stored: Vec<String> =
            serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                key: self.key.clone(),
                source,
            })?;

        // Lists written by older or foreign clients may break the invariants
        let mut entries: Vec<String> = Vec::with_capacity(self.max_entries);
        for entry in stored {
            let entry = entry.trim();
            if entry.is_empty() || entries.iter().any(|e| eq_ignore_case(e, entry)) {
                continue;
            }
            entries.push(entry.to_string());
            if entries.len() == self.max_entries {
                break;
            }
        }
        Ok(entries)
    }

    /// Remember a query as the most recent search
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        self.entries.retain(|e| !eq_ignore_case(e, query));
        self.entries.insert(0, query.to_string());
        self.entries.truncate(self.max_entries);

        debug!("Recorded recent search '{}' under {}", query, self.key);
        self.persist();
    }

    /// Delete an entry; the match is exact and case-sensitive
    pub fn remove(&mut self, query: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e != query);
        let removed = self.entries.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    /// Entries, newest first
    pub fn list(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.write(&self.key, &json));

        if let Err(e) = result {
            warn!("Failed to persist recent searches for {}: {}", self.key, e);
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
