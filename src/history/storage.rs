//! Key-value string storage for persisted history

use crate::error::StorageError;
use crate::events::{EventBus, StorageEvent};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Client-side key-value store holding JSON-encoded values
pub trait HistoryStorage: Send + Sync {
    /// Read the raw value for a key, `None` if never written
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value for a key
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One JSON file per key inside a directory
pub struct FileStorage {
    dir: PathBuf,
    events: Option<EventBus<StorageEvent>>,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            events: None,
        }
    }

    /// Publish a [`StorageEvent`] after every write
    pub fn with_events(mut self, events: EventBus<StorageEvent>) -> Self {
        self.events = Some(events);
        self
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl HistoryStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;

        // Write-then-rename so a crash never leaves a half-written list
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;

        if let Some(ref events) = self.events {
            events.publish(StorageEvent::Changed {
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

/// Process-local storage, used by tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    events: Option<EventBus<StorageEvent>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, events: EventBus<StorageEvent>) -> Self {
        self.events = Some(events);
        self
    }
}

impl HistoryStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());

        if let Some(ref events) = self.events {
            events.publish(StorageEvent::Changed {
                key: key.to_string(),
            });
        }
        Ok(())
    }
}
