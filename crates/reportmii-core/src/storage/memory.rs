//! In-process answer persistence for tests and embedding.

use std::collections::HashMap;
use std::sync::Mutex;

use super::AnswerPersistence;
use crate::answers::AnswerStore;
use crate::error::StorageError;

/// Keeps serialized answer stores in memory.
///
/// Stores go through JSON like the SQLite backend, so round-trip behaviour
/// is the same.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::Io(std::io::Error::other("memory store lock poisoned"))
}

impl AnswerPersistence for MemoryStore {
    fn load(&self, owner: &str, analysis_id: &str) -> Result<Option<AnswerStore>, StorageError> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        entries
            .get(&(owner.to_string(), analysis_id.to_string()))
            .map(|json| AnswerStore::from_json(json))
            .transpose()
            .map_err(StorageError::from)
    }

    fn save(&self, owner: &str, analysis_id: &str, store: &AnswerStore) -> Result<(), StorageError> {
        let json = store.to_json()?;
        self.entries
            .lock()
            .map_err(|_| poisoned())?
            .insert((owner.to_string(), analysis_id.to_string()), json);
        Ok(())
    }
}
