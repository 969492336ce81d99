//! In-memory storage.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::Document;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Keeps documents in memory as export-format JSON.
///
/// Entries are serialized on save and re-imported on load, so a loaded
/// document never shares step snapshots with the session that saved it and
/// goes through the same validation as a file on disk. Ids list in sorted
/// order.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including the last-document alias.
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The stored JSON for `id`, as a file backend would have written it.
    pub fn raw(&self, id: &str) -> Option<String> {
        self.entries.read().ok()?.get(id).cloned()
    }

    fn read<R>(&self, f: impl FnOnce(&BTreeMap<String, String>) -> R) -> StorageResult<R> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(f(&entries))
    }

    fn write<R>(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> R) -> StorageResult<R> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        Ok(f(&mut entries))
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let json = document.to_json();
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            self.write(|entries| {
                entries.insert(id, json);
            })
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Document>> {
        let id = id.to_string();
        Box::pin(async move {
            let json = self
                .read(|entries| entries.get(&id).cloned())?
                .ok_or_else(|| StorageError::NotFound(id.clone()))?;
            Document::from_json(&json)
                .map_err(|e| StorageError::Serialization(format!("Entry {}: {}", id, e)))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.write(|entries| {
                entries.remove(&id);
            })
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move { self.read(|entries| entries.keys().cloned().collect()) })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { self.read(|entries| entries.contains_key(&id)) })
    }
}

fn poisoned<G>(e: PoisonError<G>) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}
