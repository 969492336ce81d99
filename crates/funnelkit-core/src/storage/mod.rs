//! Persistence: the save callback contract, storage backends and autosave.
//!
//! The engine only ever talks to a [`PersistenceAdapter`]. Saving is
//! fire-and-forget: the adapter gets the document and the engine moves on.
//! It never learns whether the save worked and does not retry.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(not(target_arch = "wasm32"))]
mod worker;

pub use autosave::{Autosave, DEFAULT_AUTOSAVE_INTERVAL_SECS};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;
#[cfg(not(target_arch = "wasm32"))]
pub use worker::StorageWorker;

use crate::document::Document;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Key under which the most recently saved document is also stored.
pub const LAST_DOCUMENT_KEY: &str = "__last_document__";

/// Receives documents to persist.
///
/// Called on the autosave interval, on explicit save, and after every
/// recorded edit when save-on-change is configured. Consecutive calls may
/// carry identical documents. Implementations must not block.
pub trait PersistenceAdapter {
    fn on_save(&self, document: &Document);
}

impl<F: Fn(&Document)> PersistenceAdapter for F {
    fn on_save(&self, document: &Document) {
        self(document)
    }
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for document storage backends.
///
/// Note: On native platforms, implementations must be Send + Sync so they
/// can be driven from the save worker thread.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Save a document.
    fn save(&self, id: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a document.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Document>>;

    /// Delete a document.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all document IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a document exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Trait for document storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Save a document.
    fn save(&self, id: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a document.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Document>>;

    /// Delete a document.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all document IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a document exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Load the most recently saved document, if any.
pub async fn load_last<S: Storage + ?Sized>(storage: &S) -> Option<Document> {
    match storage.load(LAST_DOCUMENT_KEY).await {
        Ok(doc) => Some(doc),
        Err(StorageError::NotFound(_)) => None,
        Err(e) => {
            log::warn!("Could not restore last document: {}", e);
            None
        }
    }
}

/// List saved document ids, without the last-document alias.
pub async fn list_documents<S: Storage + ?Sized>(storage: &S) -> StorageResult<Vec<String>> {
    let mut ids = storage.list().await?;
    ids.retain(|id| id != LAST_DOCUMENT_KEY);
    ids.sort();
    Ok(ids)
}

/// Save a document under its own id and as the last document.
pub async fn save_document<S: Storage + ?Sized>(storage: &S, document: &Document) -> StorageResult<()> {
    storage.save(&document.id, document).await?;
    storage.save(LAST_DOCUMENT_KEY, document).await
}
