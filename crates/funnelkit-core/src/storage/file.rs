//! File-based storage implementation for native platforms.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::Document;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Stores documents as JSON files in a directory.
///
/// Files use the export format, so loading runs full import validation and
/// a hand-edited file that breaks an invariant fails to load.
pub struct FileStorage {
    /// Base directory for document storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&base_path).map_err(|e| io_error("create", &base_path, e))?;
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/funnelkit/documents/`
    /// On Windows: `%LOCALAPPDATA%\funnelkit\documents\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("funnelkit").join("documents"))
    }

    /// Get the file path for a document ID.
    fn document_path(&self, id: &str) -> PathBuf {
        // Keep ids filename-safe
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(id);
        let json = document.to_json();

        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            fs::write(&path, json).map_err(|e| io_error("write", &path, e))
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Document>> {
        let path = self.document_path(id);
        let id = id.to_string();

        Box::pin(async move {
            let json = match fs::read_to_string(&path) {
                Ok(json) => json,
                Err(e) if e.kind() == ErrorKind::NotFound => return Err(StorageError::NotFound(id)),
                Err(e) => return Err(io_error("read", &path, e)),
            };
            Document::from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to load {}: {}", path.display(), e))
            })
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(id);

        Box::pin(async move {
            match fs::remove_file(&path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(io_error("delete", &path, e)),
                _ => Ok(()),
            }
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            let entries = match fs::read_dir(&base) {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(io_error("list", &base, e)),
            };

            let ids = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|e| e == "json"))
                .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
                .collect();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.document_path(id);
        Box::pin(async move { Ok(path.is_file()) })
    }
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> StorageError {
    StorageError::Io(format!("Failed to {} {}: {}", action, path.display(), e))
}
