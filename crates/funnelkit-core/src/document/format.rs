//! Versioned JSON export/import.
//!
//! ```json
//! {
//!   "version": 1,
//!   "id": "…",
//!   "name": "Lead quiz",
//!   "steps": [
//!     { "id": "s1", "name": "Step 1", "settings": { "showHeader": true },
//!       "blocks": [ { "id": "b1", "type": "heading", "content": { "text": "Hi" }, "order": 0 } ] }
//!   ],
//!   "activeStepId": "s1"
//! }
//! ```

use super::{Document, Step, StepId};
use crate::error::ImportError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Newest format version this crate reads and the one it writes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentFileRef<'a> {
    version: u32,
    id: &'a str,
    name: &'a str,
    steps: &'a [Arc<Step>],
    active_step_id: &'a StepId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentFile {
    version: u32,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    steps: Vec<Step>,
    #[serde(default)]
    active_step_id: Option<StepId>,
}

impl Document {
    /// Serialize the document to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.file_ref())
    }

    /// Serialize the document to a JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self.file_ref())
    }

    /// Parse and validate a document. Nothing is partially applied: either
    /// every invariant holds or the import is rejected.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        let file: DocumentFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Same as [`Document::from_json`], from an already parsed value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ImportError> {
        let file: DocumentFile = serde_json::from_value(value)?;
        Self::from_file(file)
    }

    fn from_file(file: DocumentFile) -> Result<Self, ImportError> {
        if !(1..=FORMAT_VERSION).contains(&file.version) {
            return Err(ImportError::UnsupportedVersion {
                found: file.version,
                supported: FORMAT_VERSION,
            });
        }
        if file.steps.is_empty() {
            return Err(ImportError::NoSteps);
        }
        let active = file.active_step_id.ok_or(ImportError::MissingActiveStep)?;
        Document::from_steps(
            file.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            file.name.unwrap_or_else(|| "Untitled".to_string()),
            file.steps,
            active,
        )
    }

    fn file_ref(&self) -> DocumentFileRef<'_> {
        DocumentFileRef {
            version: FORMAT_VERSION,
            id: &self.id,
            name: &self.name,
            steps: &self.steps,
            active_step_id: &self.active_step_id,
        }
    }
}
