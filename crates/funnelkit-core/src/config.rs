//! Editor configuration.

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::reorder::DEFAULT_ACTIVATION_DISTANCE;
use crate::storage::DEFAULT_AUTOSAVE_INTERVAL_SECS;
use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use web_time::Duration;

/// Tunables for an editor session. Every field has a default, so a partial
/// JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo states kept.
    pub history_limit: usize,
    /// Pointer travel in pixels before a press becomes a drag.
    pub activation_distance: f64,
    /// Seconds between periodic saves.
    pub autosave_interval_secs: u64,
    /// Also save after every recorded edit.
    pub autosave_on_change: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            activation_distance: DEFAULT_ACTIVATION_DISTANCE,
            autosave_interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
            autosave_on_change: false,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }
}
