//! Autosave scheduling.
//!
//! The schedule is polled rather than timer-driven: the host calls
//! `EditorSession::tick` from its frame or event loop and the session asks
//! [`Autosave::should_save_at`] whether a periodic save is due. The schedule
//! only runs between [`Autosave::start`] and [`Autosave::stop`], so ending a
//! session reliably ends its saves.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Periodic and on-change save schedule for one editor session.
#[derive(Debug, Clone)]
pub struct Autosave {
    /// Time between periodic saves.
    interval: Duration,
    /// Save after every recorded edit as well.
    on_change: bool,
    /// Last save (or schedule start) timestamp.
    last_save: Option<Instant>,
    /// Whether the document has unsaved changes.
    dirty: bool,
    running: bool,
}

impl Default for Autosave {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS), false)
    }
}

impl Autosave {
    /// Create a stopped schedule.
    pub fn new(interval: Duration, on_change: bool) -> Self {
        Self {
            interval,
            on_change,
            last_save: None,
            dirty: false,
            running: false,
        }
    }

    /// Start the schedule. The first periodic save is due one interval
    /// after `now`.
    pub fn start(&mut self, now: Instant) {
        self.running = true;
        self.last_save = Some(now);
    }

    /// Stop the schedule. No periodic saves are due until restarted.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Set the auto-save interval.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Get the auto-save interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn saves_on_change(&self) -> bool {
        self.on_change
    }

    pub fn set_save_on_change(&mut self, on_change: bool) {
        self.on_change = on_change;
    }

    /// Mark the document as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check if the document has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a periodic save is due at `now`: running, dirty, and a full
    /// interval since the last save.
    pub fn should_save_at(&self, now: Instant) -> bool {
        if !self.running || !self.dirty {
            return false;
        }
        match self.last_save {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    /// Record that the document was handed to the adapter at `now`.
    pub fn saved_at(&mut self, now: Instant) {
        self.last_save = Some(now);
        self.dirty = false;
    }
}
