//! Snapshot-based undo/redo.
//!
//! The history keeps full snapshots rather than inverse operations: `past`
//! holds older states (oldest first), `future` holds undone states (most
//! recently undone last). Recording a state equal to the present is ignored,
//! so no-op edits never create undo entries.

use std::collections::VecDeque;

/// Default number of undo states to keep.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Undo/redo history over snapshots of `T`.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    present: T,
    future: Vec<T>,
    /// Maximum number of entries in `past`.
    limit: usize,
    /// Open batch depth. While > 0, edits collapse into one undo entry.
    batch_depth: usize,
    /// Whether the open batch has already pushed its undo entry.
    batch_recorded: bool,
    /// Redo states cleared by the open batch, restored if it nets out to nothing.
    batch_future: Vec<T>,
}

impl<T: Clone + PartialEq> History<T> {
    /// Create a history with the default limit.
    pub fn new(present: T) -> Self {
        Self::with_limit(present, DEFAULT_HISTORY_LIMIT)
    }

    /// Create a history keeping at most `limit` undo states.
    pub fn with_limit(present: T, limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: Vec::new(),
            limit,
            batch_depth: 0,
            batch_recorded: false,
            batch_future: Vec::new(),
        }
    }

    /// The current state.
    pub fn present(&self) -> &T {
        &self.present
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the limit, dropping the oldest states if needed.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.trim();
    }

    /// Record a transition to `next`.
    ///
    /// Returns false (and leaves both stacks untouched) if `next` equals the
    /// present state.
    pub fn record(&mut self, next: T) -> bool {
        if next == self.present {
            return false;
        }

        let previous = std::mem::replace(&mut self.present, next);
        if self.batch_depth == 0 {
            self.past.push_back(previous);
            self.trim();
            // A new edit invalidates anything that could be redone
            self.future.clear();
        } else if !self.batch_recorded {
            self.past.push_back(previous);
            self.batch_recorded = true;
            self.batch_future = std::mem::take(&mut self.future);
            self.trim();
        }
        true
    }

    /// Replace the present without creating an undo entry.
    pub fn replace_present(&mut self, present: T) {
        self.present = present;
    }

    /// Step back one state. Returns the new present, or None if there is
    /// nothing to undo.
    pub fn undo(&mut self) -> Option<&T> {
        self.close_batch();
        let previous = self.past.pop_back()?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        Some(&self.present)
    }

    /// Step forward one undone state. Returns the new present, or None if
    /// there is nothing to redo.
    pub fn redo(&mut self) -> Option<&T> {
        self.close_batch();
        let next = self.future.pop()?;
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        self.trim();
        Some(&self.present)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    /// Start grouping edits: everything recorded until the matching
    /// [`History::end_batch`] undoes as a single step. Batches nest.
    pub fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.batch_recorded = false;
        }
        self.batch_depth += 1;
    }

    /// Close the innermost batch. When the outermost batch closes with the
    /// state back where it started, its undo entry is dropped and the redo
    /// stack it cleared comes back.
    pub fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        if self.batch_recorded && self.past.back() == Some(&self.present) {
            self.past.pop_back();
            self.future = std::mem::take(&mut self.batch_future);
        }
        self.close_batch();
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Drop all undo and redo states, keeping the present.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.close_batch();
    }

    /// Start over from `present` with empty stacks.
    pub fn reset(&mut self, present: T) {
        self.present = present;
        self.clear();
    }

    fn close_batch(&mut self) {
        self.batch_depth = 0;
        self.batch_recorded = false;
        self.batch_future.clear();
    }

    fn trim(&mut self) {
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
    }
}
