//! Selection state layered over a document.
//!
//! Selection is transient UI state and never persisted. It tracks the active
//! step, the selected block and the block being edited inline. Every id it
//! holds must resolve against the current document; [`Selection::reconcile`]
//! restores that after any document transition.

use crate::document::{BlockId, Document, StepId};

/// Which step is active and which of its blocks is selected or being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    active_step_id: StepId,
    selected_block_id: Option<BlockId>,
    /// Block in inline-edit mode. Always also the selected block.
    editing_block_id: Option<BlockId>,
}

impl Selection {
    /// Selection pointing at the document's active step, nothing selected.
    pub fn new(doc: &Document) -> Self {
        Self {
            active_step_id: doc.active_step_id().clone(),
            selected_block_id: None,
            editing_block_id: None,
        }
    }

    pub fn active_step_id(&self) -> &StepId {
        &self.active_step_id
    }

    pub fn selected_block_id(&self) -> Option<&BlockId> {
        self.selected_block_id.as_ref()
    }

    pub fn editing_block_id(&self) -> Option<&BlockId> {
        self.editing_block_id.as_ref()
    }

    pub fn is_selected(&self, id: &BlockId) -> bool {
        self.selected_block_id.as_ref() == Some(id)
    }

    pub fn is_editing(&self) -> bool {
        self.editing_block_id.is_some()
    }

    /// Make `id` the active step. Switching steps drops the block selection.
    /// Returns false if the step does not exist.
    pub fn select_step(&mut self, doc: &Document, id: &StepId) -> bool {
        if doc.step(id).is_none() {
            return false;
        }
        if &self.active_step_id != id {
            self.active_step_id = id.clone();
            self.clear();
        }
        true
    }

    /// Select a block of the active step. Selecting another block leaves
    /// inline editing. Returns false if the block is not in the active step.
    pub fn select_block(&mut self, doc: &Document, id: &BlockId) -> bool {
        let exists = doc
            .step(&self.active_step_id)
            .is_some_and(|step| step.contains_block(id));
        if !exists {
            return false;
        }
        if self.editing_block_id.as_ref().is_some_and(|editing| editing != id) {
            self.editing_block_id = None;
        }
        self.selected_block_id = Some(id.clone());
        true
    }

    /// Deselect the block and leave inline editing.
    pub fn clear(&mut self) {
        self.selected_block_id = None;
        self.editing_block_id = None;
    }

    /// Select `id` and enter inline editing for it.
    pub fn begin_edit(&mut self, doc: &Document, id: &BlockId) -> bool {
        if !self.select_block(doc, id) {
            return false;
        }
        self.editing_block_id = Some(id.clone());
        true
    }

    /// Leave inline editing, keeping the block selected.
    /// Returns the block that was being edited.
    pub fn end_edit(&mut self) -> Option<BlockId> {
        self.editing_block_id.take()
    }

    /// Re-point at the document's active step and drop references to blocks
    /// that no longer exist there. A change of active step clears the block
    /// selection, since block ids are only unique within one step.
    pub fn reconcile(&mut self, doc: &Document) {
        if &self.active_step_id != doc.active_step_id() {
            self.active_step_id = doc.active_step_id().clone();
            self.clear();
            return;
        }
        let step = doc.active_step();
        if self
            .selected_block_id
            .as_ref()
            .is_some_and(|id| !step.contains_block(id))
        {
            self.selected_block_id = None;
        }
        if self
            .editing_block_id
            .as_ref()
            .is_some_and(|id| self.selected_block_id.as_ref() != Some(id))
        {
            self.editing_block_id = None;
        }
    }
}
