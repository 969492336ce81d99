//! The editor session: one open document with its history, selection,
//! drag state and persistence.
//!
//! All mutations go through [`EditorSession::apply`], which records the new
//! document in history, reconciles the selection and triggers persistence in
//! one step. Readers never observe a document and a selection that disagree.

use crate::command::Command;
use crate::config::EditorConfig;
use crate::document::{BlockId, BlockKind, Document, StepId};
use crate::error::{EditorError, EditorResult};
use crate::history::History;
use crate::registry::BlockRegistry;
use crate::reorder::{CollisionResolver, DistanceActivation, DragList, DragSession, DropOutcome};
use crate::selection::Selection;
use crate::storage::{Autosave, PersistenceAdapter};
use kurbo::{Point, Rect};
use serde_json::Value;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// An open document being edited.
pub struct EditorSession {
    history: History<Document>,
    selection: Selection,
    drag: Option<DragSession>,
    registry: BlockRegistry,
    config: EditorConfig,
    activation: DistanceActivation,
    autosave: Autosave,
    adapter: Option<Box<dyn PersistenceAdapter>>,
}

impl EditorSession {
    /// Open `document` and start its autosave schedule.
    pub fn new(document: Document, config: EditorConfig) -> Self {
        let mut autosave = Autosave::new(config.autosave_interval(), config.autosave_on_change);
        autosave.start(Instant::now());

        log::debug!("Opened document {} ({})", document.id, document.name);
        Self {
            selection: Selection::new(&document),
            history: History::with_limit(document, config.history_limit),
            drag: None,
            registry: BlockRegistry::builtin(),
            activation: DistanceActivation {
                distance: config.activation_distance,
            },
            config,
            autosave,
            adapter: None,
        }
    }

    /// Open a fresh single-step document with default settings.
    pub fn blank() -> Self {
        Self::new(Document::blank(), EditorConfig::default())
    }

    /// Replace the block registry.
    pub fn with_registry(mut self, registry: BlockRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Attach the persistence adapter that receives saves.
    pub fn with_adapter(mut self, adapter: impl PersistenceAdapter + 'static) -> Self {
        self.set_adapter(adapter);
        self
    }

    pub fn set_adapter(&mut self, adapter: impl PersistenceAdapter + 'static) {
        self.adapter = Some(Box::new(adapter));
    }

    // --- State ---

    pub fn document(&self) -> &Document {
        self.history.present()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The drag in progress, if any.
    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Whether there are edits the adapter has not seen yet.
    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
    }

    // --- Edits ---

    /// Apply a document command.
    ///
    /// Returns `Ok(false)` when the command changed nothing, in which case
    /// no history entry is created and nothing is saved.
    pub fn apply(&mut self, command: Command) -> EditorResult<bool> {
        self.ensure_idle()?;

        let edit = command
            .apply(self.document(), &self.registry)
            .inspect_err(|e| log::warn!("Rejected {}: {}", command.name(), e))?;

        if !self.commit(edit.document) {
            log::trace!("{} changed nothing", command.name());
            return Ok(false);
        }
        log::debug!("Applied {}", command.name());

        if let Some(id) = edit.created_block {
            self.selection.select_block(self.history.present(), &id);
        }
        Ok(true)
    }

    /// Group the following edits into a single undo entry until
    /// [`EditorSession::end_batch`].
    pub fn begin_batch(&mut self) {
        self.history.begin_batch();
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    /// Step back one history entry. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> EditorResult<bool> {
        self.ensure_idle()?;
        if self.history.undo().is_none() {
            return Ok(false);
        }
        self.after_transition();
        log::debug!("Undo");
        Ok(true)
    }

    /// Re-apply the most recently undone entry.
    pub fn redo(&mut self) -> EditorResult<bool> {
        self.ensure_idle()?;
        if self.history.redo().is_none() {
            return Ok(false);
        }
        self.after_transition();
        log::debug!("Redo");
        Ok(true)
    }

    // --- Selection ---

    /// Make `id` the active step.
    ///
    /// Switching steps is navigation, not an edit: the document's active
    /// step follows but no undo entry is created.
    pub fn select_step(&mut self, id: &StepId) -> EditorResult<bool> {
        self.ensure_idle()?;
        if !self.selection.select_step(self.history.present(), id) {
            return Ok(false);
        }
        if self.document().active_step_id() != id {
            let next = self.document().set_active_step(id);
            self.history.replace_present(next);
            // The exported active step changed
            self.autosave.mark_dirty();
        }
        Ok(true)
    }

    /// Select a block of the active step.
    pub fn select_block(&mut self, id: &BlockId) -> bool {
        self.selection.select_block(self.history.present(), id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Enter inline editing for a block of the active step.
    pub fn begin_edit(&mut self, id: &BlockId) -> bool {
        self.selection.begin_edit(self.history.present(), id)
    }

    /// Leave inline editing and write `text` into the block's text field.
    ///
    /// Kinds without a text field just leave editing. Returns whether the
    /// document changed.
    pub fn commit_edit(&mut self, text: &str) -> EditorResult<bool> {
        self.ensure_idle()?;
        let Some(block_id) = self.selection.end_edit() else {
            return Ok(false);
        };

        let step = self.document().active_step();
        let Some(block) = step.block(&block_id) else {
            return Ok(false);
        };
        let Some(field) = self.registry.text_field(&block.kind) else {
            return Ok(false);
        };

        let mut content = serde_json::Map::new();
        content.insert(field.to_string(), Value::String(text.to_string()));
        let command = Command::UpdateBlockContent {
            step: step.id.clone(),
            block: block_id,
            content,
        };
        self.apply(command)
    }

    /// Leave inline editing without touching the document.
    pub fn cancel_edit(&mut self) {
        self.selection.end_edit();
    }

    // --- Drag and drop ---

    /// Start a drag. Only one drag can be in progress.
    pub fn begin_drag(&mut self, drag: DragSession) -> EditorResult<()> {
        self.ensure_idle()?;
        log::trace!("Drag started on {:?}", drag.list());
        self.drag = Some(drag);
        Ok(())
    }

    /// Start dragging the item at `from` in `list`.
    pub fn begin_reorder(&mut self, list: DragList, from: usize, origin: Point) -> EditorResult<()> {
        self.begin_drag(DragSession::reorder(list, from, origin))
    }

    /// Start dragging a new `kind` block from the palette into `step`.
    pub fn begin_palette_drag(
        &mut self,
        step: StepId,
        kind: BlockKind,
        origin: Point,
    ) -> EditorResult<()> {
        let block = self.registry.create_block(kind);
        self.begin_drag(DragSession::insert_new(step, block, origin))
    }

    /// Feed a pointer position to the drag. Returns true when this movement
    /// activated it.
    pub fn drag_pointer_moved(&mut self, pointer: Point) -> bool {
        let activation = self.activation;
        self.drag
            .as_mut()
            .is_some_and(|drag| drag.pointer_moved(pointer, &activation))
    }

    /// Set the hovered slot directly.
    pub fn drag_hover(&mut self, index: Option<usize>) {
        if let Some(drag) = &mut self.drag {
            drag.hover(index);
        }
    }

    /// Resolve the hovered slot from the pointer and the rendered item bounds.
    pub fn drag_hover_at(&mut self, pointer: Point, items: &[Rect], resolver: &dyn CollisionResolver) {
        if let Some(drag) = &mut self.drag {
            drag.hover_at(pointer, items, resolver);
        }
    }

    /// End the drag and apply its outcome. Returns whether the document changed.
    pub fn drop_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };

        match drag.drop_on(self.history.present()) {
            DropOutcome::NoOp => {
                log::trace!("Drag ended without change");
                false
            }
            DropOutcome::Reordered(next) => {
                log::debug!("Drop reordered items");
                self.commit(next)
            }
            DropOutcome::Inserted { document, block } => {
                log::debug!("Drop inserted block {}", block);
                let changed = self.commit(document);
                self.selection.select_block(self.history.present(), &block);
                changed
            }
        }
    }

    /// Abandon the drag. The document is untouched.
    pub fn cancel_drag(&mut self) {
        if self.drag.take().is_some() {
            log::trace!("Drag cancelled");
        }
    }

    // --- Import / export ---

    /// Replace the document with one parsed from JSON.
    ///
    /// The input is fully validated first; on any error the current
    /// document, history and selection stay as they were. A successful
    /// import is an undoable edit.
    pub fn import_json(&mut self, json: &str) -> EditorResult<()> {
        self.ensure_idle()?;
        let document = Document::from_json(json).inspect_err(|e| log::warn!("Import rejected: {}", e))?;

        log::info!(
            "Imported document {} with {} steps",
            document.id,
            document.step_count()
        );
        self.commit(document);
        Ok(())
    }

    /// Serialize the current document.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        self.document().to_json()
    }

    // --- Persistence ---

    /// Hand the current document to the adapter now.
    pub fn save(&mut self) {
        self.save_at(Instant::now());
    }

    /// Drive the autosave schedule. Call from the host's event loop.
    /// Returns true if a periodic save happened.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// [`EditorSession::tick`] with an explicit clock.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        if !self.autosave.should_save_at(now) {
            return false;
        }
        log::debug!("Auto-saving document {}", self.document().id);
        self.save_at(now);
        true
    }

    /// Stop autosaving and release the adapter. Pending edits that were not
    /// saved yet are not flushed.
    pub fn close(&mut self) {
        self.autosave.stop();
        self.drag = None;
        if self.adapter.take().is_some() {
            log::debug!("Closed document {}", self.document().id);
        }
    }

    /// Without an adapter nothing is handed off, so the document stays dirty.
    fn save_at(&mut self, now: Instant) {
        if let Some(adapter) = &self.adapter {
            adapter.on_save(self.history.present());
            self.autosave.saved_at(now);
        }
    }

    // --- Internals ---

    fn ensure_idle(&self) -> EditorResult<()> {
        if self.drag.is_some() {
            return Err(EditorError::DragInProgress);
        }
        Ok(())
    }

    /// Record `next` as the new present. Returns false for a no-op.
    fn commit(&mut self, next: Document) -> bool {
        if !self.history.record(next) {
            return false;
        }
        self.after_transition();
        true
    }

    /// Reconcile selection and persistence with a new present, after an
    /// edit, undo or redo.
    fn after_transition(&mut self) {
        self.selection.reconcile(self.history.present());
        self.autosave.mark_dirty();
        if self.autosave.saves_on_change() {
            self.save();
        }
    }
}
