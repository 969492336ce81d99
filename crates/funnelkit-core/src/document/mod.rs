//! The document model: a document owns ordered steps, a step owns ordered blocks.
//!
//! Every operation takes `&self` and returns a new [`Document`]; the input is
//! never modified. Steps are shared between snapshots behind [`Arc`] and only
//! copied when an operation actually touches them, so history snapshots stay
//! cheap and independent.
//!
//! Operations that reference an id which does not exist return an unchanged
//! copy. The only hard failure is deleting the last step.

mod block;
mod format;
mod step;

pub use block::{Block, BlockContent, BlockId, BlockKind, StepId};
pub use format::FORMAT_VERSION;
pub use step::{Step, StepPatch, StepSettings};

use crate::error::{EditorError, EditorResult, ImportError, Invariant};
use crate::reorder::array_move;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Direction for single-slot nudges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards index 0.
    Up,
    /// Towards the end of the list.
    Down,
}

/// The full editable artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Storage key.
    pub id: String,
    /// Title shown in the host UI.
    pub name: String,
    steps: Vec<Arc<Step>>,
    active_step_id: StepId,
}

impl Default for Document {
    fn default() -> Self {
        Self::blank()
    }
}

impl Document {
    /// Create a document holding a single empty step.
    pub fn blank() -> Self {
        let step = Step::new("Step 1");
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            active_step_id: step.id.clone(),
            steps: vec![Arc::new(step)],
        }
    }

    /// Build a document from parts, checking every structural invariant.
    pub fn from_steps(
        id: impl Into<String>,
        name: impl Into<String>,
        steps: Vec<Step>,
        active_step_id: StepId,
    ) -> Result<Self, ImportError> {
        let doc = Self {
            id: id.into(),
            name: name.into(),
            steps: steps.into_iter().map(Arc::new).collect(),
            active_step_id,
        };
        doc.validate()?;
        Ok(doc)
    }

    /// Check invariants: steps non-empty, unique step ids, unique block ids
    /// per step, dense block order, and an existing active step.
    pub fn validate(&self) -> Result<(), ImportError> {
        if self.steps.is_empty() {
            return Err(ImportError::NoSteps);
        }

        let mut step_ids = HashSet::new();
        for step in &self.steps {
            if !step_ids.insert(&step.id) {
                return Err(ImportError::DuplicateStepId(step.id.clone()));
            }

            let mut block_ids = HashSet::new();
            for (expected, block) in step.blocks.iter().enumerate() {
                if !block_ids.insert(&block.id) {
                    return Err(ImportError::DuplicateBlockId {
                        step: step.id.clone(),
                        block: block.id.clone(),
                    });
                }
                if block.order != expected {
                    return Err(ImportError::OrderMismatch {
                        step: step.id.clone(),
                        block: block.id.clone(),
                        found: block.order,
                        expected,
                    });
                }
            }
        }

        if !step_ids.contains(&self.active_step_id) {
            return Err(ImportError::DanglingActiveStep(self.active_step_id.clone()));
        }
        Ok(())
    }

    // --- Lookups ---

    pub fn steps(&self) -> impl ExactSizeIterator<Item = &Step> {
        self.steps.iter().map(|s| s.as_ref())
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|s| &s.id == id).map(|s| s.as_ref())
    }

    pub fn step_at(&self, index: usize) -> Option<&Step> {
        self.steps.get(index).map(|s| s.as_ref())
    }

    pub fn step_index(&self, id: &StepId) -> Option<usize> {
        self.steps.iter().position(|s| &s.id == id)
    }

    pub fn active_step_id(&self) -> &StepId {
        &self.active_step_id
    }

    /// The active step. Always present.
    pub fn active_step(&self) -> &Step {
        self.step(&self.active_step_id)
            .unwrap_or_else(|| self.steps[0].as_ref())
    }

    pub fn block(&self, step_id: &StepId, block_id: &BlockId) -> Option<&Block> {
        self.step(step_id).and_then(|s| s.block(block_id))
    }

    pub fn step_ids(&self) -> Vec<StepId> {
        self.steps.iter().map(|s| s.id.clone()).collect()
    }

    // --- Step operations ---

    /// Append a new step (named `Step N` by default) at the end, or right
    /// after `after`, and make it active.
    pub fn add_step(&self, after: Option<&StepId>, name: Option<&str>) -> Document {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("Step {}", self.steps.len() + 1));
        self.insert_step(after, Step::new(name))
    }

    /// Insert a prepared step at the end, or right after `after`, and make it
    /// active. A stale `after` id or a colliding step id is a no-op.
    pub fn insert_step(&self, after: Option<&StepId>, mut step: Step) -> Document {
        if self.step_index(&step.id).is_some() {
            return self.clone();
        }
        let index = match after {
            Some(after) => match self.step_index(after) {
                Some(i) => i + 1,
                None => return self.clone(),
            },
            None => self.steps.len(),
        };

        step.renumber();
        let mut next = self.clone();
        next.active_step_id = step.id.clone();
        next.steps.insert(index, Arc::new(step));
        next
    }

    /// Merge `patch` into a step's name and settings.
    pub fn update_step(&self, id: &StepId, patch: &StepPatch) -> Document {
        self.edit_step(id, |step| {
            if !step.would_change(patch) {
                return false;
            }
            step.apply_patch(patch);
            true
        })
    }

    /// Remove a step. Deleting the only step is an invariant violation.
    /// If the removed step was active, the first remaining step becomes active.
    pub fn delete_step(&self, id: &StepId) -> EditorResult<Document> {
        let Some(index) = self.step_index(id) else {
            return Ok(self.clone());
        };
        if self.steps.len() == 1 {
            return Err(EditorError::InvariantViolation(Invariant::LastStep));
        }

        let mut next = self.clone();
        next.steps.remove(index);
        if &next.active_step_id == id {
            next.active_step_id = next.steps[0].id.clone();
        }
        Ok(next)
    }

    /// Clone a step (fresh step and block ids) right after the source, and
    /// make the copy active.
    pub fn duplicate_step(&self, id: &StepId) -> Document {
        match self.step(id) {
            Some(step) => self.insert_step(Some(id), step.duplicate()),
            None => self.clone(),
        }
    }

    /// Move the step at `from` to `to` (array-move semantics).
    pub fn reorder_steps(&self, from: usize, to: usize) -> Document {
        match array_move(&self.steps, from, to) {
            Some(steps) => Document {
                steps,
                ..self.clone()
            },
            None => self.clone(),
        }
    }

    /// Move a step one slot up or down.
    pub fn move_step(&self, id: &StepId, direction: Direction) -> Document {
        match self.step_index(id).and_then(|i| neighbor(i, direction, self.steps.len())) {
            Some((from, to)) => self.reorder_steps(from, to),
            None => self.clone(),
        }
    }

    /// Point the document at another step. Unknown ids are ignored.
    pub fn set_active_step(&self, id: &StepId) -> Document {
        if self.step_index(id).is_none() || &self.active_step_id == id {
            return self.clone();
        }
        Document {
            active_step_id: id.clone(),
            ..self.clone()
        }
    }

    // --- Block operations ---

    /// Insert a new block of `kind` at `at` (default: end). Without explicit
    /// content the kind's default content is used.
    pub fn add_block(
        &self,
        step_id: &StepId,
        kind: BlockKind,
        content: Option<BlockContent>,
        at: Option<usize>,
    ) -> Document {
        let block = match content {
            Some(content) => Block::with_content(kind, content),
            None => Block::new(kind),
        };
        self.insert_block(step_id, block, at)
    }

    /// Insert a prepared block at `at`, clamped to the end of the list.
    /// A block id that already exists in the step is a no-op.
    pub fn insert_block(&self, step_id: &StepId, block: Block, at: Option<usize>) -> Document {
        self.edit_step(step_id, |step| {
            if step.contains_block(&block.id) {
                return false;
            }
            let index = at.unwrap_or(step.blocks.len()).min(step.blocks.len());
            step.blocks.insert(index, block);
            step.renumber();
            true
        })
    }

    /// Shallow-merge `partial` into a block's content. Ids and order never change.
    pub fn update_block_content(
        &self,
        step_id: &StepId,
        block_id: &BlockId,
        partial: &BlockContent,
    ) -> Document {
        let unchanged = self
            .block(step_id, block_id)
            .is_none_or(|block| !block.would_change(partial));
        if unchanged {
            return self.clone();
        }
        self.edit_step(step_id, |step| {
            step.blocks
                .iter_mut()
                .find(|b| &b.id == block_id)
                .is_some_and(|block| block.merge_content(partial))
        })
    }

    /// Remove a block and renumber the rest.
    pub fn delete_block(&self, step_id: &StepId, block_id: &BlockId) -> Document {
        self.edit_step(step_id, |step| match step.block_index(block_id) {
            Some(index) => {
                step.blocks.remove(index);
                step.renumber();
                true
            }
            None => false,
        })
    }

    /// Clone a block under a fresh id, right after the source.
    pub fn duplicate_block(&self, step_id: &StepId, block_id: &BlockId) -> Document {
        self.edit_step(step_id, |step| match step.block_index(block_id) {
            Some(index) => {
                let copy = step.blocks[index].duplicate();
                step.blocks.insert(index + 1, copy);
                step.renumber();
                true
            }
            None => false,
        })
    }

    /// Move the block at `from` to `to` within one step (array-move semantics).
    pub fn reorder_blocks(&self, step_id: &StepId, from: usize, to: usize) -> Document {
        self.edit_step(step_id, |step| match array_move(&step.blocks, from, to) {
            Some(blocks) => {
                step.blocks = blocks;
                step.renumber();
                true
            }
            None => false,
        })
    }

    /// Move a block one slot up or down within its step.
    pub fn move_block(&self, step_id: &StepId, block_id: &BlockId, direction: Direction) -> Document {
        let Some(step) = self.step(step_id) else {
            return self.clone();
        };
        match step
            .block_index(block_id)
            .and_then(|i| neighbor(i, direction, step.blocks.len()))
        {
            Some((from, to)) => self.reorder_blocks(step_id, from, to),
            None => self.clone(),
        }
    }

    /// Copy-on-write edit of one step. `edit` returns false to signal that
    /// nothing changed, in which case the original document is returned.
    fn edit_step(&self, id: &StepId, edit: impl FnOnce(&mut Step) -> bool) -> Document {
        let Some(index) = self.step_index(id) else {
            return self.clone();
        };
        let mut step = self.steps[index].as_ref().clone();
        if !edit(&mut step) {
            return self.clone();
        }
        let mut next = self.clone();
        next.steps[index] = Arc::new(step);
        next
    }
}

/// Source and target index for a one-slot nudge, or None at the list edge.
fn neighbor(index: usize, direction: Direction, len: usize) -> Option<(usize, usize)> {
    match direction {
        Direction::Up if index > 0 => Some((index, index - 1)),
        Direction::Down if index + 1 < len => Some((index, index + 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block_ids(doc: &Document, step: &StepId) -> Vec<BlockId> {
        doc.step(step).unwrap().blocks.iter().map(|b| b.id.clone()).collect()
    }

    fn assert_dense(doc: &Document) {
        for step in doc.steps() {
            for (i, block) in step.blocks.iter().enumerate() {
                assert_eq!(block.order, i);
            }
        }
    }

    /// One step holding blocks A, B, C.
    fn abc() -> (Document, StepId, Vec<BlockId>) {
        let doc = Document::blank();
        let step = doc.active_step_id().clone();
        let mut ids = Vec::new();
        let mut doc = doc;
        for name in ["A", "B", "C"] {
            let mut block = Block::new(BlockKind::Text);
            block.id = BlockId::from(name);
            ids.push(block.id.clone());
            doc = doc.insert_block(&step, block, None);
        }
        (doc, step, ids)
    }

    #[test]
    fn test_blank_document() {
        let doc = Document::blank();
        assert_eq!(doc.step_count(), 1);
        assert_eq!(doc.active_step().name, "Step 1");
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_add_step_appends_and_activates() {
        let doc = Document::blank();
        let next = doc.add_step(None, None);

        assert_eq!(next.step_count(), 2);
        let added = next.step_at(1).unwrap();
        assert_eq!(added.name, "Step 2");
        assert_eq!(next.active_step_id(), &added.id);
        // Input untouched
        assert_eq!(doc.step_count(), 1);
    }

    #[test]
    fn test_add_step_after() {
        let doc = Document::blank().add_step(None, None).add_step(None, None);
        let first = doc.step_at(0).unwrap().id.clone();
        let next = doc.add_step(Some(&first), Some("Middle"));

        assert_eq!(next.step_at(1).unwrap().name, "Middle");
        assert_eq!(next.step_count(), 4);
    }

    #[test]
    fn test_add_step_after_stale_id_is_noop() {
        let doc = Document::blank();
        let next = doc.add_step(Some(&StepId::from("gone")), None);
        assert_eq!(next, doc);
    }

    #[test]
    fn test_update_step() {
        let doc = Document::blank();
        let id = doc.active_step_id().clone();
        let next = doc.update_step(&id, &StepPatch::name("Welcome"));
        assert_eq!(next.step(&id).unwrap().name, "Welcome");

        let stale = doc.update_step(&StepId::from("gone"), &StepPatch::name("x"));
        assert_eq!(stale, doc);
    }

    #[test]
    fn test_delete_last_step_rejected() {
        let doc = Document::blank();
        let id = doc.active_step_id().clone();
        let result = doc.delete_step(&id);
        assert_eq!(
            result,
            Err(EditorError::InvariantViolation(Invariant::LastStep))
        );
        assert_eq!(doc.step_count(), 1);
    }

    #[test]
    fn test_delete_active_step_reassigns_to_first() {
        let doc = Document::blank().add_step(None, None).add_step(None, None);
        let active = doc.active_step_id().clone();
        assert_eq!(doc.step_index(&active), Some(2));

        let next = doc.delete_step(&active).unwrap();
        assert_eq!(next.step_count(), 2);
        assert_eq!(next.active_step_id(), &next.step_at(0).unwrap().id);
    }

    #[test]
    fn test_delete_missing_step_is_noop() {
        let doc = Document::blank();
        assert_eq!(doc.delete_step(&StepId::from("gone")).unwrap(), doc);
    }

    #[test]
    fn test_duplicate_step() {
        let (doc, step, _) = abc();
        let doc = doc.add_step(None, None);
        let next = doc.duplicate_step(&step);

        assert_eq!(next.step_count(), 3);
        let copy = next.step_at(1).unwrap();
        assert_ne!(copy.id, step);
        assert_eq!(copy.blocks.len(), 3);
        let originals = block_ids(&next, &step);
        assert!(copy.blocks.iter().all(|b| !originals.contains(&b.id)));
        assert_eq!(next.active_step_id(), &copy.id);
        assert!(next.validate().is_ok());
    }

    #[test]
    fn test_add_block_at_index() {
        let (doc, step, ids) = abc();
        let next = doc.add_block(&step, BlockKind::Image, None, Some(1));

        let blocks = &next.step(&step).unwrap().blocks;
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].id, ids[0]);
        assert_eq!(blocks[1].kind, BlockKind::Image);
        assert_eq!(blocks[2].id, ids[1]);
        assert_dense(&next);
    }

    #[test]
    fn test_add_block_index_past_end_clamps() {
        let (doc, step, _) = abc();
        let next = doc.add_block(&step, BlockKind::Spacer, None, Some(99));
        let blocks = &next.step(&step).unwrap().blocks;
        assert_eq!(blocks[3].kind, BlockKind::Spacer);
        assert_dense(&next);
    }

    #[test]
    fn test_add_block_unknown_step_is_noop() {
        let doc = Document::blank();
        let next = doc.add_block(&StepId::from("gone"), BlockKind::Text, None, None);
        assert_eq!(next, doc);
    }

    #[test]
    fn test_update_block_content() {
        let (doc, step, ids) = abc();
        let mut partial = BlockContent::new();
        partial.insert("text".into(), json!("Hello"));

        let next = doc.update_block_content(&step, &ids[1], &partial);
        let block = next.block(&step, &ids[1]).unwrap();
        assert_eq!(block.content.get("text"), Some(&json!("Hello")));
        assert_eq!(block.order, 1);
        assert_eq!(block_ids(&next, &step), ids);

        // Original snapshot still holds the old content
        let old = doc.block(&step, &ids[1]).unwrap();
        assert_eq!(old.content.get("text"), Some(&json!("Text")));
    }

    #[test]
    fn test_update_block_content_same_value_is_noop() {
        let (doc, step, ids) = abc();
        let mut partial = BlockContent::new();
        partial.insert("text".into(), json!("Text"));
        assert_eq!(doc.update_block_content(&step, &ids[0], &partial), doc);
    }

    #[test]
    fn test_delete_block_renumbers() {
        let (doc, step, ids) = abc();
        let next = doc.delete_block(&step, &ids[0]);
        assert_eq!(block_ids(&next, &step), vec![ids[1].clone(), ids[2].clone()]);
        assert_dense(&next);

        assert_eq!(next.delete_block(&step, &ids[0]), next);
    }

    #[test]
    fn test_duplicate_block_inserted_after_source() {
        let (doc, step, ids) = abc();
        let next = doc.duplicate_block(&step, &ids[0]);
        let blocks = &next.step(&step).unwrap().blocks;

        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].id, ids[0]);
        assert!(!ids.contains(&blocks[1].id));
        assert_eq!(blocks[2].id, ids[1]);
        assert_dense(&next);
    }

    #[test]
    fn test_reorder_blocks_scenario() {
        let (doc, step, ids) = abc();
        let next = doc.reorder_blocks(&step, 0, 2);
        assert_eq!(
            block_ids(&next, &step),
            vec![ids[1].clone(), ids[2].clone(), ids[0].clone()]
        );
        assert_dense(&next);
    }

    #[test]
    fn test_reorder_blocks_same_index_is_noop() {
        let (doc, step, _) = abc();
        assert_eq!(doc.reorder_blocks(&step, 1, 1), doc);
        assert_eq!(doc.reorder_blocks(&step, 7, 0), doc);
    }

    #[test]
    fn test_reorder_steps() {
        let doc = Document::blank().add_step(None, None).add_step(None, None);
        let ids = doc.step_ids();
        let next = doc.reorder_steps(2, 0);
        assert_eq!(next.step_ids(), vec![ids[2].clone(), ids[0].clone(), ids[1].clone()]);
        assert_eq!(next.active_step_id(), doc.active_step_id());
    }

    #[test]
    fn test_move_block_and_step() {
        let (doc, step, ids) = abc();
        let next = doc.move_block(&step, &ids[2], Direction::Up);
        assert_eq!(
            block_ids(&next, &step),
            vec![ids[0].clone(), ids[2].clone(), ids[1].clone()]
        );
        assert_eq!(doc.move_block(&step, &ids[0], Direction::Up), doc);

        let doc = Document::blank().add_step(None, None);
        let first = doc.step_at(0).unwrap().id.clone();
        let next = doc.move_step(&first, Direction::Down);
        assert_eq!(next.step_index(&first), Some(1));
        assert_eq!(next.move_step(&first, Direction::Down), next);
    }

    #[test]
    fn test_set_active_step() {
        let doc = Document::blank().add_step(None, None);
        let first = doc.step_at(0).unwrap().id.clone();
        let next = doc.set_active_step(&first);
        assert_eq!(next.active_step_id(), &first);
        assert_eq!(next.set_active_step(&StepId::from("gone")), next);
    }

    #[test]
    fn test_untouched_steps_are_shared() {
        let doc = Document::blank().add_step(None, None);
        let second = doc.step_at(1).unwrap().id.clone();
        let next = doc.add_block(&second, BlockKind::Text, None, None);

        assert!(Arc::ptr_eq(&doc.steps[0], &next.steps[0]));
        assert!(!Arc::ptr_eq(&doc.steps[1], &next.steps[1]));
    }

    #[test]
    fn test_validate_rejects_broken_order() {
        let mut step = Step::new("S1");
        let mut block = Block::new(BlockKind::Text);
        block.order = 3;
        step.blocks.push(block);
        let active = step.id.clone();

        let result = Document::from_steps("doc", "Doc", vec![step], active);
        assert!(matches!(result, Err(ImportError::OrderMismatch { found: 3, expected: 0, .. })));
    }

    #[test]
    fn test_validate_rejects_duplicate_step_ids() {
        let step = Step::new("S1");
        let copy = step.clone();
        let active = step.id.clone();
        let result = Document::from_steps("doc", "Doc", vec![step, copy], active);
        assert!(matches!(result, Err(ImportError::DuplicateStepId(_))));
    }

    #[test]
    fn test_validate_rejects_dangling_active_step() {
        let step = Step::new("S1");
        let result = Document::from_steps("doc", "Doc", vec![step], StepId::from("nope"));
        assert!(matches!(result, Err(ImportError::DanglingActiveStep(_))));
    }
}
