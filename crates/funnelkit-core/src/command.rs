//! Document edits as data.
//!
//! A [`Command`] names one document operation and its arguments, so hosts can
//! dispatch edits from UI callbacks or deserialize them from JSON messages.
//! [`Command::apply`] is a pure reducer over [`Document`].

use crate::document::{Block, BlockContent, BlockId, BlockKind, Direction, Document, StepId, StepPatch};
use crate::error::EditorResult;
use crate::registry::BlockRegistry;
use serde::{Deserialize, Serialize};

/// One document operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    AddStep {
        #[serde(default)]
        after: Option<StepId>,
        #[serde(default)]
        name: Option<String>,
    },
    UpdateStep {
        step: StepId,
        patch: StepPatch,
    },
    DeleteStep {
        step: StepId,
    },
    DuplicateStep {
        step: StepId,
    },
    ReorderSteps {
        from: usize,
        to: usize,
    },
    MoveStep {
        step: StepId,
        direction: Direction,
    },
    AddBlock {
        step: StepId,
        kind: BlockKind,
        /// Starting content. The registry default is used when absent.
        #[serde(default)]
        content: Option<BlockContent>,
        /// Insert position, clamped. Appends when absent.
        #[serde(default)]
        at: Option<usize>,
    },
    UpdateBlockContent {
        step: StepId,
        block: BlockId,
        content: BlockContent,
    },
    DeleteBlock {
        step: StepId,
        block: BlockId,
    },
    DuplicateBlock {
        step: StepId,
        block: BlockId,
    },
    ReorderBlocks {
        step: StepId,
        from: usize,
        to: usize,
    },
    MoveBlock {
        step: StepId,
        block: BlockId,
        direction: Direction,
    },
}

/// Result of applying a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub document: Document,
    /// Block created by the command, if it created one.
    pub created_block: Option<BlockId>,
}

impl Edit {
    fn plain(document: Document) -> Self {
        Self {
            document,
            created_block: None,
        }
    }
}

impl Command {
    /// Apply to `doc`, using `registry` for default block content.
    ///
    /// The input document is never modified. A command that references a
    /// missing id yields an unchanged copy.
    pub fn apply(&self, doc: &Document, registry: &BlockRegistry) -> EditorResult<Edit> {
        let edit = match self {
            Command::AddStep { after, name } => {
                Edit::plain(doc.add_step(after.as_ref(), name.as_deref()))
            }
            Command::UpdateStep { step, patch } => Edit::plain(doc.update_step(step, patch)),
            Command::DeleteStep { step } => Edit::plain(doc.delete_step(step)?),
            Command::DuplicateStep { step } => Edit::plain(doc.duplicate_step(step)),
            Command::ReorderSteps { from, to } => Edit::plain(doc.reorder_steps(*from, *to)),
            Command::MoveStep { step, direction } => {
                Edit::plain(doc.move_step(step, *direction))
            }
            Command::AddBlock {
                step,
                kind,
                content,
                at,
            } => {
                let block = match content {
                    Some(content) => Block::with_content(kind.clone(), content.clone()),
                    None => registry.create_block(kind.clone()),
                };
                created(doc, block.id.clone(), doc.insert_block(step, block, *at))
            }
            Command::UpdateBlockContent {
                step,
                block,
                content,
            } => Edit::plain(doc.update_block_content(step, block, content)),
            Command::DeleteBlock { step, block } => Edit::plain(doc.delete_block(step, block)),
            Command::DuplicateBlock { step, block } => {
                let next = doc.duplicate_block(step, block);
                let copy = next
                    .step(step)
                    .and_then(|s| s.block_index(block).and_then(|i| s.blocks.get(i + 1)))
                    .map(|b| b.id.clone());
                match copy {
                    Some(id) => created(doc, id, next),
                    None => Edit::plain(next),
                }
            }
            Command::ReorderBlocks { step, from, to } => {
                Edit::plain(doc.reorder_blocks(step, *from, *to))
            }
            Command::MoveBlock {
                step,
                block,
                direction,
            } => Edit::plain(doc.move_block(step, block, *direction)),
        };
        Ok(edit)
    }

    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddStep { .. } => "add_step",
            Command::UpdateStep { .. } => "update_step",
            Command::DeleteStep { .. } => "delete_step",
            Command::DuplicateStep { .. } => "duplicate_step",
            Command::ReorderSteps { .. } => "reorder_steps",
            Command::MoveStep { .. } => "move_step",
            Command::AddBlock { .. } => "add_block",
            Command::UpdateBlockContent { .. } => "update_block_content",
            Command::DeleteBlock { .. } => "delete_block",
            Command::DuplicateBlock { .. } => "duplicate_block",
            Command::ReorderBlocks { .. } => "reorder_blocks",
            Command::MoveBlock { .. } => "move_block",
        }
    }
}

fn created(before: &Document, id: BlockId, after: Document) -> Edit {
    let created_block = (after != *before).then_some(id);
    Edit {
        document: after,
        created_block,
    }
}
