//! Steps: the pages of a funnel.

use super::block::{Block, BlockId, StepId};
use serde::{Deserialize, Serialize};

/// Per-step display flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepSettings {
    pub show_header: bool,
    pub allow_back: bool,
    pub show_progress: bool,
    pub visible: bool,
}

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            show_header: true,
            allow_back: true,
            show_progress: true,
            visible: true,
        }
    }
}

/// Partial update for a step. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepPatch {
    pub name: Option<String>,
    pub show_header: Option<bool>,
    pub allow_back: Option<bool>,
    pub show_progress: Option<bool>,
    pub visible: Option<bool>,
}

impl StepPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// One page of the funnel, holding an ordered list of blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub settings: StepSettings,
}

impl Step {
    /// Create an empty step with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: StepId::generate(),
            name: name.into(),
            blocks: Vec::new(),
            settings: StepSettings::default(),
        }
    }

    /// Get a block by id.
    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    /// Position of a block within this step.
    pub fn block_index(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.id == id)
    }

    pub fn contains_block(&self, id: &BlockId) -> bool {
        self.block_index(id).is_some()
    }

    /// Rewrite every block's `order` to match its array position.
    pub(crate) fn renumber(&mut self) {
        for (i, block) in self.blocks.iter_mut().enumerate() {
            block.order = i;
        }
    }

    /// Whether applying `patch` would change anything.
    pub fn would_change(&self, patch: &StepPatch) -> bool {
        let mut probe = self.clone();
        probe.apply_patch(patch);
        probe != *self
    }

    /// Merge `patch` into the name and settings.
    pub(crate) fn apply_patch(&mut self, patch: &StepPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        let settings = &mut self.settings;
        if let Some(v) = patch.show_header {
            settings.show_header = v;
        }
        if let Some(v) = patch.allow_back {
            settings.allow_back = v;
        }
        if let Some(v) = patch.show_progress {
            settings.show_progress = v;
        }
        if let Some(v) = patch.visible {
            settings.visible = v;
        }
    }

    /// Clone this step under a fresh id, regenerating every block id.
    pub fn duplicate(&self) -> Self {
        Self {
            id: StepId::generate(),
            name: format!("{} (copy)", self.name),
            blocks: self.blocks.iter().map(Block::duplicate).collect(),
            settings: self.settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BlockKind;

    #[test]
    fn test_patch_merges_only_given_fields() {
        let mut step = Step::new("Intro");
        let patch = StepPatch {
            allow_back: Some(false),
            ..StepPatch::default()
        };
        step.apply_patch(&patch);

        assert_eq!(step.name, "Intro");
        assert!(!step.settings.allow_back);
        assert!(step.settings.show_header);
    }

    #[test]
    fn test_would_change() {
        let step = Step::new("Intro");
        assert!(!step.would_change(&StepPatch::name("Intro")));
        assert!(step.would_change(&StepPatch::name("Welcome")));
        assert!(!step.would_change(&StepPatch::default()));
    }

    #[test]
    fn test_duplicate_regenerates_all_ids() {
        let mut step = Step::new("Quiz");
        step.blocks.push(Block::new(BlockKind::Heading));
        step.blocks.push(Block::new(BlockKind::Options));
        step.renumber();

        let copy = step.duplicate();
        assert_ne!(copy.id, step.id);
        assert_eq!(copy.blocks.len(), 2);
        for (a, b) in step.blocks.iter().zip(&copy.blocks) {
            assert_ne!(a.id, b.id);
            assert_eq!(a.order, b.order);
            assert_eq!(a.content, b.content);
        }
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: StepSettings = serde_json::from_str(r#"{"allowBack": false}"#).unwrap();
        assert!(!settings.allow_back);
        assert!(settings.visible);
    }
}
