//! Block capability lookup.
//!
//! The document model only knows a block's kind. Everything kind-specific
//! the engine needs (starting content, where inline text edits land) is
//! looked up here, so hosts can add their own kinds without touching the
//! model. Renderers and property editors live in the host and can key their
//! own tables off [`BlockKind`] the same way.

use crate::document::{Block, BlockContent, BlockKind};
use std::collections::HashMap;

/// What the engine knows about one block kind.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSpec {
    /// Human-readable name for palettes.
    pub label: String,
    /// Content new blocks of this kind start with.
    pub default_content: BlockContent,
    /// Content key written by an inline-edit commit.
    pub text_field: Option<String>,
}

impl BlockSpec {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            default_content: BlockContent::new(),
            text_field: None,
        }
    }

    pub fn with_content(mut self, content: BlockContent) -> Self {
        self.default_content = content;
        self
    }

    pub fn with_text_field(mut self, field: impl Into<String>) -> Self {
        self.text_field = Some(field.into());
        self
    }
}

/// Registry of known block kinds.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    specs: HashMap<BlockKind, BlockSpec>,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BlockRegistry {
    /// Registry with no kinds at all.
    pub fn empty() -> Self {
        Self {
            specs: HashMap::new(),
        }
    }

    /// Registry with every built-in kind.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for kind in BlockKind::BUILTIN {
            let mut label = kind.name().to_string();
            if let Some(first) = label.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            let mut spec = BlockSpec::new(label).with_content(kind.default_content());
            spec.text_field = kind.text_field().map(str::to_string);
            registry.register(kind, spec);
        }
        registry
    }

    /// Add or replace the spec for a kind.
    pub fn register(&mut self, kind: BlockKind, spec: BlockSpec) {
        self.specs.insert(kind, spec);
    }

    pub fn get(&self, kind: &BlockKind) -> Option<&BlockSpec> {
        self.specs.get(kind)
    }

    pub fn contains(&self, kind: &BlockKind) -> bool {
        self.specs.contains_key(kind)
    }

    /// All registered kinds, built-ins first in palette order.
    pub fn kinds(&self) -> Vec<BlockKind> {
        let mut kinds: Vec<BlockKind> = self.specs.keys().cloned().collect();
        kinds.sort_by_key(|kind| {
            let builtin = BlockKind::BUILTIN.iter().position(|k| k == kind);
            (builtin.unwrap_or(usize::MAX), kind.name().to_string())
        });
        kinds
    }

    /// Starting content for a new block. Unknown kinds start empty.
    pub fn default_content(&self, kind: &BlockKind) -> BlockContent {
        self.get(kind)
            .map(|spec| spec.default_content.clone())
            .unwrap_or_default()
    }

    /// Content key an inline edit of `kind` writes to.
    pub fn text_field(&self, kind: &BlockKind) -> Option<&str> {
        self.get(kind).and_then(|spec| spec.text_field.as_deref())
    }

    /// A new block of `kind` with its registered default content.
    pub fn create_block(&self, kind: BlockKind) -> Block {
        let content = self.default_content(&kind);
        Block::with_content(kind, content)
    }
}
