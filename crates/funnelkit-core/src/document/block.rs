//! Blocks: typed content units inside a step.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

/// Structured block payload. Its expected keys depend on the block kind.
pub type BlockContent = Map<String, Value>;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh unique id.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of a block, unique within its step.
    BlockId
);
string_id!(
    /// Identifier of a step, unique within its document.
    StepId
);

/// The kind of a block.
///
/// Built-in kinds serialize as their lowercase name; anything else round-trips
/// through [`BlockKind::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockKind {
    Heading,
    Text,
    Image,
    Button,
    Input,
    Options,
    Spacer,
    Divider,
    Video,
    Custom(String),
}

impl BlockKind {
    /// All built-in kinds, in palette order.
    pub const BUILTIN: [BlockKind; 9] = [
        BlockKind::Heading,
        BlockKind::Text,
        BlockKind::Image,
        BlockKind::Button,
        BlockKind::Input,
        BlockKind::Options,
        BlockKind::Spacer,
        BlockKind::Divider,
        BlockKind::Video,
    ];

    pub fn name(&self) -> &str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Button => "button",
            BlockKind::Input => "input",
            BlockKind::Options => "options",
            BlockKind::Spacer => "spacer",
            BlockKind::Divider => "divider",
            BlockKind::Video => "video",
            BlockKind::Custom(name) => name,
        }
    }

    /// Content a freshly added block of this kind starts with.
    pub fn default_content(&self) -> BlockContent {
        let value = match self {
            BlockKind::Heading => json!({ "text": "Heading", "level": 1 }),
            BlockKind::Text => json!({ "text": "Text" }),
            BlockKind::Image => json!({ "src": "", "alt": "" }),
            BlockKind::Button => json!({ "label": "Continue", "action": "next-step" }),
            BlockKind::Input => json!({ "label": "Your answer", "placeholder": "", "required": false }),
            BlockKind::Options => json!({
                "question": "Choose an option",
                "options": ["Option 1", "Option 2"],
                "multiple": false
            }),
            BlockKind::Spacer => json!({ "height": 24 }),
            BlockKind::Video => json!({ "url": "" }),
            BlockKind::Divider | BlockKind::Custom(_) => json!({}),
        };
        match value {
            Value::Object(map) => map,
            _ => BlockContent::new(),
        }
    }

    /// Content key that inline text editing writes to, if the kind has one.
    pub fn text_field(&self) -> Option<&'static str> {
        match self {
            BlockKind::Heading | BlockKind::Text => Some("text"),
            BlockKind::Button | BlockKind::Input => Some("label"),
            BlockKind::Options => Some("question"),
            BlockKind::Image => Some("alt"),
            _ => None,
        }
    }
}

impl From<String> for BlockKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "heading" => BlockKind::Heading,
            "text" => BlockKind::Text,
            "image" => BlockKind::Image,
            "button" => BlockKind::Button,
            "input" => BlockKind::Input,
            "options" => BlockKind::Options,
            "spacer" => BlockKind::Spacer,
            "divider" => BlockKind::Divider,
            "video" => BlockKind::Video,
            _ => BlockKind::Custom(name),
        }
    }
}

impl From<&str> for BlockKind {
    fn from(name: &str) -> Self {
        BlockKind::from(name.to_string())
    }
}

impl From<BlockKind> for String {
    fn from(kind: BlockKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed content unit owned by exactly one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub content: BlockContent,
    /// Position within the owning step. Always equal to the array index.
    pub order: usize,
}

impl Block {
    /// Create a block with a fresh id and the kind's default content.
    pub fn new(kind: BlockKind) -> Self {
        let content = kind.default_content();
        Self::with_content(kind, content)
    }

    /// Create a block with a fresh id and explicit content.
    pub fn with_content(kind: BlockKind, content: BlockContent) -> Self {
        Self {
            id: BlockId::generate(),
            kind,
            content,
            order: 0,
        }
    }

    /// Shallow-merge `partial` into the content.
    /// Returns true if any key changed.
    pub fn merge_content(&mut self, partial: &BlockContent) -> bool {
        let mut changed = false;
        for (key, value) in partial {
            if self.content.get(key) != Some(value) {
                self.content.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        changed
    }

    /// Whether merging `partial` would change anything.
    pub fn would_change(&self, partial: &BlockContent) -> bool {
        partial
            .iter()
            .any(|(key, value)| self.content.get(key) != Some(value))
    }

    /// Clone this block under a fresh id.
    pub fn duplicate(&self) -> Self {
        Self {
            id: BlockId::generate(),
            ..self.clone()
        }
    }

    /// The text shown for inline editing, if the kind has a text field.
    pub fn text(&self) -> Option<&str> {
        self.kind
            .text_field()
            .and_then(|field| self.content.get(field))
            .and_then(Value::as_str)
    }
}
