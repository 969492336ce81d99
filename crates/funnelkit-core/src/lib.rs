//! FunnelKit Core Library
//!
//! Editing engine for multi-step funnel documents: the document model,
//! undo/redo history, selection, drag-and-drop reordering and persistence.
//! Rendering and input devices belong to the host; the engine only consumes
//! commands, pointer positions and item bounds.

pub mod command;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod history;
pub mod registry;
pub mod reorder;
pub mod selection;
pub mod storage;

pub use command::{Command, Edit};
pub use config::EditorConfig;
pub use document::{
    Block, BlockContent, BlockId, BlockKind, Direction, Document, Step, StepId, StepPatch,
    StepSettings,
};
pub use editor::EditorSession;
pub use error::{EditorError, EditorResult, ImportError, Invariant};
pub use history::History;
pub use registry::{BlockRegistry, BlockSpec};
pub use reorder::{DragList, DragSession, DropOutcome};
pub use selection::Selection;
pub use storage::{MemoryStorage, PersistenceAdapter, Storage, StorageError};
