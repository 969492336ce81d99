//! Error types for the editing engine.
//!
//! Only hard errors live here. A stale id or an empty undo stack is not an
//! error: the operation leaves the document untouched and reports that
//! nothing changed.

use crate::document::{BlockId, StepId};
use thiserror::Error;

/// A rejected editor operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// The operation would break a structural invariant of the document.
    #[error("Invariant violation: {0}")]
    InvariantViolation(Invariant),
    /// An imported document failed validation.
    #[error("Import rejected: {0}")]
    Import(#[from] ImportError),
    /// A drag session is active and owns the document until it ends.
    #[error("A drag session is in progress")]
    DragInProgress,
}

/// Structural invariants an operation may refuse to break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invariant {
    /// A document always keeps at least one step.
    LastStep,
}

impl std::fmt::Display for Invariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Invariant::LastStep => write!(f, "cannot delete the only remaining step"),
        }
    }
}

/// Why an imported document was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    Json(String),
    #[error("Unsupported format version {found} (supported: 1 to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("Document has no steps")]
    NoSteps,
    #[error("Missing 'activeStepId'")]
    MissingActiveStep,
    #[error("Active step {0} does not exist")]
    DanglingActiveStep(StepId),
    #[error("Duplicate step id {0}")]
    DuplicateStepId(StepId),
    #[error("Duplicate block id {block} in step {step}")]
    DuplicateBlockId { step: StepId, block: BlockId },
    #[error("Block {block} in step {step} has order {found}, expected {expected}")]
    OrderMismatch {
        step: StepId,
        block: BlockId,
        found: usize,
        expected: usize,
    },
}

impl From<serde_json::Error> for ImportError {
    fn from(e: serde_json::Error) -> Self {
        ImportError::Json(e.to_string())
    }
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
