//! Drag-and-drop reordering.
//!
//! The engine works on one ordered list at a time: the steps of a document or
//! the blocks of a single step. Pointer handling is split into two injectable
//! policies. An [`ActivationPolicy`] decides when a press becomes a drag and a
//! [`CollisionResolver`] turns a pointer position into a hovered index. The
//! [`DragSession`] only ever consumes the resolved index.

mod collision;
mod drag;

pub use collision::{CollisionResolver, NearestCenter, NearestCorner, PointerWithin};
pub use drag::{
    ActivationPolicy, DistanceActivation, DragKind, DragList, DragPhase, DragSession, DropOutcome,
    DEFAULT_ACTIVATION_DISTANCE,
};

/// Remove the item at `from` and insert it at `to`.
///
/// `to` is clamped to `[0, len - 1]` and is the position after removal, so
/// moving index 0 to index 2 in `[A, B, C, D]` yields `[B, C, A, D]`.
/// Returns `None` when the move would change nothing (out-of-range source or
/// a target equal to the source).
pub fn array_move<T: Clone>(items: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    if from >= items.len() {
        return None;
    }
    let to = to.min(items.len() - 1);
    if to == from {
        return None;
    }
    let mut moved = items.to_vec();
    let item = moved.remove(from);
    moved.insert(to, item);
    Some(moved)
}
