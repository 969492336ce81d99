//! Drag session state machine.

use super::collision::CollisionResolver;
use crate::document::{Block, BlockId, Document, StepId};
use kurbo::{Point, Rect};

/// Default pointer travel (in screen pixels) before a press becomes a drag.
pub const DEFAULT_ACTIVATION_DISTANCE: f64 = 8.0;

/// Decides when pointer movement turns a press into a drag.
pub trait ActivationPolicy {
    fn is_activated(&self, origin: Point, current: Point) -> bool;
}

/// Activates once the pointer has moved further than `distance` from where
/// the press started. Keeps plain clicks from reordering anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceActivation {
    pub distance: f64,
}

impl Default for DistanceActivation {
    fn default() -> Self {
        Self {
            distance: DEFAULT_ACTIVATION_DISTANCE,
        }
    }
}

impl ActivationPolicy for DistanceActivation {
    fn is_activated(&self, origin: Point, current: Point) -> bool {
        origin.distance(current) > self.distance
    }
}

/// The list a drag operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragList {
    /// The steps of the document.
    Steps,
    /// The blocks of one step. Blocks never move between steps.
    Blocks(StepId),
}

/// What dropping does.
#[derive(Debug, Clone, PartialEq)]
pub enum DragKind {
    /// Move the item currently at `from`.
    Reorder { from: usize },
    /// Insert a new block dragged in from the palette.
    InsertNew { block: Block },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// Pointer is down but has not travelled far enough yet.
    Pending,
    /// Drag is live; hover updates are tracked.
    Active,
}

/// Result of ending a drag.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Nothing changed: click without drag, no hovered slot, or the item
    /// was dropped where it started.
    NoOp,
    /// An existing item moved.
    Reordered(Document),
    /// A palette block was inserted.
    Inserted { document: Document, block: BlockId },
}

/// One drag interaction, from press to drop or cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    list: DragList,
    kind: DragKind,
    origin: Point,
    phase: DragPhase,
    hovered: Option<usize>,
}

impl DragSession {
    /// Start dragging the item at `from` in `list`.
    pub fn reorder(list: DragList, from: usize, origin: Point) -> Self {
        Self {
            list,
            kind: DragKind::Reorder { from },
            origin,
            phase: DragPhase::Pending,
            hovered: None,
        }
    }

    /// Start dragging a new block from the palette into a step.
    pub fn insert_new(step: StepId, block: Block, origin: Point) -> Self {
        Self {
            list: DragList::Blocks(step),
            kind: DragKind::InsertNew { block },
            origin,
            phase: DragPhase::Pending,
            hovered: None,
        }
    }

    pub fn list(&self) -> &DragList {
        &self.list
    }

    pub fn kind(&self) -> &DragKind {
        &self.kind
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == DragPhase::Active
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Feed a pointer position. Returns true if this call activated the drag.
    pub fn pointer_moved(&mut self, pointer: Point, policy: &dyn ActivationPolicy) -> bool {
        if self.phase == DragPhase::Pending && policy.is_activated(self.origin, pointer) {
            self.phase = DragPhase::Active;
            return true;
        }
        false
    }

    /// Force activation, for hosts whose own sensors already decided.
    pub fn activate(&mut self) {
        self.phase = DragPhase::Active;
    }

    /// Update the hovered slot. Ignored until the drag is active.
    pub fn hover(&mut self, index: Option<usize>) {
        if self.is_active() {
            self.hovered = index;
        }
    }

    /// Resolve the hovered slot from the pointer and the rendered item bounds.
    pub fn hover_at(&mut self, pointer: Point, items: &[Rect], resolver: &dyn CollisionResolver) {
        self.hover(resolver.resolve(pointer, items));
    }

    /// End the drag against `doc`.
    pub fn drop_on(self, doc: &Document) -> DropOutcome {
        let Some(to) = self.hovered.filter(|_| self.is_active()) else {
            return DropOutcome::NoOp;
        };

        match (self.list, self.kind) {
            (DragList::Steps, DragKind::Reorder { from }) => {
                reordered(doc, doc.reorder_steps(from, to))
            }
            (DragList::Blocks(step), DragKind::Reorder { from }) => {
                reordered(doc, doc.reorder_blocks(&step, from, to))
            }
            (DragList::Blocks(step), DragKind::InsertNew { block }) => {
                let id = block.id.clone();
                let next = doc.insert_block(&step, block, Some(to));
                if next == *doc {
                    DropOutcome::NoOp
                } else {
                    DropOutcome::Inserted {
                        document: next,
                        block: id,
                    }
                }
            }
            (DragList::Steps, DragKind::InsertNew { .. }) => DropOutcome::NoOp,
        }
    }
}

fn reordered(before: &Document, after: Document) -> DropOutcome {
    if after == *before {
        DropOutcome::NoOp
    } else {
        DropOutcome::Reordered(after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BlockKind;
    use crate::reorder::NearestCenter;

    fn three_blocks() -> (Document, StepId) {
        let doc = Document::blank();
        let step = doc.active_step_id().clone();
        let doc = (0..3).fold(doc, |d, _| d.add_block(&step, BlockKind::Text, None, None));
        (doc, step)
    }

    fn active(mut session: DragSession) -> DragSession {
        session.pointer_moved(Point::new(0.0, 100.0), &DistanceActivation::default());
        session
    }

    #[test]
    fn test_activation_threshold() {
        let policy = DistanceActivation { distance: 8.0 };
        let mut session = DragSession::reorder(DragList::Steps, 0, Point::ZERO);

        assert!(!session.pointer_moved(Point::new(3.0, 4.0), &policy));
        assert_eq!(session.phase(), DragPhase::Pending);

        // Hover before activation is ignored
        session.hover(Some(1));
        assert_eq!(session.hovered(), None);

        assert!(session.pointer_moved(Point::new(9.0, 0.0), &policy));
        assert!(session.is_active());
        assert!(!session.pointer_moved(Point::new(20.0, 0.0), &policy));
    }

    #[test]
    fn test_click_without_drag_is_noop() {
        let (doc, step) = three_blocks();
        let mut session = DragSession::reorder(DragList::Blocks(step), 0, Point::ZERO);
        session.hover(Some(2));
        assert_eq!(session.drop_on(&doc), DropOutcome::NoOp);
    }

    #[test]
    fn test_drop_reorders_blocks() {
        let (doc, step) = three_blocks();
        let ids: Vec<_> = doc.active_step().blocks.iter().map(|b| b.id.clone()).collect();

        let mut session = active(DragSession::reorder(DragList::Blocks(step.clone()), 0, Point::ZERO));
        session.hover(Some(2));

        let DropOutcome::Reordered(next) = session.drop_on(&doc) else {
            panic!("expected reorder");
        };
        let moved: Vec<_> = next.step(&step).unwrap().blocks.iter().map(|b| b.id.clone()).collect();
        assert_eq!(moved, vec![ids[1].clone(), ids[2].clone(), ids[0].clone()]);
    }

    #[test]
    fn test_drop_on_self_is_noop() {
        let (doc, step) = three_blocks();
        let mut session = active(DragSession::reorder(DragList::Blocks(step), 1, Point::ZERO));
        session.hover(Some(1));
        assert_eq!(session.drop_on(&doc), DropOutcome::NoOp);
    }

    #[test]
    fn test_drop_outside_is_noop() {
        let (doc, step) = three_blocks();
        let mut session = active(DragSession::reorder(DragList::Blocks(step), 0, Point::ZERO));
        session.hover(Some(2));
        session.hover(None);
        assert_eq!(session.drop_on(&doc), DropOutcome::NoOp);
    }

    #[test]
    fn test_hover_at_uses_resolver() {
        let mut session = active(DragSession::reorder(DragList::Steps, 0, Point::ZERO));
        let items = [Rect::new(0.0, 0.0, 100.0, 40.0), Rect::new(0.0, 50.0, 100.0, 90.0)];
        session.hover_at(Point::new(50.0, 80.0), &items, &NearestCenter);
        assert_eq!(session.hovered(), Some(1));
    }

    #[test]
    fn test_palette_drop_inserts_at_hovered_index() {
        let (doc, step) = three_blocks();
        let block = Block::new(BlockKind::Button);
        let mut session = active(DragSession::insert_new(step.clone(), block, Point::ZERO));
        session.hover(Some(1));

        let DropOutcome::Inserted { document, block } = session.drop_on(&doc) else {
            panic!("expected insert");
        };
        let blocks = &document.step(&step).unwrap().blocks;
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1].id, block);
        assert_eq!(blocks[1].kind, BlockKind::Button);
        assert_eq!(blocks[1].order, 1);
    }

    #[test]
    fn test_reorder_steps_drop() {
        let doc = Document::blank().add_step(None, None);
        let first = doc.step_at(0).unwrap().id.clone();
        let mut session = active(DragSession::reorder(DragList::Steps, 0, Point::ZERO));
        session.hover(Some(1));

        let DropOutcome::Reordered(next) = session.drop_on(&doc) else {
            panic!("expected reorder");
        };
        assert_eq!(next.step_index(&first), Some(1));
    }
}
