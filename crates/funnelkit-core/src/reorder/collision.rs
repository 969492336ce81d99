//! Collision resolvers: map a pointer position onto the hovered list slot.

use kurbo::{Point, Rect};

/// Decides which rendered item the pointer is over.
///
/// `items` holds the on-screen bounds of the list items in list order; the
/// returned value is an index into that slice.
pub trait CollisionResolver {
    fn resolve(&self, pointer: Point, items: &[Rect]) -> Option<usize>;
}

/// Picks the item whose center is closest to the pointer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestCenter;

impl CollisionResolver for NearestCenter {
    fn resolve(&self, pointer: Point, items: &[Rect]) -> Option<usize> {
        closest_by(items, |rect| pointer.distance(rect.center()))
    }
}

/// Picks the item whose four corners are, summed, closest to the pointer.
/// Favors the item the pointer is inside over a small neighbor whose center
/// happens to be near.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestCorner;

impl CollisionResolver for NearestCorner {
    fn resolve(&self, pointer: Point, items: &[Rect]) -> Option<usize> {
        closest_by(items, |rect| {
            [
                Point::new(rect.x0, rect.y0),
                Point::new(rect.x1, rect.y0),
                Point::new(rect.x0, rect.y1),
                Point::new(rect.x1, rect.y1),
            ]
            .iter()
            .map(|corner| pointer.distance(*corner))
            .sum()
        })
    }
}

/// Picks the first item containing the pointer, or nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerWithin;

impl CollisionResolver for PointerWithin {
    fn resolve(&self, pointer: Point, items: &[Rect]) -> Option<usize> {
        items.iter().position(|rect| rect.contains(pointer))
    }
}

fn closest_by(items: &[Rect], metric: impl Fn(&Rect) -> f64) -> Option<usize> {
    items
        .iter()
        .map(metric)
        .enumerate()
        .filter(|(_, d)| d.is_finite())
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}
