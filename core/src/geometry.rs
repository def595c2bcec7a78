//! Axis-aligned geometry and the collision predicates shared by every actor.

use glam::Vec2;

/// Axis-aligned rectangle expressed in world units.
///
/// The origin is the top-left corner; `y` grows downward, matching the tile
/// grid's row order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    origin: Vec2,
    size: Vec2,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Creates a square rectangle from its top-left corner and side length.
    #[must_use]
    pub fn square(origin: Vec2, side: f32) -> Self {
        Self::new(origin, Vec2::splat(side))
    }

    /// Creates a rectangle of the provided size centred on `center`.
    #[must_use]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(center - size * 0.5, size)
    }

    /// Top-left corner of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Width and height of the rectangle.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Bottom-right corner of the rectangle.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    /// Centre point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Returns a copy moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.origin + offset, self.size)
    }

    /// Returns a copy grown by `horizontal` on the left and right edges and
    /// by `vertical` on the top and bottom edges.
    #[must_use]
    pub fn inflated(&self, horizontal: f32, vertical: f32) -> Self {
        let margin = Vec2::new(horizontal, vertical);
        Self::new(self.origin - margin, self.size + margin * 2.0)
    }

    /// Reports whether `other` lies completely inside this rectangle.
    ///
    /// Shared edges count as inside.
    #[must_use]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        let max = self.max();
        let other_max = other.max();
        other.origin.x >= self.origin.x
            && other.origin.y >= self.origin.y
            && other_max.x <= max.x
            && other_max.y <= max.y
    }

    /// Reports whether the rectangle overlaps `other`. See [`rects_overlap`].
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        rects_overlap(self, other)
    }
}

/// Reports whether two rectangles share interior area.
///
/// Comparisons are strict on both axes, so rectangles that merely touch along
/// an edge or a corner do not overlap.
#[must_use]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    let a_max = a.max();
    let b_max = b.max();
    a.origin.x < b_max.x && a_max.x > b.origin.x && a.origin.y < b_max.y && a_max.y > b.origin.y
}

/// Reports whether an actor occupying `future` would intersect any wall or
/// any of the additional obstacle rectangles.
#[must_use]
pub fn would_collide<I>(future: &Rect, walls: &[Rect], others: I) -> bool
where
    I: IntoIterator<Item = Rect>,
{
    walls.iter().any(|wall| rects_overlap(future, wall))
        || others.into_iter().any(|other| rects_overlap(future, &other))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, side: f32) -> Rect {
        Rect::square(Vec2::new(x, y), side)
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let left = square(0.0, 0.0, 10.0);
        let right = square(10.0, 0.0, 10.0);
        let below = square(0.0, 10.0, 10.0);
        let corner = square(10.0, 10.0, 10.0);

        assert!(!rects_overlap(&left, &right));
        assert!(!rects_overlap(&left, &below));
        assert!(!rects_overlap(&left, &corner));
    }

    #[test]
    fn partial_and_nested_rectangles_overlap() {
        let outer = square(0.0, 0.0, 20.0);
        let partial = square(15.0, 15.0, 10.0);
        let nested = square(5.0, 5.0, 2.0);

        assert!(rects_overlap(&outer, &partial));
        assert!(rects_overlap(&partial, &outer));
        assert!(rects_overlap(&outer, &nested));
    }

    #[test]
    fn would_collide_checks_walls_and_other_obstacles() {
        let walls = [square(40.0, 0.0, 40.0)];
        let actor = square(0.0, 0.0, 30.0);
        let enemy = square(20.0, 20.0, 30.0);

        assert!(!would_collide(&actor, &walls, []));
        assert!(would_collide(&actor.translated(Vec2::new(15.0, 0.0)), &walls, []));
        assert!(would_collide(&actor, &walls, [enemy]));
    }

    #[test]
    fn inflated_rectangle_grows_asymmetrically() {
        let rect = square(10.0, 10.0, 10.0).inflated(5.0, 1.0);

        assert_eq!(rect.origin(), Vec2::new(5.0, 9.0));
        assert_eq!(rect.size(), Vec2::new(20.0, 12.0));
        assert_eq!(rect.center(), Vec2::new(15.0, 15.0));
    }

    #[test]
    fn contains_rect_accepts_shared_edges() {
        let bounds = square(0.0, 0.0, 100.0);

        assert!(bounds.contains_rect(&square(70.0, 70.0, 30.0)));
        assert!(!bounds.contains_rect(&square(71.0, 70.0, 30.0)));
        assert!(!bounds.contains_rect(&square(-1.0, 0.0, 30.0)));
    }
}
