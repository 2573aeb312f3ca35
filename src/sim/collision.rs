//! Axis-aligned box overlap and penetration
//!
//! Every mover in the level is a box. Collision is a plain overlap test
//! followed by a minimum-translation choice of separating side; there is no
//! swept or continuous solver, so a fast enough mover can tunnel through a
//! thin platform.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box, `pos` is the top-left corner (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Vertical midpoint
    #[inline]
    pub fn center_y(&self) -> f32 {
        self.pos.y + self.size.y / 2.0
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        intersects(self, other)
    }
}

/// Strict overlap on both axes; boxes that only share an edge do not intersect
#[inline]
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Side of the obstacle a mover is pushed out through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Mover rests on the obstacle's top face
    Top,
    /// Mover is pushed below the obstacle (head hit)
    Bottom,
    /// Mover is pushed out to the obstacle's left
    Left,
    /// Mover is pushed out to the obstacle's right
    Right,
}

/// Overlap depths of a mover into an obstacle, one per exit side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Distance to push the mover left to clear the obstacle
    pub left: f32,
    /// Distance to push the mover right to clear the obstacle
    pub right: f32,
    /// Distance to push the mover up to clear the obstacle
    pub top: f32,
    /// Distance to push the mover down to clear the obstacle
    pub bottom: f32,
}

impl Penetration {
    /// Depths of `mover` into `obstacle`. Only meaningful when they intersect.
    pub fn between(mover: &Rect, obstacle: &Rect) -> Self {
        Self {
            left: mover.right() - obstacle.left(),
            right: obstacle.right() - mover.left(),
            top: mover.bottom() - obstacle.top(),
            bottom: obstacle.bottom() - mover.top(),
        }
    }

    /// Smallest of the four depths
    pub fn min(&self) -> f32 {
        self.left.min(self.right).min(self.top).min(self.bottom)
    }

    /// Whether `side` carries the minimum depth. Ties match every tied side.
    pub fn is_min(&self, side: Side) -> bool {
        let depth = match side {
            Side::Top => self.top,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
            Side::Right => self.right,
        };
        depth == self.min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 32.0, 32.0);
        let right_neighbour = Rect::new(32.0, 0.0, 32.0, 32.0);
        let below = Rect::new(0.0, 32.0, 32.0, 32.0);

        assert!(!intersects(&a, &right_neighbour));
        assert!(!intersects(&a, &below));
    }

    #[test]
    fn test_partial_overlap_intersects() {
        let a = Rect::new(0.0, 0.0, 32.0, 32.0);
        let b = Rect::new(31.0, 31.0, 32.0, 32.0);
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_penetration_landing_is_top() {
        // Player sunk half a pixel into the ground
        let player = Rect::new(100.0, 528.5, 32.0, 32.0);
        let ground = Rect::new(96.0, 560.0, 32.0, 64.0);
        let pen = Penetration::between(&player, &ground);

        assert_eq!(pen.top, 0.5);
        assert!(pen.is_min(Side::Top));
        assert!(!pen.is_min(Side::Left));
    }

    #[test]
    fn test_penetration_wall_is_left() {
        // Player walked 3px into a pipe from the left
        let player = Rect::new(2051.0, 450.0, 32.0, 32.0);
        let pipe = Rect::new(2080.0, 420.0, 64.0, 144.0);
        let pen = Penetration::between(&player, &pipe);

        assert_eq!(pen.left, 3.0);
        assert!(pen.is_min(Side::Left));
    }

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (-500.0f32..500.0, -500.0f32..500.0, 1.0f32..200.0, 1.0f32..200.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_intersects_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
            prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
        }

        #[test]
        fn prop_box_shifted_by_its_width_never_intersects(a in rect_strategy()) {
            let beside = Rect { pos: a.pos + Vec2::new(a.size.x, 0.0), size: a.size };
            prop_assert!(!intersects(&a, &beside));
        }

        #[test]
        fn prop_overlapping_boxes_have_positive_penetration(
            a in rect_strategy(),
            b in rect_strategy(),
        ) {
            if intersects(&a, &b) {
                prop_assert!(Penetration::between(&a, &b).min() > 0.0);
            }
        }
    }
}
