//! Axis-aligned geometry primitives.
//!
//! Everything collision-related in the crate is built on [`intersects`] plus
//! the single-axis push-out helpers below. Coordinates are world units with
//! `y` growing downward (screen convention): a body's *bottom* is `y + h`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A 2D vector, used for velocities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component (positive is downward).
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Construct a vector from its components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Rect {
    /// Construct a rectangle from its top-left corner and size.
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Horizontal center.
    #[inline]
    pub fn center_x(&self) -> f64 {
        self.x + self.w * 0.5
    }

    /// Return a copy moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Whether every field is finite and the size is strictly positive.
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.w.is_finite()
            && self.h.is_finite()
            && self.w > 0.0
            && self.h > 0.0
    }
}

/// Standard AABB overlap test.
///
/// Strict on every edge: rectangles that merely touch do not overlap. This is
/// what lets a body rest exactly on a platform top without re-colliding.
#[inline]
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

// ---------------------------------------------------------------------------
// Push-out helpers
// ---------------------------------------------------------------------------
//
// Each returns `moving_edge - static_edge`; a positive value is the distance
// the moving rect must be pushed back along that axis.

/// Penetration of `moving`'s bottom edge past `fixed`'s top edge.
#[inline]
pub fn overlap_down(moving: &Rect, fixed: &Rect) -> f64 {
    moving.bottom() - fixed.top()
}

/// Penetration of `moving`'s top edge past `fixed`'s bottom edge.
#[inline]
pub fn overlap_up(moving: &Rect, fixed: &Rect) -> f64 {
    fixed.bottom() - moving.top()
}

/// Penetration of `moving`'s right edge past `fixed`'s left edge.
#[inline]
pub fn overlap_right(moving: &Rect, fixed: &Rect) -> f64 {
    moving.right() - fixed.left()
}

/// Penetration of `moving`'s left edge past `fixed`'s right edge.
#[inline]
pub fn overlap_left(moving: &Rect, fixed: &Rect) -> f64 {
    fixed.right() - moving.left()
}

// ---------------------------------------------------------------------------
// Span
// ---------------------------------------------------------------------------

/// A closed horizontal interval, used for patrol and world bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `min < max` and both ends are finite.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }

    /// Clamp `v` into the span.
    pub fn clamp(&self, v: f64) -> f64 {
        v.max(self.min).min(self.max)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(intersects(&a, &b));
        assert!(intersects(&b, &a));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!intersects(&a, &right));
        assert!(!intersects(&a, &below));
    }

    #[test]
    fn contained_rect_intersects() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 2.0, 2.0);
        assert!(intersects(&outer, &inner));
    }

    #[test]
    fn push_out_values_are_signed_for_push_back() {
        let tile = Rect::new(0.0, 100.0, 50.0, 50.0);
        let falling = Rect::new(10.0, 60.0, 20.0, 45.0); // bottom 105
        assert_eq!(overlap_down(&falling, &tile), 5.0);

        let rising = Rect::new(10.0, 147.0, 20.0, 20.0); // top 147, tile bottom 150
        assert_eq!(overlap_up(&rising, &tile), 3.0);

        let moving_right = Rect::new(-8.0, 110.0, 10.0, 10.0); // right 2
        assert_eq!(overlap_right(&moving_right, &tile), 2.0);

        let moving_left = Rect::new(46.0, 110.0, 10.0, 10.0); // left 46, tile right 50
        assert_eq!(overlap_left(&moving_left, &tile), 4.0);
    }

    #[test]
    fn well_formed_rejects_nan_and_negative_size() {
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_well_formed());
        assert!(!Rect::new(f64::NAN, 0.0, 1.0, 1.0).is_well_formed());
        assert!(!Rect::new(0.0, 0.0, -1.0, 1.0).is_well_formed());
        assert!(!Rect::new(0.0, 0.0, 1.0, 0.0).is_well_formed());
    }

    #[test]
    fn span_clamps() {
        let span = Span::new(0.0, 10.0);
        assert_eq!(span.clamp(-5.0), 0.0);
        assert_eq!(span.clamp(5.0), 5.0);
        assert_eq!(span.clamp(50.0), 10.0);
        assert!(!Span::new(3.0, 3.0).is_valid());
    }
}
