//! Bounding shapes and facing direction.
//!
//! Shapes are plain values owned by the actor that positions them. Actors
//! rebuild their shapes from position, direction and scale every time one of
//! those changes; nothing mutates a shape independently.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision;

/// Horizontal facing of a side-view actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Facing towards negative x.
    #[default]
    Left,
    /// Facing towards positive x.
    Right,
}

impl Direction {
    /// Returns -1.0 for left and 1.0 for right.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Returns the opposite direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Direction pointing from `from_x` towards `to_x`.
    ///
    /// Ties resolve to `Left`, matching the `target > self` test used by
    /// every chase rule.
    #[must_use]
    pub fn toward(from_x: f32, to_x: f32) -> Self {
        if to_x > from_x {
            Self::Right
        } else {
            Self::Left
        }
    }
}

/// Axis-aligned bounding rectangle in screen space (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingRectangle {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width, never negative
    pub width: f32,
    /// Height, never negative
    pub height: f32,
}

impl BoundingRectangle {
    /// A zero-sized rectangle at the origin.
    pub const EMPTY: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a rectangle. Negative extents are clamped to zero.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Creates a rectangle from its top-left corner.
    #[must_use]
    pub fn from_position(position: Vec2, width: f32, height: f32) -> Self {
        Self::new(position.x, position.y, width, height)
    }

    /// Left edge.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Checks overlap with another rectangle (touching edges overlap).
    #[must_use]
    pub fn collides_with(&self, other: &BoundingRectangle) -> bool {
        collision::rect_rect(self, other)
    }

    /// Checks overlap with a circle.
    #[must_use]
    pub fn collides_with_circle(&self, circle: &BoundingCircle) -> bool {
        collision::circle_rect(circle, self)
    }
}

/// Bounding circle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingCircle {
    /// Center point
    pub center: Vec2,
    /// Radius
    pub radius: f32,
}

impl BoundingCircle {
    /// Creates a circle.
    #[must_use]
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Checks overlap with another circle.
    #[must_use]
    pub fn collides_with(&self, other: &BoundingCircle) -> bool {
        collision::circle_circle(self, other)
    }

    /// Checks overlap with a rectangle.
    #[must_use]
    pub fn collides_with_rect(&self, rect: &BoundingRectangle) -> bool {
        collision::circle_rect(self, rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = BoundingRectangle::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Vec2::new(25.0, 40.0));
    }

    #[test]
    fn test_rect_negative_extent_clamped() {
        let r = BoundingRectangle::new(0.0, 0.0, -5.0, 3.0);
        assert_eq!(r.width, 0.0);
        assert_eq!(r.height, 3.0);
    }

    #[test]
    fn test_direction_helpers() {
        assert_eq!(Direction::Left.sign(), -1.0);
        assert_eq!(Direction::Right.flipped(), Direction::Left);
        assert_eq!(Direction::toward(0.0, 5.0), Direction::Right);
        assert_eq!(Direction::toward(5.0, 0.0), Direction::Left);
        assert_eq!(Direction::toward(5.0, 5.0), Direction::Left);
    }

    #[test]
    fn test_circle_radius_clamped() {
        let c = BoundingCircle::new(Vec2::ZERO, -1.0);
        assert_eq!(c.radius, 0.0);
    }
}
