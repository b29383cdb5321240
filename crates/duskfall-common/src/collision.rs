//! Pairwise overlap tests.
//!
//! - Rect/rect is the negation of four separating-axis tests using strict
//!   `<`/`>`, so rectangles that only share an edge count as overlapping.
//! - Circle/circle and circle/rect use strict `<`, so tangent shapes do not.

use crate::geometry::{BoundingCircle, BoundingRectangle};

/// Rectangle/rectangle overlap.
#[must_use]
pub fn rect_rect(a: &BoundingRectangle, b: &BoundingRectangle) -> bool {
    !(a.right() < b.left() || a.left() > b.right() || a.top() > b.bottom() || a.bottom() < b.top())
}

/// Circle/circle overlap: center distance strictly below the radius sum.
#[must_use]
pub fn circle_circle(a: &BoundingCircle, b: &BoundingCircle) -> bool {
    a.center.distance(b.center) < a.radius + b.radius
}

/// Circle/rectangle overlap via the closest point of the rectangle.
#[must_use]
pub fn circle_rect(c: &BoundingCircle, r: &BoundingRectangle) -> bool {
    let closest_x = c.center.x.clamp(r.left(), r.right());
    let closest_y = c.center.y.clamp(r.top(), r.bottom());

    let dx = c.center.x - closest_x;
    let dy = c.center.y - closest_y;

    dx * dx + dy * dy < c.radius * c.radius
}
