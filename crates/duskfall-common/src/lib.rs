//! # Duskfall Common
//!
//! Common types shared by every Duskfall crate.
//!
//! This crate provides:
//! - Bounding shapes (rectangle, circle) and their overlap tests
//! - Facing direction for side-view actors
//! - Entity IDs
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod collision;
pub mod error;
pub mod geometry;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
    pub use glam::Vec2;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
        assert!(!EntityId::NULL.is_valid());
    }

    #[test]
    fn test_prelude_shapes() {
        let rect = BoundingRectangle::new(0.0, 0.0, 10.0, 10.0);
        let circle = BoundingCircle::new(Vec2::new(5.0, 5.0), 2.0);
        assert!(rect.collides_with_circle(&circle));
        assert!(circle.collides_with_rect(&rect));
    }
}
