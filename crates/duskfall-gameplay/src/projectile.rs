//! Arrows fired by ranged enemies.
//!
//! A projectile flies horizontally at a fixed speed, is culled once fully
//! off-screen, and is removed by the combat resolver when it strikes the
//! player. The firing enemy owns its projectiles.

use duskfall_common::{BoundingRectangle, Direction};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::actor::{SpriteRequest, Tint};

/// Kinds of projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Skeleton arrow
    Arrow,
    /// Samurai arrow
    SamuraiArrow,
}

impl ProjectileKind {
    /// Flight speed (px/s).
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Arrow => 800.0,
            Self::SamuraiArrow => 1000.0,
        }
    }

    /// Unscaled sprite size.
    #[must_use]
    pub fn sprite_size(self) -> Vec2 {
        match self {
            Self::Arrow => Vec2::new(24.0, 5.0),
            Self::SamuraiArrow => Vec2::new(32.0, 6.0),
        }
    }

    /// Sprite sheet name.
    #[must_use]
    pub const fn sheet(self) -> &'static str {
        match self {
            Self::Arrow => "arrow_sprite",
            Self::SamuraiArrow => "samurai_arrow",
        }
    }
}

/// Sprite scale shared by all projectiles.
pub const PROJECTILE_SCALE: f32 = 2.0;

/// A flying arrow.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    kind: ProjectileKind,
    position: Vec2,
    direction: Direction,
    bounds: BoundingRectangle,
    removed: bool,
}

impl Projectile {
    /// Spawns a projectile at `position` flying towards `direction`.
    #[must_use]
    pub fn new(kind: ProjectileKind, position: Vec2, direction: Direction) -> Self {
        let mut projectile = Self {
            kind,
            position,
            direction,
            bounds: BoundingRectangle::EMPTY,
            removed: false,
        };
        projectile.update_bounds();
        projectile
    }

    /// Moves the projectile and culls it once it has left the screen.
    pub fn update(&mut self, dt: f32, world_width: f32) {
        if self.removed {
            return;
        }

        self.position.x += self.direction.sign() * self.kind.speed() * dt;
        self.update_bounds();

        if self.position.x > world_width || self.position.x < -self.bounds.width {
            self.removed = true;
        }
    }

    /// Whether the projectile overlaps `target` and is still in flight.
    #[must_use]
    pub fn strikes(&self, target: &BoundingRectangle) -> bool {
        !self.removed && self.bounds.collides_with(target)
    }

    /// Takes the projectile out of play.
    pub fn remove(&mut self) {
        self.removed = true;
    }

    /// Whether the projectile left play.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Kind.
    #[must_use]
    pub fn kind(&self) -> ProjectileKind {
        self.kind
    }

    /// Top-left position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Flight direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Hitbox.
    #[must_use]
    pub fn bounds(&self) -> BoundingRectangle {
        self.bounds
    }

    /// What to draw.
    #[must_use]
    pub fn sprite(&self) -> SpriteRequest {
        SpriteRequest {
            sheet: self.kind.sheet(),
            frame: 0,
            position: self.position,
            scale: PROJECTILE_SCALE,
            flip: self.direction == Direction::Left,
            tint: Tint::White,
            alpha: 1.0,
        }
    }

    fn update_bounds(&mut self) {
        let size = self.kind.sprite_size() * PROJECTILE_SCALE;
        self.bounds = BoundingRectangle::from_position(self.position, size.x, size.y);
    }
}

/// Advances every projectile and drops the removed ones.
pub fn update_volley(projectiles: &mut Vec<Projectile>, dt: f32, world_width: f32) {
    for projectile in projectiles.iter_mut() {
        projectile.update(dt, world_width);
    }
    projectiles.retain(|p| !p.is_removed());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_flies_and_culls() {
        let mut arrow = Projectile::new(ProjectileKind::Arrow, Vec2::new(700.0, 100.0), Direction::Right);
        arrow.update(0.1, 800.0);
        assert!((arrow.position().x - 780.0).abs() < 1e-3);
        assert!(!arrow.is_removed());

        arrow.update(0.1, 800.0);
        assert!(arrow.is_removed());
    }

    #[test]
    fn test_left_flight_culls_past_own_width() {
        let mut arrow =
            Projectile::new(ProjectileKind::SamuraiArrow, Vec2::new(10.0, 0.0), Direction::Left);
        arrow.update(0.05, 800.0);
        assert!((arrow.position().x + 40.0).abs() < 1e-3);
        assert!(!arrow.is_removed());
        arrow.update(0.05, 800.0);
        assert!(arrow.is_removed());
        assert!(arrow.sprite().flip);
    }

    #[test]
    fn test_strike_ignores_removed() {
        let target = BoundingRectangle::new(0.0, 0.0, 100.0, 100.0);
        let mut arrow = Projectile::new(ProjectileKind::Arrow, Vec2::new(10.0, 10.0), Direction::Right);
        assert!(arrow.strikes(&target));
        arrow.remove();
        assert!(!arrow.strikes(&target));
    }

    #[test]
    fn test_update_volley_drops_removed() {
        let mut volley = vec![
            Projectile::new(ProjectileKind::Arrow, Vec2::new(790.0, 0.0), Direction::Right),
            Projectile::new(ProjectileKind::Arrow, Vec2::new(100.0, 0.0), Direction::Right),
        ];
        update_volley(&mut volley, 0.05, 800.0);
        assert_eq!(volley.len(), 1);
    }
}
