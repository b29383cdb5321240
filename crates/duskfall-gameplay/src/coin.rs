//! Falling coins of the ordinary cycle.

use duskfall_common::{BoundingCircle, BoundingRectangle};
use glam::Vec2;

use crate::actor::{SpriteRequest, Tint};
use crate::animation::{AnimationClip, AnimationClock};
use crate::config::WorldBounds;

const FRAME_SIZE: f32 = 64.0;
const SCALE: f32 = 0.75;
/// Fall speed (px/s).
pub const FALL_SPEED: f32 = 100.0;
const SPIN: AnimationClip = AnimationClip::looping("coin-64x64", 25, 0.03);

/// A coin dropping from above the screen.
#[derive(Debug, Clone)]
pub struct Coin {
    position: Vec2,
    bounds: BoundingCircle,
    clock: AnimationClock,
}

impl Coin {
    /// Creates a coin with its sprite's top-left corner at `position`.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        let radius = FRAME_SIZE * SCALE / 2.0;
        Self {
            position,
            bounds: BoundingCircle::new(position + Vec2::splat(radius), radius),
            clock: AnimationClock::new(SPIN),
        }
    }

    /// Drops a coin at a random x just above the screen.
    pub fn spawn(world: &WorldBounds, rng: &mut fastrand::Rng) -> Self {
        let span = (world.width - FRAME_SIZE).max(0.0);
        Self::new(Vec2::new(rng.f32() * span, -FRAME_SIZE))
    }

    /// Falls and spins.
    pub fn update(&mut self, dt: f32) {
        self.clock.advance(dt);
        self.position.y += FALL_SPEED * dt;
        self.bounds.center = self.position + Vec2::splat(self.bounds.radius);
    }

    /// Whether the coin overlaps `rect`.
    #[must_use]
    pub fn touches(&self, rect: &BoundingRectangle) -> bool {
        self.bounds.collides_with_rect(rect)
    }

    /// Whether the coin fell past the bottom of the world.
    #[must_use]
    pub fn is_below(&self, world: &WorldBounds) -> bool {
        self.position.y > world.height
    }

    /// Top-left sprite position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Pickup circle.
    #[must_use]
    pub fn bounds(&self) -> BoundingCircle {
        self.bounds
    }

    /// What to draw.
    #[must_use]
    pub fn sprite(&self) -> SpriteRequest {
        SpriteRequest {
            sheet: SPIN.sheet,
            frame: self.clock.display_frame(),
            position: self.position,
            scale: SCALE,
            flip: false,
            tint: Tint::White,
            alpha: 1.0,
        }
    }
}
