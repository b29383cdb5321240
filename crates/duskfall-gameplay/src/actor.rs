//! Combat actor capability set and shared actor plumbing.
//!
//! This module provides:
//! - [`CombatActor`]: the operations every enemy exposes to the orchestrator
//!   and the combat resolver
//! - [`PlayerView`]: the read-only player query enemies steer by
//! - [`TickContext`]: everything an actor may read or report during `update`
//! - [`ActorBody`]: position, facing, health and derived bounds
//! - Hurt flash, after-image trail and sprite requests for the renderer

use duskfall_common::{BoundingRectangle, Direction};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::WorldBounds;
use crate::effects::EffectsSink;
use crate::enemies::{EnemyKind, EnemyState};
use crate::projectile::Projectile;
use crate::snapshot::EnemySnapshot;

// ============================================================================
// Player query
// ============================================================================

/// Read-only view of the player that enemies steer by.
pub trait PlayerView {
    /// Top-left sprite position.
    fn position(&self) -> Vec2;
    /// Hurtbox.
    fn bounds(&self) -> BoundingRectangle;
    /// Whether the player is dead.
    fn is_dead(&self) -> bool;
}

/// Player state captured at the start of a tick.
///
/// Enemies read this copy rather than the live player so that every actor
/// sees the same positions regardless of update order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSample {
    /// Top-left sprite position
    pub position: Vec2,
    /// Hurtbox
    pub bounds: BoundingRectangle,
    /// Dead flag
    pub dead: bool,
}

impl PlayerSample {
    /// Captures any player view.
    #[must_use]
    pub fn capture(player: &dyn PlayerView) -> Self {
        Self {
            position: player.position(),
            bounds: player.bounds(),
            dead: player.is_dead(),
        }
    }
}

impl PlayerView for PlayerSample {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn bounds(&self) -> BoundingRectangle {
        self.bounds
    }

    fn is_dead(&self) -> bool {
        self.dead
    }
}

// ============================================================================
// Tick context
// ============================================================================

/// Inputs and services available to an actor during one update.
pub struct TickContext<'a> {
    /// The player, if one is present in the scene
    pub player: Option<&'a dyn PlayerView>,
    /// Playfield dimensions
    pub world: &'a WorldBounds,
    /// Cosmetic side effects
    pub effects: &'a mut dyn EffectsSink,
    /// Shared random source
    pub rng: &'a mut fastrand::Rng,
}

impl<'a> TickContext<'a> {
    /// Creates a context.
    pub fn new(
        player: Option<&'a dyn PlayerView>,
        world: &'a WorldBounds,
        effects: &'a mut dyn EffectsSink,
        rng: &'a mut fastrand::Rng,
    ) -> Self {
        Self {
            player,
            world,
            effects,
            rng,
        }
    }

    /// The player if present and alive.
    #[must_use]
    pub fn live_player(&self) -> Option<&'a dyn PlayerView> {
        self.player.filter(|p| !p.is_dead())
    }
}

// ============================================================================
// Damage
// ============================================================================

/// How an actor responded to an incoming hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// No effect: dead, invulnerable, or in a non-damageable window.
    Ignored,
    /// Health dropped but the current action continues.
    Absorbed,
    /// Health dropped and the actor was forced into its Hurt state.
    Hurt,
    /// Health dropped and the actor answered with an immediate attack.
    Countered,
    /// Health dropped and the actor was forced into a defensive state.
    Defended,
    /// Health reached zero.
    Killed,
}

impl DamageOutcome {
    /// Whether health changed.
    #[must_use]
    pub fn landed(self) -> bool {
        self != Self::Ignored
    }
}

// ============================================================================
// Capability set
// ============================================================================

/// Operations shared by every enemy type.
///
/// State changes go through each type's own `set_state`, which is typed by
/// that enemy's state enum; this trait carries the type-erased surface used
/// by orchestration and combat resolution.
pub trait CombatActor {
    /// Which enemy this is.
    fn kind(&self) -> EnemyKind;

    /// Advances timers, behavior, animation, bounds and hitbox flag.
    /// No-op once removed.
    fn update(&mut self, dt: f32, ctx: &mut TickContext<'_>);

    /// Applies an incoming hit. `source` is the attacker's hurtbox center.
    fn take_damage(
        &mut self,
        amount: i32,
        source: Option<Vec2>,
        effects: &mut dyn EffectsSink,
    ) -> DamageOutcome;

    /// Places the actor at `start` and scripts an entrance to `target`.
    fn walk_in(&mut self, start: Vec2, target: Vec2);

    /// Hurtbox.
    fn bounds(&self) -> BoundingRectangle;

    /// Melee hitbox in front of the actor.
    fn attack_box(&self) -> BoundingRectangle;

    /// Whether the melee hitbox is live this tick.
    fn is_attack_hitbox_active(&self) -> bool;

    /// Top-left sprite position.
    fn position(&self) -> Vec2;

    /// Facing.
    fn direction(&self) -> Direction;

    /// Remaining health.
    fn health(&self) -> i32;

    /// Current state as a type-erased tag.
    fn state(&self) -> EnemyState;

    /// Whether the actor is in its terminal Dead state.
    fn is_dead(&self) -> bool {
        self.state().is_dead()
    }

    /// Whether the death animation completed. Terminal.
    fn is_removed(&self) -> bool;

    /// What to draw this frame.
    fn sprite(&self) -> SpriteRequest;

    /// Fading trail snapshots.
    fn after_images(&self) -> &[AfterImage] {
        &[]
    }

    /// Projectiles owned by this actor.
    fn projectiles(&self) -> &[Projectile] {
        &[]
    }

    /// Mutable access to owned projectiles.
    fn projectiles_mut(&mut self) -> &mut [Projectile] {
        &mut []
    }

    /// Exports the persisted tuple.
    fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            kind: self.kind(),
            position: self.position(),
            health: self.health(),
            direction: self.direction(),
            state: self.state(),
            removed: self.is_removed(),
        }
    }
}

// ============================================================================
// Body
// ============================================================================

/// Position, facing, health and the hurtbox derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorBody {
    position: Vec2,
    direction: Direction,
    /// Remaining health
    pub health: i32,
    scale: f32,
    frame_size: Vec2,
    hurtbox_ratio: Vec2,
    bounds: BoundingRectangle,
    removed: bool,
}

impl ActorBody {
    /// Creates a body.
    ///
    /// `frame_size` is the unscaled sprite cell; `hurtbox_ratio` is the
    /// fraction of the scaled cell covered by the hurtbox, which sits
    /// horizontally centered on the bottom edge of the cell.
    #[must_use]
    pub fn new(health: i32, scale: f32, frame_size: Vec2, hurtbox_ratio: Vec2) -> Self {
        let mut body = Self {
            position: Vec2::ZERO,
            direction: Direction::Left,
            health,
            scale,
            frame_size,
            hurtbox_ratio,
            bounds: BoundingRectangle::EMPTY,
            removed: false,
        };
        body.recompute_bounds();
        body
    }

    /// Top-left sprite position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the body and rebuilds the hurtbox.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.recompute_bounds();
    }

    /// Shifts along x and rebuilds the hurtbox.
    pub fn translate_x(&mut self, dx: f32) {
        self.position.x += dx;
        self.recompute_bounds();
    }

    /// Facing.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Changes facing.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        self.recompute_bounds();
    }

    /// Sprite scale.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Scaled sprite width.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.frame_size.x * self.scale
    }

    /// Scaled sprite height.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.frame_size.y * self.scale
    }

    /// Hurtbox.
    #[must_use]
    pub fn bounds(&self) -> BoundingRectangle {
        self.bounds
    }

    /// Whether the actor has been removed.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Marks the actor removed. There is no way back.
    pub fn mark_removed(&mut self) {
        self.removed = true;
    }

    /// Keeps the sprite inside `[0, world_width - width]`.
    /// Returns true if the position was clamped.
    pub fn clamp_to_world(&mut self, world_width: f32) -> bool {
        let max_x = (world_width - self.width()).max(0.0);
        let clamped = self.position.x.clamp(0.0, max_x);
        if clamped == self.position.x {
            return false;
        }
        self.position.x = clamped;
        self.recompute_bounds();
        true
    }

    /// Horizontal distance between hurtbox centers.
    #[must_use]
    pub fn horizontal_gap_to(&self, other: &BoundingRectangle) -> f32 {
        (other.center().x - self.bounds.center().x).abs()
    }

    fn recompute_bounds(&mut self) {
        let box_width = self.width() * self.hurtbox_ratio.x;
        let box_height = self.height() * self.hurtbox_ratio.y;
        let x_offset = (self.width() - box_width) / 2.0;
        let y_offset = self.height() - box_height;
        self.bounds = BoundingRectangle::new(
            self.position.x + x_offset,
            self.position.y + y_offset,
            box_width,
            box_height,
        );
    }
}

// ============================================================================
// Rendering requests
// ============================================================================

/// Color multiplier requested from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tint {
    /// No tint
    #[default]
    White,
    /// Damage flash
    Red,
    /// After-image
    Cyan,
    /// After-image
    Magenta,
    /// After-image
    Yellow,
}

/// One sprite draw call, opaque to everything but the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteRequest {
    /// Sprite sheet identifier
    pub sheet: &'static str,
    /// Frame index along the strip
    pub frame: usize,
    /// Top-left position
    pub position: Vec2,
    /// Uniform scale
    pub scale: f32,
    /// Mirror horizontally
    pub flip: bool,
    /// Color multiplier
    pub tint: Tint,
    /// Opacity
    pub alpha: f32,
}

/// Alternating red/white flash after taking damage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HurtFlash {
    remaining: f32,
    white_phase: bool,
    tint: Tint,
}

impl HurtFlash {
    /// Starts (or restarts) the flash.
    pub fn trigger(&mut self, duration: f32) {
        self.remaining = duration;
        self.white_phase = true;
    }

    /// Advances the flash by one tick.
    pub fn tick(&mut self, dt: f32) {
        if self.remaining <= 0.0 {
            return;
        }
        self.remaining -= dt;
        self.tint = if self.white_phase { Tint::White } else { Tint::Red };
        self.white_phase = !self.white_phase;
        if self.remaining <= 0.0 {
            self.tint = Tint::White;
        }
    }

    /// Whether the flash is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Current tint.
    #[must_use]
    pub fn tint(&self) -> Tint {
        self.tint
    }
}

/// A fading copy of the sprite left behind during fast movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AfterImage {
    /// Where the sprite was
    pub position: Vec2,
    /// Frame shown at the time
    pub frame: usize,
    /// Mirror flag at the time
    pub flip: bool,
    /// Trail color
    pub tint: Tint,
    /// Remaining opacity
    pub alpha: f32,
}

/// Spawns after-images at a fixed interval and fades them out.
#[derive(Debug, Clone, PartialEq)]
pub struct AfterImageTrail {
    images: Vec<AfterImage>,
    interval: f32,
    timer: f32,
}

impl AfterImageTrail {
    /// Starting opacity of a new image.
    pub const START_ALPHA: f32 = 0.5;
    /// Opacity lost per second.
    pub const FADE_RATE: f32 = 2.0;

    /// Creates an empty trail emitting every `interval` seconds.
    #[must_use]
    pub fn new(interval: f32) -> Self {
        Self {
            images: Vec::new(),
            interval,
            timer: 0.0,
        }
    }

    /// Drops every image.
    pub fn clear(&mut self) {
        self.images.clear();
    }

    /// Counts down and, when due, records a new image tinted by `tint`.
    pub fn emit(
        &mut self,
        dt: f32,
        position: Vec2,
        frame: usize,
        flip: bool,
        tint: impl FnOnce() -> Tint,
    ) {
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.timer = self.interval;
            self.images.push(AfterImage {
                position,
                frame,
                flip,
                tint: tint(),
                alpha: Self::START_ALPHA,
            });
        }
    }

    /// Fades every image and drops the invisible ones.
    pub fn fade(&mut self, dt: f32) {
        for image in &mut self.images {
            image.alpha -= dt * Self::FADE_RATE;
        }
        self.images.retain(|image| image.alpha > 0.0);
    }

    /// Visible images, oldest first.
    #[must_use]
    pub fn images(&self) -> &[AfterImage] {
        &self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> ActorBody {
        ActorBody::new(3, 2.0, Vec2::new(96.0, 96.0), Vec2::new(0.4, 0.7))
    }

    #[test]
    fn test_body_bounds_follow_position() {
        let mut b = body();
        b.set_position(Vec2::new(100.0, 50.0));

        let bounds = b.bounds();
        assert!((bounds.width - 76.8).abs() < 1e-4);
        assert!((bounds.height - 134.4).abs() < 1e-4);
        assert!((bounds.x - (100.0 + (192.0 - 76.8) / 2.0)).abs() < 1e-4);
        assert!((bounds.bottom() - (50.0 + 192.0)).abs() < 1e-4);
    }

    #[test]
    fn test_body_clamp() {
        let mut b = body();
        b.set_position(Vec2::new(-10.0, 0.0));
        assert!(b.clamp_to_world(800.0));
        assert_eq!(b.position().x, 0.0);

        b.set_position(Vec2::new(700.0, 0.0));
        assert!(b.clamp_to_world(800.0));
        assert_eq!(b.position().x, 800.0 - 192.0);

        assert!(!b.clamp_to_world(800.0));
    }

    #[test]
    fn test_hurt_flash_alternates_then_resets() {
        let mut flash = HurtFlash::default();
        flash.trigger(0.2);
        flash.tick(0.05);
        assert_eq!(flash.tint(), Tint::White);
        flash.tick(0.05);
        assert_eq!(flash.tint(), Tint::Red);
        flash.tick(0.05);
        assert_eq!(flash.tint(), Tint::White);
        flash.tick(0.1);
        assert!(!flash.is_active());
        assert_eq!(flash.tint(), Tint::White);
    }

    #[test]
    fn test_after_image_trail_emits_and_fades() {
        let mut trail = AfterImageTrail::new(0.05);
        trail.emit(0.01, Vec2::ZERO, 0, false, || Tint::Red);
        assert_eq!(trail.images().len(), 1);
        trail.emit(0.01, Vec2::ZERO, 1, false, || Tint::Red);
        assert_eq!(trail.images().len(), 1);

        trail.fade(0.1);
        assert!((trail.images()[0].alpha - 0.3).abs() < 1e-6);
        trail.fade(0.2);
        assert!(trail.images().is_empty());
    }

    #[test]
    fn test_player_sample_captures_view() {
        let sample = PlayerSample {
            position: Vec2::new(1.0, 2.0),
            bounds: BoundingRectangle::new(0.0, 0.0, 4.0, 4.0),
            dead: false,
        };
        let copy = PlayerSample::capture(&sample);
        assert_eq!(copy, sample);
    }

    #[test]
    fn test_damage_outcome_landed() {
        assert!(!DamageOutcome::Ignored.landed());
        assert!(DamageOutcome::Absorbed.landed());
        assert!(DamageOutcome::Killed.landed());
    }
}
