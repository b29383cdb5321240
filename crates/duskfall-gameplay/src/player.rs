//! Reference player combatant.
//!
//! Input polling stays with the host: each tick it hands the player a
//! [`PlayerInput`]. The player is the only writer of its own state; enemies
//! and the combat resolver go through [`PlayerCombatant::take_damage`].

use duskfall_common::{BoundingRectangle, Direction};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::actor::{ActorBody, DamageOutcome, HurtFlash, PlayerView, SpriteRequest};
use crate::animation::{AnimationClip, AnimationClock};
use crate::config::WorldBounds;
use crate::effects::{EffectsSink, SoundCue};

/// Unscaled sprite cell.
const FRAME_SIZE: f32 = 128.0;
/// Sprite scale.
const SCALE: f32 = 2.0;
/// Horizontal run speed (px/s).
pub const RUN_SPEED: f32 = 200.0;
/// Roll length (s).
pub const ROLL_DURATION: f32 = 0.5;
/// Swing length (s).
pub const ATTACK_DURATION: f32 = 0.4;
/// Hurt stagger length (s).
pub const HURT_DURATION: f32 = 0.3;
/// Post-hit grace window (s).
pub const GRACE_DURATION: f32 = 1.0;
/// Knockback speed while staggered (px/s).
pub const KNOCKBACK_SPEED: f32 = 300.0;
/// Damage flash length (s).
const FLASH_DURATION: f32 = 0.2;
/// Reach of a swing beyond the hurtbox edge, unscaled.
const SWING_REACH: f32 = 40.0;

const IDLE: AnimationClip = AnimationClip::looping("Stop_Running", 5, 0.1);
const RUNNING: AnimationClip = AnimationClip::looping("Running", 12, 0.1);
const ATTACKING: AnimationClip = AnimationClip::once("player_attack", 4, 0.1);
const ROLLING: AnimationClip = AnimationClip::once("player_roll", 5, 0.1);
const HURT: AnimationClip = AnimationClip::once("player_hurt", 3, 0.1);
const DEAD: AnimationClip = AnimationClip::once("player_dead", 4, 0.15);

/// Player behavioral modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// Standing still
    Idle,
    /// Moving along the ground
    Running,
    /// Swinging
    Attacking,
    /// Invulnerable dodge roll
    Rolling,
    /// Knocked back after a hit
    Hurt,
    /// Terminal
    Dead,
}

impl PlayerState {
    fn clip(self) -> AnimationClip {
        match self {
            Self::Idle => IDLE,
            Self::Running => RUNNING,
            Self::Attacking => ATTACKING,
            Self::Rolling => ROLLING,
            Self::Hurt => HURT,
            Self::Dead => DEAD,
        }
    }

    /// Whether new actions may start from this state.
    #[must_use]
    pub fn accepts_actions(self) -> bool {
        matches!(self, Self::Idle | Self::Running)
    }
}

/// One tick of player intent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Horizontal axis in `[-1, 1]`
    pub move_x: f32,
    /// Start a swing
    pub attack: bool,
    /// Start a roll
    pub roll: bool,
}

impl PlayerInput {
    /// No input.
    pub const NONE: Self = Self {
        move_x: 0.0,
        attack: false,
        roll: false,
    };

    /// Walk in a direction.
    #[must_use]
    pub fn walk(direction: Direction) -> Self {
        Self {
            move_x: direction.sign(),
            ..Self::NONE
        }
    }
}

/// What the combat resolver needs from the player.
pub trait PlayerCombatant: PlayerView {
    /// Melee hitbox in front of the player.
    fn attack_box(&self) -> BoundingRectangle;

    /// Whether the swing hitbox is live.
    fn is_attack_hitbox_active(&self) -> bool;

    /// Whether incoming damage is currently suppressed.
    fn is_invulnerable(&self) -> bool;

    /// Applies a hit pushing the player towards `knockback`.
    fn take_damage(
        &mut self,
        amount: i32,
        knockback: Direction,
        effects: &mut dyn EffectsSink,
    ) -> DamageOutcome;
}

/// The player.
#[derive(Debug, Clone)]
pub struct Player {
    body: ActorBody,
    state: PlayerState,
    clock: AnimationClock,
    state_timer: f32,
    grace_timer: f32,
    knockback: f32,
    flash: HurtFlash,
}

impl Player {
    /// Creates a player standing at the center of `world`.
    #[must_use]
    pub fn new(health: i32, world: &WorldBounds) -> Self {
        let mut body = ActorBody::new(
            health,
            SCALE,
            Vec2::splat(FRAME_SIZE),
            Vec2::new(0.35, 0.6),
        );
        body.set_direction(Direction::Right);
        let x = world.center_x() - body.width() / 2.0;
        body.set_position(Vec2::new(x, world.standing_y(body.height())));

        Self {
            body,
            state: PlayerState::Idle,
            clock: AnimationClock::new(IDLE),
            state_timer: 0.0,
            grace_timer: 0.0,
            knockback: 0.0,
            flash: HurtFlash::default(),
        }
    }

    /// Places the player; y is pinned to the ground.
    pub fn set_x(&mut self, x: f32, world: &WorldBounds) {
        let y = world.standing_y(self.body.height());
        self.body.set_position(Vec2::new(x, y));
        self.body.clamp_to_world(world.width);
    }

    /// Restores health, e.g. from a save.
    pub fn set_health(&mut self, health: i32) {
        self.body.health = health;
        if health <= 0 {
            self.set_state(PlayerState::Dead);
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Remaining health.
    #[must_use]
    pub fn health(&self) -> i32 {
        self.body.health
    }

    /// Facing.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.body.direction()
    }

    /// Scaled sprite width.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.body.width()
    }

    /// Changes state. Dead is terminal; re-entering the same state is a no-op.
    pub fn set_state(&mut self, state: PlayerState) -> bool {
        if self.state == PlayerState::Dead || self.state == state {
            return false;
        }
        trace!("Player {:?} -> {:?}", self.state, state);

        self.state = state;
        self.clock.play(state.clip());
        self.state_timer = match state {
            PlayerState::Attacking => ATTACK_DURATION,
            PlayerState::Rolling => ROLL_DURATION,
            PlayerState::Hurt => HURT_DURATION,
            _ => 0.0,
        };
        if state != PlayerState::Hurt {
            self.knockback = 0.0;
        }
        true
    }

    /// Advances one tick.
    pub fn update(
        &mut self,
        dt: f32,
        input: PlayerInput,
        world: &WorldBounds,
        effects: &mut dyn EffectsSink,
    ) {
        self.flash.tick(dt);
        if self.grace_timer > 0.0 {
            self.grace_timer -= dt;
        }

        if self.state.accepts_actions() {
            self.handle_input(input, effects);
        }

        match self.state {
            PlayerState::Idle | PlayerState::Dead => {},
            PlayerState::Running => {
                self.body.translate_x(input.move_x.clamp(-1.0, 1.0) * RUN_SPEED * dt);
            },
            PlayerState::Rolling => {
                self.body.translate_x(self.body.direction().sign() * RUN_SPEED * dt);
                self.count_down(dt);
            },
            PlayerState::Hurt => {
                self.body.translate_x(self.knockback * dt);
                self.count_down(dt);
            },
            PlayerState::Attacking => self.count_down(dt),
        }

        self.clock.advance(dt);

        let y = world.standing_y(self.body.height());
        let x = self.body.position().x;
        self.body.set_position(Vec2::new(x, y));
        self.body.clamp_to_world(world.width);
    }

    fn handle_input(&mut self, input: PlayerInput, effects: &mut dyn EffectsSink) {
        if input.move_x != 0.0 {
            let facing = if input.move_x > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            };
            self.body.set_direction(facing);
        }

        if input.roll {
            self.set_state(PlayerState::Rolling);
        } else if input.attack {
            self.set_state(PlayerState::Attacking);
            effects.play_sound(SoundCue::PlayerSwing);
        } else if input.move_x != 0.0 {
            self.set_state(PlayerState::Running);
        } else {
            self.set_state(PlayerState::Idle);
        }
    }

    fn count_down(&mut self, dt: f32) {
        self.state_timer -= dt;
        if self.state_timer <= 0.0 {
            self.set_state(PlayerState::Idle);
        }
    }

    /// What to draw.
    #[must_use]
    pub fn sprite(&self) -> SpriteRequest {
        SpriteRequest {
            sheet: self.clock.clip().sheet,
            frame: self.clock.display_frame(),
            position: self.body.position(),
            scale: self.body.scale(),
            flip: self.body.direction() == Direction::Left,
            tint: self.flash.tint(),
            alpha: 1.0,
        }
    }
}

impl PlayerView for Player {
    fn position(&self) -> Vec2 {
        self.body.position()
    }

    fn bounds(&self) -> BoundingRectangle {
        self.body.bounds()
    }

    fn is_dead(&self) -> bool {
        self.state == PlayerState::Dead
    }
}

impl PlayerCombatant for Player {
    fn attack_box(&self) -> BoundingRectangle {
        let bounds = self.body.bounds();
        let reach = SWING_REACH * self.body.scale();
        let x = match self.body.direction() {
            Direction::Right => bounds.right(),
            Direction::Left => bounds.left() - reach,
        };
        BoundingRectangle::new(x, bounds.top(), reach, bounds.height)
    }

    fn is_attack_hitbox_active(&self) -> bool {
        self.state == PlayerState::Attacking && self.clock.display_frame() >= 1
    }

    fn is_invulnerable(&self) -> bool {
        self.state == PlayerState::Rolling || self.grace_timer > 0.0
    }

    fn take_damage(
        &mut self,
        amount: i32,
        knockback: Direction,
        effects: &mut dyn EffectsSink,
    ) -> DamageOutcome {
        if self.state == PlayerState::Dead || self.is_invulnerable() {
            return DamageOutcome::Ignored;
        }

        self.body.health -= amount;
        self.flash.trigger(FLASH_DURATION);
        effects.play_sound(SoundCue::PlayerHurt);
        debug!("Player hit for {amount}, health {}", self.body.health);

        if self.body.health <= 0 {
            self.set_state(PlayerState::Dead);
            return DamageOutcome::Killed;
        }

        self.grace_timer = GRACE_DURATION;
        // Re-enter Hurt even if already staggered
        self.state = PlayerState::Idle;
        self.set_state(PlayerState::Hurt);
        self.knockback = knockback.sign() * KNOCKBACK_SPEED;
        DamageOutcome::Hurt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectLog, NullEffects};

    fn player() -> (Player, WorldBounds) {
        let world = WorldBounds::default();
        (Player::new(3, &world), world)
    }

    #[test]
    fn test_player_stands_on_ground() {
        let (p, world) = player();
        assert_eq!(p.bounds().bottom(), world.ground_y);
        assert_eq!(p.state(), PlayerState::Idle);
    }

    #[test]
    fn test_running_moves_and_clamps() {
        let (mut p, world) = player();
        let start = p.position().x;
        p.update(0.1, PlayerInput::walk(Direction::Right), &world, &mut NullEffects);
        assert_eq!(p.state(), PlayerState::Running);
        assert!((p.position().x - (start + 20.0)).abs() < 1e-3);

        for _ in 0..100 {
            p.update(0.1, PlayerInput::walk(Direction::Right), &world, &mut NullEffects);
        }
        assert_eq!(p.position().x, world.width - p.width());
    }

    #[test]
    fn test_swing_hitbox_window() {
        let (mut p, world) = player();
        let mut log = EffectLog::new();
        let swing = PlayerInput {
            attack: true,
            ..PlayerInput::NONE
        };
        p.update(0.05, swing, &world, &mut log);
        assert_eq!(p.state(), PlayerState::Attacking);
        assert_eq!(log.sound_count(SoundCue::PlayerSwing), 1);
        assert!(!p.is_attack_hitbox_active());

        p.update(0.06, PlayerInput::NONE, &world, &mut log);
        assert!(p.is_attack_hitbox_active());
        assert!(p.attack_box().left() >= p.bounds().right());

        for _ in 0..5 {
            p.update(0.06, PlayerInput::NONE, &world, &mut log);
        }
        assert_eq!(p.state(), PlayerState::Idle);
        assert!(!p.is_attack_hitbox_active());
    }

    #[test]
    fn test_roll_is_invulnerable() {
        let (mut p, world) = player();
        let roll = PlayerInput {
            roll: true,
            ..PlayerInput::NONE
        };
        p.update(0.05, roll, &world, &mut NullEffects);
        assert_eq!(p.state(), PlayerState::Rolling);
        assert_eq!(
            p.take_damage(1, Direction::Left, &mut NullEffects),
            DamageOutcome::Ignored
        );
        assert_eq!(p.health(), 3);
    }

    #[test]
    fn test_hit_grants_grace_and_knockback() {
        let (mut p, world) = player();
        let start = p.position().x;
        assert_eq!(
            p.take_damage(1, Direction::Left, &mut NullEffects),
            DamageOutcome::Hurt
        );
        assert_eq!(p.health(), 2);
        assert_eq!(p.state(), PlayerState::Hurt);

        // Grace window
        assert_eq!(
            p.take_damage(1, Direction::Left, &mut NullEffects),
            DamageOutcome::Ignored
        );

        p.update(0.1, PlayerInput::NONE, &world, &mut NullEffects);
        assert!((p.position().x - (start - 30.0)).abs() < 1e-3);

        for _ in 0..12 {
            p.update(0.1, PlayerInput::NONE, &world, &mut NullEffects);
        }
        assert!(!p.is_invulnerable());
        assert_eq!(
            p.take_damage(1, Direction::Right, &mut NullEffects),
            DamageOutcome::Hurt
        );
    }

    #[test]
    fn test_death_is_terminal() {
        let (mut p, _) = player();
        assert_eq!(
            p.take_damage(5, Direction::Left, &mut NullEffects),
            DamageOutcome::Killed
        );
        assert!(p.is_dead());
        assert!(!p.set_state(PlayerState::Idle));
        assert_eq!(
            p.take_damage(1, Direction::Left, &mut NullEffects),
            DamageOutcome::Ignored
        );
    }
}
