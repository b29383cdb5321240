//! Minotaur: melee brute of the ordinary cycle.
//!
//! Patrols between the screen edges when no player is present, otherwise
//! chases and swings once in range and off cooldown. Hitting it while it
//! idles between attacks provokes an immediate counter-swing.

use duskfall_common::{BoundingRectangle, Direction};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{step_toward, EnemyKind, EnemyState, WALK_IN_SPEED};
use crate::actor::{
    ActorBody, CombatActor, DamageOutcome, HurtFlash, PlayerView, SpriteRequest, TickContext,
};
use crate::animation::{AnimationClip, AnimationClock};
use crate::config::WorldBounds;
use crate::effects::{EffectsSink, SoundCue};
use crate::frames::{window_active, FrameRange, FrameWindow};
use crate::snapshot::EnemySnapshot;

const FRAME_SIZE: f32 = 96.0;
const SCALE: f32 = 2.0;
const HEALTH: i32 = 2;
const WALK_SPEED: f32 = 100.0;
/// Pause after bouncing off a screen edge.
const PATROL_IDLE: f32 = 1.5;
/// Pause after an attack completes.
const RECOVERY_IDLE: f32 = 1.0;
/// Horizontal hurtbox-center gap at which a swing starts.
pub const ATTACK_RANGE: f32 = 140.0;
/// Minimum time between two swings.
pub const ATTACK_COOLDOWN: f32 = 1.5;
const HURT_DURATION: f32 = 0.4;
const FLASH_DURATION: f32 = 0.2;
/// Swing reach beyond the hurtbox edge, unscaled.
const REACH: f32 = 60.0;

const IDLE: AnimationClip = AnimationClip::looping("minotaur_idle", 6, 0.1);
const WALK: AnimationClip = AnimationClip::looping("minotaur_walk", 8, 0.1);
const ATTACK: AnimationClip = AnimationClip::once("minotaur_attack", 5, 0.1);
const HURT: AnimationClip = AnimationClip::once("minotaur_hurt", 2, 0.1);
const DEAD: AnimationClip = AnimationClip::once("minotaur_dead", 6, 0.1);

/// Minotaur behavioral modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MinotaurState {
    /// Scripted entrance
    WalkingIn,
    /// Waiting
    Idle,
    /// Patrolling or chasing
    Walk,
    /// Swinging
    Attack,
    /// Flinching
    Hurt,
    /// Terminal
    Dead,
}

impl MinotaurState {
    fn clip(self) -> AnimationClip {
        match self {
            Self::WalkingIn | Self::Walk => WALK,
            Self::Idle => IDLE,
            Self::Attack => ATTACK,
            Self::Hurt => HURT,
            Self::Dead => DEAD,
        }
    }
}

const HITBOX_FRAMES: &[FrameWindow<MinotaurState>] = &[FrameWindow::new(
    MinotaurState::Attack,
    FrameRange::starting_at(3),
)];

/// The Minotaur.
#[derive(Debug, Clone)]
pub struct Minotaur {
    body: ActorBody,
    state: MinotaurState,
    clock: AnimationClock,
    state_timer: f32,
    attack_cooldown: f32,
    walk_in_target: Option<f32>,
    flash: HurtFlash,
    attack_box: BoundingRectangle,
    hitbox_active: bool,
}

impl Default for Minotaur {
    fn default() -> Self {
        Self::new()
    }
}

impl Minotaur {
    /// Creates a Minotaur walking left from the origin.
    #[must_use]
    pub fn new() -> Self {
        let mut minotaur = Self {
            body: ActorBody::new(HEALTH, SCALE, Vec2::splat(FRAME_SIZE), Vec2::new(0.4, 0.7)),
            state: MinotaurState::Walk,
            clock: AnimationClock::new(WALK),
            state_timer: 0.0,
            attack_cooldown: 0.0,
            walk_in_target: None,
            flash: HurtFlash::default(),
            attack_box: BoundingRectangle::EMPTY,
            hitbox_active: false,
        };
        minotaur.refresh_hitbox();
        minotaur
    }

    pub(crate) fn restore(snapshot: &EnemySnapshot, state: MinotaurState) -> Self {
        let mut minotaur = Self::new();
        minotaur.body.set_position(snapshot.position);
        minotaur.body.set_direction(snapshot.direction);
        minotaur.body.health = snapshot.health;
        minotaur.enter(state);
        if snapshot.removed {
            minotaur.body.mark_removed();
        }
        minotaur.refresh_hitbox();
        minotaur
    }

    pub(crate) fn body(&self) -> &ActorBody {
        &self.body
    }

    /// Current state.
    #[must_use]
    pub fn current_state(&self) -> MinotaurState {
        self.state
    }

    /// Time left before the next swing may start.
    #[must_use]
    pub fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown.max(0.0)
    }

    /// Places the Minotaur and sets its facing.
    pub fn place(&mut self, position: Vec2, direction: Direction) {
        self.body.set_position(position);
        self.body.set_direction(direction);
        self.refresh_hitbox();
    }

    /// Requests a transition.
    ///
    /// Rejected when dead, when already in `state`, or while a flinch is
    /// still running (only death may cut it short).
    pub fn set_state(&mut self, state: MinotaurState) -> bool {
        if self.state == MinotaurState::Dead || self.state == state {
            return false;
        }
        if self.state == MinotaurState::Hurt
            && self.state_timer > 0.0
            && state != MinotaurState::Dead
        {
            return false;
        }
        self.enter(state);
        true
    }

    fn enter(&mut self, state: MinotaurState) {
        trace!("Minotaur {:?} -> {:?}", self.state, state);
        self.state = state;
        self.clock.play(state.clip());
        self.hitbox_active = false;
        self.state_timer = match state {
            MinotaurState::Idle => PATROL_IDLE,
            MinotaurState::Hurt => HURT_DURATION,
            _ => 0.0,
        };
    }

    fn patrol(&mut self, dt: f32, world: &WorldBounds) {
        let max_x = world.width - self.body.width();
        let direction = self.body.direction();
        self.body.translate_x(direction.sign() * WALK_SPEED * dt);

        let position = self.body.position();
        let edge = match direction {
            Direction::Left if position.x < 0.0 => Some(0.0),
            Direction::Right if position.x > max_x => Some(max_x),
            _ => None,
        };
        if let Some(edge_x) = edge {
            self.body.set_position(Vec2::new(edge_x, position.y));
            self.body.set_direction(direction.flipped());
            self.set_state(MinotaurState::Idle);
        }
    }

    fn chase(&mut self, player: &dyn PlayerView, dt: f32, world: &WorldBounds) {
        let own_x = self.body.bounds().center().x;
        let target_x = player.bounds().center().x;
        self.body.set_direction(Direction::toward(own_x, target_x));

        if self.body.horizontal_gap_to(&player.bounds()) <= ATTACK_RANGE {
            if self.attack_cooldown <= 0.0 {
                self.set_state(MinotaurState::Attack);
            }
            return;
        }

        self.body
            .translate_x(self.body.direction().sign() * WALK_SPEED * dt);
        self.body.clamp_to_world(world.width);
    }

    fn refresh_hitbox(&mut self) {
        let bounds = self.body.bounds();
        let reach = REACH * self.body.scale();
        let x = match self.body.direction() {
            Direction::Right => bounds.right(),
            Direction::Left => bounds.left() - reach,
        };
        self.attack_box = BoundingRectangle::new(x, bounds.top(), reach, bounds.height);
        self.hitbox_active = window_active(HITBOX_FRAMES, &self.state, self.clock.display_frame());
    }
}

impl CombatActor for Minotaur {
    fn kind(&self) -> EnemyKind {
        EnemyKind::Minotaur
    }

    fn update(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        if self.body.is_removed() {
            return;
        }
        self.flash.tick(dt);
        if self.attack_cooldown > 0.0 {
            self.attack_cooldown -= dt;
        }

        match self.state {
            MinotaurState::WalkingIn => {
                let arrived = match self.walk_in_target {
                    Some(target_x) => step_toward(&mut self.body, target_x, WALK_IN_SPEED, dt),
                    None => true,
                };
                if arrived {
                    self.walk_in_target = None;
                    self.set_state(MinotaurState::Walk);
                }
            },
            MinotaurState::Idle | MinotaurState::Hurt => {
                self.state_timer -= dt;
                if self.state_timer <= 0.0 {
                    self.set_state(MinotaurState::Walk);
                }
            },
            MinotaurState::Walk => match ctx.live_player() {
                Some(player) => self.chase(player, dt, ctx.world),
                None => self.patrol(dt, ctx.world),
            },
            MinotaurState::Attack => {
                if self.clock.is_finished() {
                    self.attack_cooldown = ATTACK_COOLDOWN;
                    self.set_state(MinotaurState::Idle);
                    self.state_timer = RECOVERY_IDLE;
                }
            },
            MinotaurState::Dead => {},
        }

        self.clock.advance(dt);
        if self.state == MinotaurState::Dead && self.clock.is_finished() {
            self.body.mark_removed();
            debug!("Minotaur removed");
        }
        self.refresh_hitbox();
    }

    fn take_damage(
        &mut self,
        amount: i32,
        source: Option<Vec2>,
        effects: &mut dyn EffectsSink,
    ) -> DamageOutcome {
        if matches!(self.state, MinotaurState::Dead | MinotaurState::WalkingIn) {
            return DamageOutcome::Ignored;
        }

        self.body.health -= amount;
        self.flash.trigger(FLASH_DURATION);
        effects.blood_splatter(self.body.bounds().center());
        effects.play_sound(SoundCue::EnemyHurt);
        debug!("Minotaur hit for {amount}, health {}", self.body.health);

        if self.body.health <= 0 {
            self.set_state(MinotaurState::Dead);
            effects.play_sound(SoundCue::EnemyDeath);
            return DamageOutcome::Killed;
        }

        match self.state {
            MinotaurState::Idle => {
                if let Some(source) = source {
                    let own_x = self.body.bounds().center().x;
                    self.body.set_direction(Direction::toward(own_x, source.x));
                }
                self.set_state(MinotaurState::Attack);
                self.refresh_hitbox();
                DamageOutcome::Countered
            },
            MinotaurState::Walk => {
                self.set_state(MinotaurState::Hurt);
                self.refresh_hitbox();
                DamageOutcome::Hurt
            },
            _ => DamageOutcome::Absorbed,
        }
    }

    fn walk_in(&mut self, start: Vec2, target: Vec2) {
        if self.state == MinotaurState::Dead {
            return;
        }
        self.body.set_position(start);
        self.body
            .set_direction(Direction::toward(start.x, target.x));
        self.walk_in_target = Some(target.x);
        self.enter(MinotaurState::WalkingIn);
        self.refresh_hitbox();
    }

    fn bounds(&self) -> BoundingRectangle {
        self.body.bounds()
    }

    fn attack_box(&self) -> BoundingRectangle {
        self.attack_box
    }

    fn is_attack_hitbox_active(&self) -> bool {
        self.hitbox_active
    }

    fn position(&self) -> Vec2 {
        self.body.position()
    }

    fn direction(&self) -> Direction {
        self.body.direction()
    }

    fn health(&self) -> i32 {
        self.body.health
    }

    fn state(&self) -> EnemyState {
        EnemyState::Minotaur(self.state)
    }

    fn is_removed(&self) -> bool {
        self.body.is_removed()
    }

    fn sprite(&self) -> SpriteRequest {
        SpriteRequest {
            sheet: self.clock.clip().sheet,
            frame: self.clock.display_frame(),
            position: self.body.position(),
            scale: self.body.scale(),
            flip: self.body.direction() == Direction::Right,
            tint: self.flash.tint(),
            alpha: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::PlayerSample;
    use crate::effects::{EffectLog, NullEffects};

    const DT: f32 = 0.05;

    fn tick(minotaur: &mut Minotaur, player: Option<&PlayerSample>) {
        let world = WorldBounds::default();
        let mut effects = NullEffects;
        let mut rng = fastrand::Rng::with_seed(1);
        let mut ctx = TickContext::new(
            player.map(|p| p as &dyn PlayerView),
            &world,
            &mut effects,
            &mut rng,
        );
        minotaur.update(DT, &mut ctx);
    }

    fn player_at(center_x: f32) -> PlayerSample {
        PlayerSample {
            position: Vec2::new(center_x - 128.0, 128.0),
            bounds: BoundingRectangle::new(center_x - 40.0, 200.0, 80.0, 150.0),
            dead: false,
        }
    }

    #[test]
    fn test_patrol_walks_to_edge_and_flips_once() {
        let mut m = Minotaur::new();
        m.place(Vec2::new(100.0, 192.0), Direction::Left);

        let mut last_x = m.position().x;
        let mut flips = 0;
        for _ in 0..40 {
            let before = m.direction();
            tick(&mut m, None);
            if m.direction() != before {
                flips += 1;
            }
            if flips == 0 {
                assert!(m.position().x <= last_x);
            }
            last_x = m.position().x;
        }

        assert_eq!(flips, 1);
        assert_eq!(m.position().x, 0.0);
        assert_eq!(m.direction(), Direction::Right);
        assert_eq!(m.current_state(), MinotaurState::Idle);
    }

    #[test]
    fn test_patrol_resumes_after_idle() {
        let mut m = Minotaur::new();
        m.place(Vec2::new(800.0 - 192.0 - 1.0, 192.0), Direction::Right);
        tick(&mut m, None);
        assert_eq!(m.current_state(), MinotaurState::Idle);
        assert_eq!(m.direction(), Direction::Left);

        for _ in 0..35 {
            tick(&mut m, None);
        }
        assert_eq!(m.current_state(), MinotaurState::Walk);
        assert!(m.position().x < 800.0 - 192.0);
    }

    #[test]
    fn test_chase_then_attack_with_late_hitbox() {
        let mut m = Minotaur::new();
        m.place(Vec2::new(0.0, 192.0), Direction::Left);
        let player = player_at(400.0);

        let mut ticks = 0;
        while m.current_state() != MinotaurState::Attack && ticks < 200 {
            tick(&mut m, Some(&player));
            ticks += 1;
        }
        assert_eq!(m.current_state(), MinotaurState::Attack);
        assert_eq!(m.direction(), Direction::Right);
        assert!(!m.is_attack_hitbox_active());

        let mut active_frames = Vec::new();
        while m.current_state() == MinotaurState::Attack {
            tick(&mut m, Some(&player));
            if m.is_attack_hitbox_active() {
                active_frames.push(m.clock.display_frame());
            }
        }
        assert!(!active_frames.is_empty());
        assert!(active_frames.iter().all(|&f| f >= 3));
        assert!(m.attack_box().left() >= m.bounds().right() - 1e-3);

        assert_eq!(m.current_state(), MinotaurState::Idle);
        assert!(m.attack_cooldown() > 1.0);
    }

    #[test]
    fn test_holds_position_while_on_cooldown() {
        let mut m = Minotaur::new();
        m.place(Vec2::new(300.0, 192.0), Direction::Right);
        m.attack_cooldown = 1.0;
        let player = player_at(m.bounds().center().x + 100.0);

        let x = m.position().x;
        tick(&mut m, Some(&player));
        assert_eq!(m.current_state(), MinotaurState::Walk);
        assert_eq!(m.position().x, x);
    }

    #[test]
    fn test_idle_hit_counters() {
        let mut m = Minotaur::new();
        m.place(Vec2::new(300.0, 192.0), Direction::Left);
        m.set_state(MinotaurState::Idle);

        let source = Vec2::new(m.bounds().right() + 50.0, 0.0);
        let mut log = EffectLog::new();
        assert_eq!(
            m.take_damage(1, Some(source), &mut log),
            DamageOutcome::Countered
        );
        assert_eq!(m.current_state(), MinotaurState::Attack);
        assert_eq!(m.direction(), Direction::Right);
        assert_eq!(m.health(), 1);
        assert_eq!(log.splatter_count(), 1);
    }

    #[test]
    fn test_attack_not_interrupted_by_pain() {
        let mut m = Minotaur::new();
        m.set_state(MinotaurState::Attack);
        assert_eq!(
            m.take_damage(1, None, &mut NullEffects),
            DamageOutcome::Absorbed
        );
        assert_eq!(m.current_state(), MinotaurState::Attack);
        assert_eq!(
            m.take_damage(1, None, &mut NullEffects),
            DamageOutcome::Killed
        );
        assert_eq!(m.current_state(), MinotaurState::Dead);
    }

    #[test]
    fn test_hurt_guards_exits() {
        let mut m = Minotaur::new();
        m.place(Vec2::new(300.0, 192.0), Direction::Left);
        m.body.health = 5;
        assert_eq!(
            m.take_damage(1, None, &mut NullEffects),
            DamageOutcome::Hurt
        );
        assert!(!m.set_state(MinotaurState::Idle));
        assert!(!m.set_state(MinotaurState::Attack));

        for _ in 0..10 {
            tick(&mut m, None);
        }
        assert_eq!(m.current_state(), MinotaurState::Walk);
    }

    #[test]
    fn test_death_animation_removes() {
        let mut m = Minotaur::new();
        m.take_damage(2, None, &mut NullEffects);
        assert!(m.is_dead());
        assert!(!m.set_state(MinotaurState::Walk));

        for _ in 0..20 {
            tick(&mut m, None);
        }
        assert!(m.is_removed());

        let frozen = m.position();
        tick(&mut m, None);
        assert_eq!(m.position(), frozen);
    }

    #[test]
    fn test_walk_in_ignores_damage_then_hands_over() {
        let mut m = Minotaur::new();
        m.walk_in(Vec2::new(-192.0, 192.0), Vec2::new(100.0, 192.0));
        assert_eq!(m.current_state(), MinotaurState::WalkingIn);
        assert_eq!(m.direction(), Direction::Right);
        assert_eq!(
            m.take_damage(1, None, &mut NullEffects),
            DamageOutcome::Ignored
        );

        for _ in 0..60 {
            tick(&mut m, None);
        }
        assert_ne!(m.current_state(), MinotaurState::WalkingIn);
        assert_eq!(m.health(), 2);
    }

    #[test]
    fn test_sprite_flips_when_facing_right() {
        let mut m = Minotaur::new();
        m.place(Vec2::ZERO, Direction::Right);
        assert!(m.sprite().flip);
        m.place(Vec2::ZERO, Direction::Left);
        assert!(!m.sprite().flip);
    }
}
