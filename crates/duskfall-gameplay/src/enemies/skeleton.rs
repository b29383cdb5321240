//! Skeleton: archer of the ordinary cycle.
//!
//! Stands its ground and looses arrows, then slides to the opposite screen
//! edge leaving a colored after-image trail. Evasion and flinching are
//! both untouchable windows, so each exposure admits a single hit.

use duskfall_common::{BoundingRectangle, Direction};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{step_toward, EnemyKind, EnemyState, WALK_IN_SPEED};
use crate::actor::{
    ActorBody, AfterImage, AfterImageTrail, CombatActor, DamageOutcome, HurtFlash, SpriteRequest,
    TickContext, Tint,
};
use crate::animation::{AnimationClip, AnimationClock};
use crate::config::WorldBounds;
use crate::effects::{EffectsSink, SoundCue};
use crate::projectile::{update_volley, Projectile, ProjectileKind};
use crate::snapshot::EnemySnapshot;

const FRAME_SIZE: f32 = 128.0;
const SCALE: f32 = 2.0;
const HEALTH: i32 = 2;
/// Wait in Idle before choosing an attack.
const IDLE_WAIT: f32 = 2.0;
/// Wait in Idle after an attack before evading.
pub const POST_ATTACK_WAIT: f32 = 2.0;
/// Frame from which the arrow leaves the bow.
const RELEASE_FRAME: usize = 3;
const EVASION_SPEED: f32 = 700.0;
/// Gap kept from the screen edge when evading.
const EVASION_MARGIN: f32 = 20.0;
const AFTER_IMAGE_INTERVAL: f32 = 0.02;
const FLASH_DURATION: f32 = 0.2;

const IDLE: AnimationClip = AnimationClip::looping("skeleton_idle", 7, 0.15);
const SHOT1: AnimationClip = AnimationClip::once("skeleton_shot1", 15, 0.08);
const SHOT2: AnimationClip = AnimationClip::once("skeleton_shot2", 15, 0.08);
const EVASION: AnimationClip = AnimationClip::looping("skeleton_evasion", 6, 0.1);
const HURT: AnimationClip = AnimationClip::once("skeleton_hurt", 2, 0.1);
const DEAD: AnimationClip = AnimationClip::once("skeleton_dead", 5, 0.15);

/// Skeleton behavioral modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkeletonState {
    /// Scripted entrance
    WalkingIn,
    /// Waiting to shoot or to evade
    Idle,
    /// First bow animation
    Attack1,
    /// Second bow animation
    Attack2,
    /// Sliding to a screen edge
    Evasion,
    /// Flinching
    Hurt,
    /// Terminal
    Dead,
}

impl SkeletonState {
    fn clip(self) -> AnimationClip {
        match self {
            Self::WalkingIn | Self::Evasion => EVASION,
            Self::Idle => IDLE,
            Self::Attack1 => SHOT1,
            Self::Attack2 => SHOT2,
            Self::Hurt => HURT,
            Self::Dead => DEAD,
        }
    }

    /// Time the state lasts before its timer-driven exit, if it has one.
    fn duration(self) -> f32 {
        match self {
            Self::Attack1 | Self::Attack2 | Self::Evasion | Self::Hurt | Self::Dead => {
                let clip = self.clip();
                let stretch = match self {
                    Self::Evasion => 1.5,
                    Self::Hurt => 2.0,
                    _ => 1.0,
                };
                clip.total_duration() * stretch
            },
            Self::WalkingIn | Self::Idle => 0.0,
        }
    }

    fn is_attack(self) -> bool {
        matches!(self, Self::Attack1 | Self::Attack2)
    }
}

/// The Skeleton.
#[derive(Debug, Clone)]
pub struct Skeleton {
    body: ActorBody,
    state: SkeletonState,
    clock: AnimationClock,
    state_timer: f32,
    idle_timer: f32,
    post_attack: Option<f32>,
    arrow_fired: bool,
    evasion_target: Option<f32>,
    walk_in_target: Option<f32>,
    flash: HurtFlash,
    trail: AfterImageTrail,
    arrows: Vec<Projectile>,
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new()
    }
}

impl Skeleton {
    /// Creates an idle Skeleton at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            body: ActorBody::new(HEALTH, SCALE, Vec2::splat(FRAME_SIZE), Vec2::new(0.3, 0.7)),
            state: SkeletonState::Idle,
            clock: AnimationClock::new(IDLE),
            state_timer: 0.0,
            idle_timer: IDLE_WAIT,
            post_attack: None,
            arrow_fired: false,
            evasion_target: None,
            walk_in_target: None,
            flash: HurtFlash::default(),
            trail: AfterImageTrail::new(AFTER_IMAGE_INTERVAL),
            arrows: Vec::new(),
        }
    }

    pub(crate) fn restore(snapshot: &EnemySnapshot, state: SkeletonState) -> Self {
        let mut skeleton = Self::new();
        skeleton.body.set_position(snapshot.position);
        skeleton.body.set_direction(snapshot.direction);
        skeleton.body.health = snapshot.health;
        skeleton.enter(state);
        if snapshot.removed {
            skeleton.body.mark_removed();
        }
        skeleton
    }

    pub(crate) fn body(&self) -> &ActorBody {
        &self.body
    }

    /// Current state.
    #[must_use]
    pub fn current_state(&self) -> SkeletonState {
        self.state
    }

    /// Remaining post-attack wait, if one is pending.
    #[must_use]
    pub fn post_attack_wait(&self) -> Option<f32> {
        self.post_attack
    }

    /// Places the Skeleton and sets its facing.
    pub fn place(&mut self, position: Vec2, direction: Direction) {
        self.body.set_position(position);
        self.body.set_direction(direction);
    }

    /// Requests a transition.
    ///
    /// Rejected when dead or when already in `state`; re-entering Idle
    /// restarts its countdown.
    pub fn set_state(&mut self, state: SkeletonState) -> bool {
        if self.state == SkeletonState::Dead {
            return false;
        }
        if self.state == state && state != SkeletonState::Idle {
            return false;
        }
        self.enter(state);
        true
    }

    fn enter(&mut self, state: SkeletonState) {
        trace!("Skeleton {:?} -> {:?}", self.state, state);
        self.state = state;
        self.clock.play(state.clip());
        self.arrow_fired = false;
        self.post_attack = None;
        self.state_timer = state.duration();
        match state {
            SkeletonState::Idle => self.idle_timer = IDLE_WAIT,
            SkeletonState::Evasion => self.trail.clear(),
            _ => {},
        }
    }

    fn start_evasion(&mut self, world: &WorldBounds) {
        let flipped = self.body.direction().flipped();
        self.body.set_direction(flipped);
        let target = self.edge_target(flipped, world);
        self.set_state(SkeletonState::Evasion);
        self.evasion_target = Some(target);
    }

    fn edge_target(&self, heading: Direction, world: &WorldBounds) -> f32 {
        match heading {
            Direction::Left => EVASION_MARGIN,
            Direction::Right => world.width - self.body.width() - EVASION_MARGIN,
        }
    }

    fn face_player_or_center(&mut self, ctx: &TickContext<'_>) {
        let own_x = self.body.bounds().center().x;
        let target_x = ctx
            .live_player()
            .map_or(ctx.world.center_x(), |p| p.bounds().center().x);
        self.body.set_direction(Direction::toward(own_x, target_x));
    }

    fn loose_arrow(&mut self, effects: &mut dyn EffectsSink) {
        let position = self.body.position();
        let scale = self.body.scale();
        let x = match self.body.direction() {
            Direction::Right => position.x + 80.0 * scale,
            Direction::Left => position.x + 10.0 * scale,
        };
        let spawn = Vec2::new(x, position.y + 45.0 * scale);
        self.arrows.push(Projectile::new(
            ProjectileKind::Arrow,
            spawn,
            self.body.direction(),
        ));
        self.arrow_fired = true;
        effects.play_sound(SoundCue::ArrowLoosed);
        trace!("Skeleton loosed an arrow at {spawn}");
    }

    fn update_idle(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        if let Some(wait) = self.post_attack {
            let remaining = wait - dt;
            if remaining <= 0.0 {
                self.start_evasion(ctx.world);
            } else {
                self.post_attack = Some(remaining);
            }
            return;
        }

        self.idle_timer -= dt;
        if self.idle_timer <= 0.0 {
            let attack = if ctx.rng.bool() {
                SkeletonState::Attack1
            } else {
                SkeletonState::Attack2
            };
            if ctx.live_player().is_some() {
                self.face_player_or_center(ctx);
            }
            self.set_state(attack);
        }
    }

    fn update_evasion(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        self.state_timer -= dt;
        let heading = self.body.direction();
        let target = match self.evasion_target {
            Some(target) => target,
            None => {
                let target = self.edge_target(heading, ctx.world);
                self.evasion_target = Some(target);
                target
            },
        };
        let arrived = step_toward(&mut self.body, target, EVASION_SPEED, dt);

        let rng = &mut *ctx.rng;
        self.trail.emit(
            dt,
            self.body.position(),
            self.clock.display_frame(),
            heading == Direction::Left,
            || match rng.usize(..3) {
                0 => Tint::Cyan,
                1 => Tint::Magenta,
                _ => Tint::Yellow,
            },
        );

        if arrived || self.state_timer <= 0.0 {
            self.evasion_target = None;
            self.set_state(SkeletonState::Idle);
            self.face_player_or_center(ctx);
        }
    }
}

impl CombatActor for Skeleton {
    fn kind(&self) -> EnemyKind {
        EnemyKind::Skeleton
    }

    fn update(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        if self.body.is_removed() {
            return;
        }
        self.flash.tick(dt);

        match self.state {
            SkeletonState::WalkingIn => {
                let arrived = match self.walk_in_target {
                    Some(target_x) => step_toward(&mut self.body, target_x, WALK_IN_SPEED, dt),
                    None => true,
                };
                if arrived {
                    self.walk_in_target = None;
                    self.set_state(SkeletonState::Idle);
                    self.face_player_or_center(ctx);
                }
            },
            SkeletonState::Idle => self.update_idle(dt, ctx),
            SkeletonState::Attack1 | SkeletonState::Attack2 => {
                self.state_timer -= dt;
                if !self.arrow_fired && self.clock.display_frame() >= RELEASE_FRAME {
                    self.loose_arrow(ctx.effects);
                }
                if self.state_timer <= 0.0 {
                    self.set_state(SkeletonState::Idle);
                    self.post_attack = Some(POST_ATTACK_WAIT);
                }
            },
            SkeletonState::Evasion => self.update_evasion(dt, ctx),
            SkeletonState::Hurt => {
                self.state_timer -= dt;
                if self.state_timer <= 0.0 {
                    self.start_evasion(ctx.world);
                }
            },
            SkeletonState::Dead => {
                self.state_timer -= dt;
                if self.state_timer <= 0.0 {
                    self.body.mark_removed();
                    debug!("Skeleton removed");
                }
            },
        }

        self.clock.advance(dt);
        update_volley(&mut self.arrows, dt, ctx.world.width);
        self.trail.fade(dt);
    }

    fn take_damage(
        &mut self,
        amount: i32,
        _source: Option<Vec2>,
        effects: &mut dyn EffectsSink,
    ) -> DamageOutcome {
        if matches!(
            self.state,
            SkeletonState::Dead
                | SkeletonState::Hurt
                | SkeletonState::Evasion
                | SkeletonState::WalkingIn
        ) {
            return DamageOutcome::Ignored;
        }

        self.body.health -= amount;
        self.flash.trigger(FLASH_DURATION);
        effects.blood_splatter(self.body.bounds().center());
        effects.play_sound(SoundCue::EnemyHurt);
        debug!("Skeleton hit for {amount}, health {}", self.body.health);

        if self.body.health <= 0 {
            self.set_state(SkeletonState::Dead);
            effects.play_sound(SoundCue::EnemyDeath);
            DamageOutcome::Killed
        } else {
            self.set_state(SkeletonState::Hurt);
            DamageOutcome::Hurt
        }
    }

    fn walk_in(&mut self, start: Vec2, target: Vec2) {
        if self.state == SkeletonState::Dead {
            return;
        }
        self.body.set_position(start);
        self.body
            .set_direction(Direction::toward(start.x, target.x));
        self.walk_in_target = Some(target.x);
        self.enter(SkeletonState::WalkingIn);
    }

    fn bounds(&self) -> BoundingRectangle {
        self.body.bounds()
    }

    fn attack_box(&self) -> BoundingRectangle {
        BoundingRectangle::EMPTY
    }

    fn is_attack_hitbox_active(&self) -> bool {
        false
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
        EnemyState::Skeleton(self.state)
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
            flip: self.body.direction() == Direction::Left,
            tint: self.flash.tint(),
            alpha: 1.0,
        }
    }

    fn after_images(&self) -> &[AfterImage] {
        self.trail.images()
    }

    fn projectiles(&self) -> &[Projectile] {
        &self.arrows
    }

    fn projectiles_mut(&mut self) -> &mut [Projectile] {
        &mut self.arrows
    }
}
