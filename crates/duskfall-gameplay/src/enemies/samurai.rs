//! Samurai: the mid-boss.
//!
//! Behavior is phase-sequenced. Each time the Samurai finishes idling it
//! runs the current [`PatternPhase`]:
//!
//! - **Combo**: dash away, walk back in, two-hit combo chained through a
//!   dash past the player, then switch to Bow
//! - **Bow**: arcing jump to the far edge, shoot, then switch to Counter
//! - **Counter**: (jump clear if crowded) hold a counter stance; a player
//!   who comes close eats a lunging counter; either way back to Combo
//!
//! Lunge movement is gated per frame by [`MOVEMENT_FRAMES`] and the final
//! pose of each swing is held with the animation frozen.

use std::f32::consts::PI;

use duskfall_common::{BoundingRectangle, Direction};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::{step_toward, EnemyKind, EnemyState};
use crate::actor::{
    ActorBody, AfterImage, AfterImageTrail, CombatActor, DamageOutcome, HurtFlash, PlayerView,
    SpriteRequest, TickContext, Tint,
};
use crate::animation::{AnimationClip, AnimationClock, FrameAdvance};
use crate::config::WorldBounds;
use crate::effects::{EffectsSink, SoundCue};
use crate::frames::{movement_speed, window_active, FrameRange, FrameWindow, MovementWindow};
use crate::projectile::{update_volley, Projectile, ProjectileKind};
use crate::snapshot::EnemySnapshot;

const FRAME_SIZE: f32 = 128.0;
const SCALE: f32 = 2.0;
const HEALTH: i32 = 20;
const WALK_SPEED: f32 = 250.0;
/// Gap at which the walk-in turns into the opening swing.
const COMBO_RANGE: f32 = 150.0;
const DASH_SPEED: f32 = 900.0;
const COMBO_DASH_SPEED: f32 = 1200.0;
/// How far past the player the combo dash lands.
const COMBO_DASH_OVERSHOOT: f32 = 200.0;
/// Gap kept from the screen edges by dashes and jumps.
const EDGE_MARGIN: f32 = 50.0;
/// Jump progress per second.
const JUMP_RATE: f32 = 1.5;
const JUMP_HEIGHT: f32 = 300.0;
/// Closer than this, the counter phase jumps away before taking its stance.
const COUNTER_JUMP_RANGE: f32 = 400.0;
/// Closer than this, the stance releases its counter.
const COUNTER_TRIGGER_RANGE: f32 = 300.0;
const COUNTER_STANCE_DURATION: f32 = 5.0;
/// Frame the stance holds on.
const STANCE_HOLD_FRAME: usize = 2;
/// Frame the counter swing starts from.
const COUNTER_START_FRAME: usize = 3;
/// Frame on which the bow releases.
const RELEASE_FRAME: usize = 8;
const SWING_POSE_HOLD: f32 = 0.5;
const COUNTER_POSE_HOLD: f32 = 1.0;
const ATTACK_RANGE: f32 = 160.0;
const AFTER_IMAGE_INTERVAL: f32 = 0.05;
const FLASH_DURATION: f32 = 0.5;

const IDLE: AnimationClip = AnimationClip::looping("samurai_Idle", 6, 0.15).discarding();
const WALK: AnimationClip = AnimationClip::looping("samurai_Walk", 8, 0.1).discarding();
const DASH: AnimationClip = AnimationClip::looping("samurai_Walk", 8, 0.05).discarding();
const JUMP: AnimationClip = AnimationClip::once("samurai_Jump", 1, 1.0).discarding();
const SHOT: AnimationClip = AnimationClip::once("samurai_Shot", 13, 0.08).discarding();
const ATTACK2: AnimationClip = AnimationClip::once("samurai_Attack_2", 5, 0.1).discarding();
const ATTACK3: AnimationClip = AnimationClip::once("samurai_Attack_3", 6, 0.1).discarding();
const STANCE: AnimationClip = AnimationClip::once("samurai_Attack_1", 5, 0.1).discarding();
const COUNTER: AnimationClip = AnimationClip::once("samurai_Attack_1", 5, 0.05).discarding();
const DEAD: AnimationClip = AnimationClip::once("samurai_Dead", 6, 0.15).discarding();

/// Samurai behavioral modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SamuraiState {
    /// Waiting before the next pattern step
    Idle,
    /// Closing in for the opening swing
    Walking,
    /// Arcing leap to a screen edge
    JumpingToEdge,
    /// Bow attack
    Shooting,
    /// First combo swing
    Attack2,
    /// Dash through the player between combo swings
    ComboDash,
    /// Second combo swing with a forward lunge
    Attack3,
    /// Waiting to punish proximity
    CounterStance,
    /// Lunging counter
    CounterAttack,
    /// Retreat before the combo
    DashingAway,
    /// Terminal
    Dead,
}

impl SamuraiState {
    fn clip(self) -> AnimationClip {
        match self {
            Self::Idle => IDLE,
            Self::Walking => WALK,
            Self::JumpingToEdge => JUMP,
            Self::Shooting => SHOT,
            Self::Attack2 => ATTACK2,
            Self::ComboDash | Self::DashingAway => DASH,
            Self::Attack3 => ATTACK3,
            Self::CounterStance => STANCE,
            Self::CounterAttack => COUNTER,
            Self::Dead => DEAD,
        }
    }
}

/// Which step of the pattern runs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PatternPhase {
    /// Melee combo
    #[default]
    Combo,
    /// Jump and shoot
    Bow,
    /// Counter stance
    Counter,
}

/// Frames carrying a live hitbox.
pub const HITBOX_FRAMES: &[FrameWindow<SamuraiState>] = &[
    FrameWindow::new(SamuraiState::Attack2, FrameRange::starting_at(3)),
    FrameWindow::new(SamuraiState::Attack3, FrameRange::starting_at(4)),
    FrameWindow::new(SamuraiState::CounterAttack, FrameRange::starting_at(0)),
];

/// Frames that lunge forward, and how fast.
pub const MOVEMENT_FRAMES: &[MovementWindow<SamuraiState>] = &[
    MovementWindow::new(SamuraiState::Attack3, FrameRange::single(4), 400.0),
    MovementWindow::new(SamuraiState::CounterAttack, FrameRange::span(3, 4), 3500.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Jump {
    start: Vec2,
    target: Vec2,
    progress: f32,
}

/// The Samurai.
#[derive(Debug, Clone)]
pub struct Samurai {
    body: ActorBody,
    state: SamuraiState,
    clock: AnimationClock,
    phase: PatternPhase,
    idle_wait: f32,
    state_timer: f32,
    pose_hold: Option<f32>,
    jump: Option<Jump>,
    after_jump: SamuraiState,
    dash_target: Option<f32>,
    counter_triggered: bool,
    flash: HurtFlash,
    trail: AfterImageTrail,
    arrows: Vec<Projectile>,
    attack_box: BoundingRectangle,
    hitbox_active: bool,
}

impl Default for Samurai {
    fn default() -> Self {
        Self::new()
    }
}

impl Samurai {
    /// Creates an idle Samurai at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            body: ActorBody::new(HEALTH, SCALE, Vec2::splat(FRAME_SIZE), Vec2::new(0.4, 0.7)),
            state: SamuraiState::Idle,
            clock: AnimationClock::new(IDLE),
            phase: PatternPhase::Combo,
            idle_wait: 0.0,
            state_timer: 0.0,
            pose_hold: None,
            jump: None,
            after_jump: SamuraiState::Shooting,
            dash_target: None,
            counter_triggered: false,
            flash: HurtFlash::default(),
            trail: AfterImageTrail::new(AFTER_IMAGE_INTERVAL),
            arrows: Vec::new(),
            attack_box: BoundingRectangle::EMPTY,
            hitbox_active: false,
        }
    }

    pub(crate) fn restore(snapshot: &EnemySnapshot, state: SamuraiState) -> Self {
        let mut samurai = Self::new();
        samurai.body.set_position(snapshot.position);
        samurai.body.set_direction(snapshot.direction);
        samurai.body.health = snapshot.health;
        samurai.enter(state);
        if snapshot.removed {
            samurai.body.mark_removed();
        }
        samurai.refresh_hitbox();
        samurai
    }

    pub(crate) fn body(&self) -> &ActorBody {
        &self.body
    }

    /// Current state.
    #[must_use]
    pub fn current_state(&self) -> SamuraiState {
        self.state
    }

    /// Pattern step that runs after the current idle.
    #[must_use]
    pub fn phase(&self) -> PatternPhase {
        self.phase
    }

    /// Remaining idle wait.
    #[must_use]
    pub fn idle_wait(&self) -> f32 {
        self.idle_wait
    }

    /// Remaining final-pose hold, if one is running.
    #[must_use]
    pub fn pose_hold(&self) -> Option<f32> {
        self.pose_hold
    }

    /// Displayed animation frame.
    #[must_use]
    pub fn frame(&self) -> usize {
        self.clock.display_frame()
    }

    /// Places the Samurai and sets its facing.
    pub fn place(&mut self, position: Vec2, direction: Direction) {
        self.body.set_position(position);
        self.body.set_direction(direction);
        self.refresh_hitbox();
    }

    /// Requests a transition.
    ///
    /// Rejected when dead or when already in `state`; re-entering Idle is
    /// allowed.
    pub fn set_state(&mut self, state: SamuraiState) -> bool {
        if self.state == SamuraiState::Dead {
            return false;
        }
        if self.state == state && state != SamuraiState::Idle {
            return false;
        }
        self.enter(state);
        true
    }

    fn enter(&mut self, state: SamuraiState) {
        trace!("Samurai {:?} -> {:?}", self.state, state);
        self.state = state;
        self.clock.play(state.clip());
        self.pose_hold = None;
        self.hitbox_active = false;
        match state {
            SamuraiState::ComboDash | SamuraiState::DashingAway => self.trail.clear(),
            SamuraiState::CounterStance => {
                self.state_timer = COUNTER_STANCE_DURATION;
                self.counter_triggered = false;
            },
            SamuraiState::CounterAttack => self.clock.jump_to(COUNTER_START_FRAME),
            _ => {},
        }
    }

    fn rest(&mut self, next: PatternPhase, wait: f32) {
        self.phase = next;
        self.set_state(SamuraiState::Idle);
        self.idle_wait = wait;
    }

    fn face_x(&mut self, target_x: f32) {
        let own_x = self.body.position().x;
        self.body.set_direction(Direction::toward(own_x, target_x));
    }

    fn far_edge(&self, world: &WorldBounds) -> f32 {
        world.width - self.body.width() - EDGE_MARGIN
    }

    fn execute_pattern(&mut self, player: Option<&dyn PlayerView>, world: &WorldBounds) {
        let Some(player) = player else {
            self.rest(self.phase, 0.5);
            return;
        };
        let player_position = player.position();
        let own = self.body.position();

        match self.phase {
            PatternPhase::Combo => {
                let target = if player_position.x < own.x {
                    self.far_edge(world)
                } else {
                    EDGE_MARGIN
                };
                self.face_x(target);
                self.set_state(SamuraiState::DashingAway);
                self.dash_target = Some(target);
            },
            PatternPhase::Bow => {
                self.after_jump = SamuraiState::Shooting;
                self.prepare_jump(player_position, world);
            },
            PatternPhase::Counter => {
                if own.distance(player_position) < COUNTER_JUMP_RANGE {
                    self.after_jump = SamuraiState::CounterStance;
                    self.prepare_jump(player_position, world);
                } else {
                    self.set_state(SamuraiState::CounterStance);
                }
            },
        }
    }

    fn prepare_jump(&mut self, player_position: Vec2, world: &WorldBounds) {
        let start = self.body.position();
        let target_x = if player_position.x < world.center_x() {
            self.far_edge(world)
        } else {
            EDGE_MARGIN
        };
        let direction = if target_x < player_position.x {
            Direction::Right
        } else {
            Direction::Left
        };
        self.body.set_direction(direction);
        self.set_state(SamuraiState::JumpingToEdge);
        self.jump = Some(Jump {
            start,
            target: Vec2::new(target_x, world.standing_y(self.body.height())),
            progress: 0.0,
        });
        debug!("Samurai leaps to x={target_x}");
    }

    fn prepare_combo_dash(&mut self, player: Option<&dyn PlayerView>, world: &WorldBounds) {
        let Some(player) = player else {
            self.rest(PatternPhase::Bow, 2.0);
            return;
        };
        let own_x = self.body.position().x;
        let player_x = player.position().x;
        let toward = Direction::toward(own_x, player_x);
        let target = (player_x + toward.sign() * COMBO_DASH_OVERSHOOT)
            .clamp(EDGE_MARGIN, world.width - EDGE_MARGIN);
        self.face_x(target);
        self.set_state(SamuraiState::ComboDash);
        self.dash_target = Some(target);
    }

    /// Dashes towards the current target. Returns true on arrival.
    fn dash(&mut self, dt: f32, speed: f32, world: &WorldBounds) -> bool {
        let target = match self.dash_target {
            Some(target) => target,
            None => {
                let target = match self.body.direction() {
                    Direction::Right => self.far_edge(world),
                    Direction::Left => EDGE_MARGIN,
                };
                self.dash_target = Some(target);
                target
            },
        };
        let arrived = step_toward(&mut self.body, target, speed, dt);
        self.trail.emit(
            dt,
            self.body.position(),
            self.clock.display_frame(),
            self.body.direction() == Direction::Left,
            || Tint::Red,
        );
        if arrived {
            self.dash_target = None;
        }
        arrived
    }

    /// Starts or advances the final-pose hold. Returns true once it elapsed.
    fn hold_pose(&mut self, dt: f32, length: f32) -> bool {
        let remaining = self.pose_hold.unwrap_or(length) - dt;
        self.clock.freeze();
        if remaining <= 0.0 {
            return true;
        }
        self.pose_hold = Some(remaining);
        false
    }

    fn lunge(&mut self, dt: f32, world: &WorldBounds) {
        if self.pose_hold.is_some() {
            return;
        }
        if let Some(speed) = movement_speed(MOVEMENT_FRAMES, &self.state, self.clock.display_frame())
        {
            self.body
                .translate_x(self.body.direction().sign() * speed * dt);
            self.body.clamp_to_world(world.width);
        }
    }

    fn loose_arrow(&mut self, effects: &mut dyn EffectsSink) {
        let position = self.body.position();
        let x = match self.body.direction() {
            Direction::Right => position.x + 100.0,
            Direction::Left => position.x + 20.0,
        };
        self.arrows.push(Projectile::new(
            ProjectileKind::SamuraiArrow,
            Vec2::new(x, position.y + 100.0),
            self.body.direction(),
        ));
        effects.play_sound(SoundCue::ArrowLoosed);
    }

    fn refresh_hitbox(&mut self) {
        self.attack_box = BoundingRectangle::EMPTY;
        self.hitbox_active = self.pose_hold.is_none()
            && window_active(HITBOX_FRAMES, &self.state, self.clock.display_frame());
        if self.hitbox_active {
            let bounds = self.body.bounds();
            let x = match self.body.direction() {
                Direction::Right => bounds.right(),
                Direction::Left => bounds.left() - ATTACK_RANGE,
            };
            self.attack_box = BoundingRectangle::new(x, bounds.top(), ATTACK_RANGE, bounds.height);
        }
    }

    fn behave(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        let player = ctx.live_player();
        let world = ctx.world;

        match self.state {
            SamuraiState::Idle => {
                self.idle_wait -= dt;
                if self.idle_wait <= 0.0 {
                    self.execute_pattern(player, world);
                }
            },
            SamuraiState::DashingAway => {
                if self.dash(dt, DASH_SPEED, world) {
                    self.set_state(SamuraiState::Walking);
                }
            },
            SamuraiState::ComboDash => {
                if self.dash(dt, COMBO_DASH_SPEED, world) {
                    if let Some(player) = player {
                        self.face_x(player.position().x);
                    }
                    self.set_state(SamuraiState::Attack3);
                }
            },
            SamuraiState::Walking => {
                let Some(player) = player else {
                    self.rest(self.phase, 0.5);
                    return;
                };
                let gap = player.position().x - self.body.position().x;
                self.face_x(player.position().x);
                self.body
                    .translate_x(self.body.direction().sign() * WALK_SPEED * dt);
                if gap.abs() < COMBO_RANGE {
                    self.set_state(SamuraiState::Attack2);
                }
            },
            SamuraiState::JumpingToEdge => {
                // A restored jump has lost its arc: take off again from
                // wherever the Samurai is and come down on the floor.
                let jump = match self.jump {
                    Some(jump) => jump,
                    None => {
                        let target_x = match self.body.direction() {
                            Direction::Right => EDGE_MARGIN,
                            Direction::Left => self.far_edge(world),
                        };
                        Jump {
                            start: self.body.position(),
                            target: Vec2::new(target_x, world.standing_y(self.body.height())),
                            progress: 0.0,
                        }
                    },
                };
                let progress = jump.progress + dt * JUMP_RATE;
                if progress >= 1.0 {
                    self.jump = None;
                    self.body.set_position(jump.target);
                    let next = self.after_jump;
                    self.set_state(next);
                } else {
                    let mut position = jump.start.lerp(jump.target, progress);
                    position.y -= JUMP_HEIGHT * (progress * PI).sin();
                    self.body.set_position(position);
                    self.jump = Some(Jump { progress, ..jump });
                }
            },
            SamuraiState::Attack2 => {
                if self.clock.on_last_frame() && self.hold_pose(dt, SWING_POSE_HOLD) {
                    self.prepare_combo_dash(player, world);
                }
            },
            SamuraiState::Attack3 => {
                self.lunge(dt, world);
                if self.clock.on_last_frame() && self.hold_pose(dt, SWING_POSE_HOLD) {
                    self.rest(PatternPhase::Bow, 2.0);
                }
            },
            SamuraiState::Shooting => {
                if self.clock.on_last_frame() {
                    self.rest(PatternPhase::Counter, 3.0);
                }
            },
            SamuraiState::CounterStance => {
                self.state_timer -= dt;
                let provoked = player.is_some_and(|p| {
                    self.body.position().distance(p.position()) < COUNTER_TRIGGER_RANGE
                });
                if provoked {
                    self.counter_triggered = true;
                    self.set_state(SamuraiState::CounterAttack);
                    debug!("Samurai counters");
                } else if self.state_timer <= 0.0 && !self.counter_triggered {
                    self.rest(PatternPhase::Combo, 3.0);
                }
            },
            SamuraiState::CounterAttack => {
                self.lunge(dt, world);
                if self.clock.on_last_frame() && self.hold_pose(dt, COUNTER_POSE_HOLD) {
                    self.rest(PatternPhase::Combo, 3.0);
                }
            },
            SamuraiState::Dead => {
                if self.clock.on_last_frame() {
                    self.body.mark_removed();
                    info!("Samurai defeated");
                }
            },
        }
    }
}

impl CombatActor for Samurai {
    fn kind(&self) -> EnemyKind {
        EnemyKind::Samurai
    }

    fn update(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        if self.body.is_removed() {
            return;
        }
        self.flash.tick(dt);

        self.behave(dt, ctx);

        let advance = self.clock.advance(dt);
        if self.state == SamuraiState::Shooting && advance == FrameAdvance::Advanced(RELEASE_FRAME)
        {
            self.loose_arrow(ctx.effects);
        }
        if self.state == SamuraiState::CounterStance
            && self.clock.display_frame() >= STANCE_HOLD_FRAME
        {
            self.clock.jump_to(STANCE_HOLD_FRAME);
            self.clock.freeze();
        }

        self.trail.fade(dt);
        update_volley(&mut self.arrows, dt, ctx.world.width);
        self.refresh_hitbox();
    }

    fn take_damage(
        &mut self,
        amount: i32,
        _source: Option<Vec2>,
        effects: &mut dyn EffectsSink,
    ) -> DamageOutcome {
        if self.state == SamuraiState::Dead {
            return DamageOutcome::Ignored;
        }

        self.body.health -= amount;
        self.flash.trigger(FLASH_DURATION);
        effects.blood_splatter(self.body.bounds().center());
        effects.play_sound(SoundCue::EnemyHurt);
        debug!("Samurai hit for {amount}, health {}", self.body.health);

        if self.body.health <= 0 {
            self.set_state(SamuraiState::Dead);
            self.refresh_hitbox();
            effects.play_sound(SoundCue::EnemyDeath);
            return DamageOutcome::Killed;
        }
        DamageOutcome::Absorbed
    }

    /// The Samurai does not walk; it appears at `target` and opens with
    /// a short idle.
    fn walk_in(&mut self, _start: Vec2, target: Vec2) {
        if self.state == SamuraiState::Dead {
            return;
        }
        self.body.set_position(target);
        self.rest(PatternPhase::Combo, 0.5);
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
        EnemyState::Samurai(self.state)
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
