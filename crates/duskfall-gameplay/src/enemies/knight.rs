//! Knight: the final boss.
//!
//! Distance to the player picks the approach: far means run and strike,
//! mid means walk in and chain a three-hit combo. Both finishers leave the
//! Knight in a [`VulnerabilityWindow`]. Hits landed inside the window are
//! counted, and reaching the window's threshold sends the Knight into an
//! invulnerable Defend, followed by a jump away if the player is still
//! close.
//!
//! Attack clips use per-frame duration tables; hitbox frames are declared
//! in [`HITBOX_FRAMES`]. Attacks are planted in place.

use duskfall_common::{BoundingRectangle, Direction};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::{step_toward, EnemyKind, EnemyState};
use crate::actor::{
    ActorBody, CombatActor, DamageOutcome, HurtFlash, SpriteRequest, TickContext,
};
use crate::animation::{AnimationClip, AnimationClock};
use crate::effects::{EffectsSink, SoundCue};
use crate::frames::{window_active, FrameRange, FrameWindow};
use crate::snapshot::EnemySnapshot;

const FRAME_SIZE: f32 = 128.0;
const SCALE: f32 = 2.0;
const HEALTH: i32 = 10;
const CHASE_SPEED: f32 = 120.0;
const RUN_SPEED: f32 = 300.0;
const JUMP_SPEED: f32 = 250.0;
/// Center distance at which a walk turns into the combo.
pub const ATTACK_RANGE: f32 = 120.0;
/// Beyond this center distance the Knight runs instead of walking.
pub const RUN_RANGE: f32 = 300.0;
/// Center distance at which a run turns into the running attack.
pub const RUN_ATTACK_RANGE: f32 = 250.0;
/// After Defend, a player within this distance makes the Knight jump away.
pub const CLOSE_RANGE: f32 = 200.0;
const IDLE_WAIT: f32 = 0.5;
const DEFEND_DURATION: f32 = 3.0;
const FLASH_DURATION: f32 = 0.2;

/// Window opened by the running attack: duration, hits until Defend.
const RUN_ATTACK_WINDOW: (f32, u32) = (2.0, 1);
/// Window opened by the combo finisher.
const COMBO_WINDOW: (f32, u32) = (5.0, 2);

const IDLE: AnimationClip = AnimationClip::looping("knight_idle", 4, 0.15);
const WALK: AnimationClip = AnimationClip::looping("knight_walk", 8, 0.1);
const RUN: AnimationClip = AnimationClip::looping("knight_run", 7, 0.1);
const RUN_ATTACK: AnimationClip =
    AnimationClip::timed("knight_run_attack", &[0.08, 0.08, 0.1, 0.12, 0.12, 0.1]);
const COMBO1: AnimationClip = AnimationClip::timed("knight_attack1", &[0.1, 0.1, 0.08, 0.12, 0.1]);
const COMBO2: AnimationClip = AnimationClip::timed("knight_attack2", &[0.08, 0.1, 0.12, 0.1]);
const COMBO3: AnimationClip = AnimationClip::timed("knight_attack3", &[0.12, 0.1, 0.15, 0.15]);
const DEFEND: AnimationClip = AnimationClip::once("knight_defend", 5, 0.1);
const JUMP: AnimationClip = AnimationClip::once("knight_jump", 6, 0.1);
const HURT: AnimationClip = AnimationClip::once("knight_hurt", 2, 0.1);
const DEAD: AnimationClip = AnimationClip::once("knight_dead", 6, 0.15);

/// Knight behavioral modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnightState {
    /// Scripted entrance
    WalkingIn,
    /// Waiting
    Idle,
    /// Approaching at chase speed
    Walk,
    /// Closing a long gap
    Run,
    /// Running attack
    RunAttack,
    /// First combo hit
    ComboAttack1,
    /// Second combo hit
    ComboAttack2,
    /// Combo finisher
    ComboAttack3,
    /// Invulnerable guard
    Defend,
    /// Leap away from the player
    Jump,
    /// Flinching
    Hurt,
    /// Terminal
    Dead,
}

impl KnightState {
    fn clip(self) -> AnimationClip {
        match self {
            Self::WalkingIn | Self::Walk => WALK,
            Self::Idle => IDLE,
            Self::Run => RUN,
            Self::RunAttack => RUN_ATTACK,
            Self::ComboAttack1 => COMBO1,
            Self::ComboAttack2 => COMBO2,
            Self::ComboAttack3 => COMBO3,
            Self::Defend => DEFEND,
            Self::Jump => JUMP,
            Self::Hurt => HURT,
            Self::Dead => DEAD,
        }
    }

    /// States in which the Knight turns to track the player.
    fn tracks_player(self) -> bool {
        matches!(self, Self::Idle | Self::Walk | Self::Run)
    }
}

/// Frames carrying a live hitbox.
pub const HITBOX_FRAMES: &[FrameWindow<KnightState>] = &[
    FrameWindow::new(KnightState::ComboAttack1, FrameRange::single(3)),
    FrameWindow::new(KnightState::ComboAttack2, FrameRange::single(2)),
    FrameWindow::new(KnightState::ComboAttack3, FrameRange::single(2)),
    FrameWindow::new(KnightState::RunAttack, FrameRange::span(3, 4)),
];

/// Post-attack stagger window.
///
/// Hits landed while the window is open are counted; reaching the
/// threshold overrides the timer and forces a Defend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VulnerabilityWindow {
    remaining: f32,
    hits: u32,
    threshold: u32,
}

impl VulnerabilityWindow {
    /// Opens a window of `duration` seconds that breaks after `threshold`
    /// hits.
    #[must_use]
    pub fn open(duration: f32, threshold: u32) -> Self {
        Self {
            remaining: duration,
            hits: 0,
            threshold,
        }
    }

    /// Time left.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Hits counted so far.
    #[must_use]
    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Hits that force a Defend.
    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Counts a hit. Returns true once the threshold is reached.
    pub fn register_hit(&mut self) -> bool {
        self.hits += 1;
        self.hits >= self.threshold
    }

    /// Runs the timer down. Returns true once it expired.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

/// The Knight.
#[derive(Debug, Clone)]
pub struct Knight {
    body: ActorBody,
    state: KnightState,
    clock: AnimationClock,
    state_timer: f32,
    window: Option<VulnerabilityWindow>,
    invulnerable: bool,
    walk_in_target: Option<f32>,
    flash: HurtFlash,
    attack_box: BoundingRectangle,
    hitbox_active: bool,
}

impl Default for Knight {
    fn default() -> Self {
        Self::new()
    }
}

impl Knight {
    /// Creates an idle Knight at the origin.
    #[must_use]
    pub fn new() -> Self {
        let mut knight = Self {
            body: ActorBody::new(HEALTH, SCALE, Vec2::splat(FRAME_SIZE), Vec2::new(0.3, 0.7)),
            state: KnightState::Idle,
            clock: AnimationClock::new(IDLE),
            state_timer: IDLE_WAIT,
            window: None,
            invulnerable: false,
            walk_in_target: None,
            flash: HurtFlash::default(),
            attack_box: BoundingRectangle::EMPTY,
            hitbox_active: false,
        };
        knight.refresh_hitbox();
        knight
    }

    pub(crate) fn restore(snapshot: &EnemySnapshot, state: KnightState) -> Self {
        let mut knight = Self::new();
        knight.body.set_position(snapshot.position);
        knight.body.set_direction(snapshot.direction);
        knight.body.health = snapshot.health;
        knight.enter(state);
        if snapshot.removed {
            knight.body.mark_removed();
        }
        knight.refresh_hitbox();
        knight
    }

    pub(crate) fn body(&self) -> &ActorBody {
        &self.body
    }

    /// Current state.
    #[must_use]
    pub fn current_state(&self) -> KnightState {
        self.state
    }

    /// The open vulnerability window, if any.
    #[must_use]
    pub fn vulnerability_window(&self) -> Option<&VulnerabilityWindow> {
        self.window.as_ref()
    }

    /// Whether the current play-once clip has run past its last frame.
    #[must_use]
    pub fn animation_finished(&self) -> bool {
        self.clock.is_finished()
    }

    /// Whether damage is currently ignored.
    #[must_use]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    /// Displayed animation frame.
    #[must_use]
    pub fn frame(&self) -> usize {
        self.clock.display_frame()
    }

    /// Places the Knight and sets its facing.
    pub fn place(&mut self, position: Vec2, direction: Direction) {
        self.body.set_position(position);
        self.body.set_direction(direction);
        self.refresh_hitbox();
    }

    /// Requests a transition.
    ///
    /// Rejected when dead or already in `state`. A flinch may only end in
    /// Idle, Defend or Dead.
    pub fn set_state(&mut self, state: KnightState) -> bool {
        if self.state == KnightState::Dead || self.state == state {
            return false;
        }
        if self.state == KnightState::Hurt
            && !matches!(
                state,
                KnightState::Idle | KnightState::Defend | KnightState::Dead
            )
        {
            return false;
        }
        self.enter(state);
        true
    }

    fn enter(&mut self, state: KnightState) {
        trace!("Knight {:?} -> {:?}", self.state, state);
        self.state = state;
        self.clock.play(state.clip());
        self.hitbox_active = false;
        self.invulnerable = state == KnightState::Defend;
        self.state_timer = match state {
            KnightState::Idle => IDLE_WAIT,
            KnightState::Defend => DEFEND_DURATION,
            _ => 0.0,
        };
    }

    fn open_window(&mut self, (duration, threshold): (f32, u32)) {
        self.window = Some(VulnerabilityWindow::open(duration, threshold));
        self.set_state(KnightState::Idle);
        debug!("Knight vulnerable for {duration}s, breaks after {threshold} hits");
    }

    fn advance_toward_facing(&mut self, speed: f32, dt: f32) {
        self.body
            .translate_x(self.body.direction().sign() * speed * dt);
    }

    fn refresh_hitbox(&mut self) {
        let scale = self.body.scale();
        let width = 100.0 * scale;
        let height = 50.0 * scale;
        let x_offset = match self.body.direction() {
            Direction::Right => 60.0 * scale,
            Direction::Left => self.body.width() - 60.0 * scale - width,
        };
        let position = self.body.position();
        self.attack_box =
            BoundingRectangle::new(position.x + x_offset, position.y + 50.0 * scale, width, height);
        self.hitbox_active = window_active(HITBOX_FRAMES, &self.state, self.clock.display_frame());
    }

    fn behave(&mut self, dt: f32, distance: Option<f32>) {
        match self.state {
            KnightState::WalkingIn => {
                let arrived = match self.walk_in_target {
                    Some(target_x) => step_toward(&mut self.body, target_x, CHASE_SPEED, dt),
                    None => true,
                };
                if arrived {
                    self.walk_in_target = None;
                    self.set_state(KnightState::Idle);
                }
            },
            KnightState::Idle => {
                if self.window.is_none() && distance.is_some() {
                    self.state_timer -= dt;
                    if self.state_timer <= 0.0 {
                        self.set_state(KnightState::Walk);
                    }
                }
            },
            KnightState::Walk => match distance {
                None => {
                    self.set_state(KnightState::Idle);
                },
                Some(d) if d > RUN_RANGE => {
                    self.set_state(KnightState::Run);
                },
                Some(d) if d <= ATTACK_RANGE => {
                    self.set_state(KnightState::ComboAttack1);
                },
                Some(_) => self.advance_toward_facing(CHASE_SPEED, dt),
            },
            KnightState::Run => match distance {
                None => {
                    self.set_state(KnightState::Idle);
                },
                Some(d) if d <= RUN_ATTACK_RANGE => {
                    self.set_state(KnightState::RunAttack);
                },
                Some(_) => self.advance_toward_facing(RUN_SPEED, dt),
            },
            KnightState::RunAttack => {
                if self.clock.is_finished() {
                    self.open_window(RUN_ATTACK_WINDOW);
                }
            },
            KnightState::ComboAttack1 => {
                if self.clock.is_finished() {
                    self.set_state(KnightState::ComboAttack2);
                }
            },
            KnightState::ComboAttack2 => {
                if self.clock.is_finished() {
                    self.set_state(KnightState::ComboAttack3);
                }
            },
            KnightState::ComboAttack3 => {
                if self.clock.is_finished() {
                    self.open_window(COMBO_WINDOW);
                }
            },
            KnightState::Defend => {
                self.state_timer -= dt;
                if self.state_timer <= 0.0 {
                    let next = match distance {
                        Some(d) if d <= CLOSE_RANGE => KnightState::Jump,
                        _ => KnightState::Walk,
                    };
                    self.set_state(next);
                }
            },
            KnightState::Jump => {
                let away = self.body.direction().flipped();
                self.body.translate_x(away.sign() * JUMP_SPEED * dt);
                if self.clock.is_finished() {
                    self.set_state(KnightState::Walk);
                }
            },
            KnightState::Hurt => {
                if self.clock.is_finished() {
                    self.set_state(KnightState::Idle);
                }
            },
            KnightState::Dead => {},
        }
    }
}

impl CombatActor for Knight {
    fn kind(&self) -> EnemyKind {
        EnemyKind::Knight
    }

    fn update(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        if self.body.is_removed() {
            return;
        }
        self.flash.tick(dt);

        if self.state == KnightState::Dead {
            self.clock.advance(dt);
            if self.clock.is_finished() {
                self.body.mark_removed();
                info!("Knight defeated");
            }
            self.refresh_hitbox();
            return;
        }

        if let Some(window) = self.window.as_mut() {
            if window.tick(dt) {
                self.window = None;
                self.set_state(KnightState::Walk);
                debug!("Knight vulnerability window closed");
            }
        }

        let player = ctx.live_player();
        let distance = player.map(|p| p.bounds().center().distance(self.body.bounds().center()));
        if let Some(player) = player {
            if self.state.tracks_player() {
                let own_x = self.body.bounds().center().x;
                let target_x = player.bounds().center().x;
                self.body.set_direction(Direction::toward(own_x, target_x));
            }
        }

        self.behave(dt, distance);
        if self.state != KnightState::WalkingIn {
            self.body.clamp_to_world(ctx.world.width);
        }

        self.clock.advance(dt);
        self.refresh_hitbox();
    }

    fn take_damage(
        &mut self,
        amount: i32,
        _source: Option<Vec2>,
        effects: &mut dyn EffectsSink,
    ) -> DamageOutcome {
        if self.invulnerable
            || matches!(self.state, KnightState::Dead | KnightState::WalkingIn)
        {
            return DamageOutcome::Ignored;
        }

        self.body.health -= amount;
        self.flash.trigger(FLASH_DURATION);
        effects.blood_splatter(self.body.bounds().center());
        effects.play_sound(SoundCue::EnemyHurt);
        debug!("Knight hit for {amount}, health {}", self.body.health);

        if self.body.health <= 0 {
            self.window = None;
            self.set_state(KnightState::Dead);
            self.refresh_hitbox();
            effects.play_sound(SoundCue::EnemyDeath);
            return DamageOutcome::Killed;
        }

        let outcome = match self.window.as_mut() {
            Some(window) => {
                if window.register_hit() {
                    self.window = None;
                    self.set_state(KnightState::Defend);
                    DamageOutcome::Defended
                } else {
                    self.set_state(KnightState::Hurt);
                    DamageOutcome::Hurt
                }
            },
            None => match self.state {
                KnightState::Idle | KnightState::Walk | KnightState::Run => {
                    self.set_state(KnightState::Hurt);
                    DamageOutcome::Hurt
                },
                _ => DamageOutcome::Absorbed,
            },
        };
        self.refresh_hitbox();
        outcome
    }

    fn walk_in(&mut self, start: Vec2, target: Vec2) {
        if self.state == KnightState::Dead {
            return;
        }
        self.body.set_position(start);
        self.body
            .set_direction(Direction::toward(start.x, target.x));
        self.walk_in_target = Some(target.x);
        self.window = None;
        self.enter(KnightState::WalkingIn);
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
        EnemyState::Knight(self.state)
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
}
