//! Enemy state machines.
//!
//! Each enemy type is an independent finite state machine with its own
//! state enum and a typed `set_state`. The [`Enemy`] tagged union carries
//! them through orchestration and combat resolution via [`CombatActor`].

mod knight;
mod minotaur;
mod samurai;
mod skeleton;

pub use knight::{Knight, KnightState, VulnerabilityWindow};
pub use minotaur::{Minotaur, MinotaurState};
pub use samurai::{PatternPhase, Samurai, SamuraiState};
pub use skeleton::{Skeleton, SkeletonState};

use duskfall_common::{BoundingRectangle, Direction};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::actor::{
    ActorBody, AfterImage, CombatActor, DamageOutcome, SpriteRequest, TickContext,
};
use crate::effects::EffectsSink;
use crate::projectile::Projectile;
use crate::snapshot::{EnemySnapshot, SnapshotResult};

/// Speed of the scripted entrance (px/s).
pub const WALK_IN_SPEED: f32 = 150.0;

/// Enemy types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Melee brute of the ordinary cycle
    Minotaur,
    /// Archer of the ordinary cycle
    Skeleton,
    /// Mid-boss
    Samurai,
    /// Final boss
    Knight,
}

impl EnemyKind {
    /// Whether this kind runs as a single scripted boss.
    #[must_use]
    pub fn is_boss(self) -> bool {
        matches!(self, Self::Samurai | Self::Knight)
    }
}

/// Type-erased state of any enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state")]
pub enum EnemyState {
    /// Minotaur state
    Minotaur(MinotaurState),
    /// Skeleton state
    Skeleton(SkeletonState),
    /// Samurai state
    Samurai(SamuraiState),
    /// Knight state
    Knight(KnightState),
}

impl EnemyState {
    /// Enemy type the state belongs to.
    #[must_use]
    pub fn kind(self) -> EnemyKind {
        match self {
            Self::Minotaur(_) => EnemyKind::Minotaur,
            Self::Skeleton(_) => EnemyKind::Skeleton,
            Self::Samurai(_) => EnemyKind::Samurai,
            Self::Knight(_) => EnemyKind::Knight,
        }
    }

    /// Whether this is the terminal Dead state.
    #[must_use]
    pub fn is_dead(self) -> bool {
        matches!(
            self,
            Self::Minotaur(MinotaurState::Dead)
                | Self::Skeleton(SkeletonState::Dead)
                | Self::Samurai(SamuraiState::Dead)
                | Self::Knight(KnightState::Dead)
        )
    }
}

/// Moves `body` horizontally towards `target_x` at `speed`.
/// Returns true once the target is reached; never overshoots.
pub(crate) fn step_toward(body: &mut ActorBody, target_x: f32, speed: f32, dt: f32) -> bool {
    let position = body.position();
    let gap = target_x - position.x;
    let step = speed * dt;
    if gap.abs() <= step {
        body.set_position(Vec2::new(target_x, position.y));
        return true;
    }
    body.translate_x(gap.signum() * step);
    false
}

/// Any enemy.
#[derive(Debug, Clone)]
pub enum Enemy {
    /// Minotaur
    Minotaur(Minotaur),
    /// Skeleton
    Skeleton(Skeleton),
    /// Samurai
    Samurai(Samurai),
    /// Knight
    Knight(Knight),
}

macro_rules! each_enemy {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            Enemy::Minotaur($inner) => $body,
            Enemy::Skeleton($inner) => $body,
            Enemy::Samurai($inner) => $body,
            Enemy::Knight($inner) => $body,
        }
    };
}

impl Enemy {
    /// Creates a fresh enemy of `kind` at the origin.
    #[must_use]
    pub fn new(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Minotaur => Self::Minotaur(Minotaur::new()),
            EnemyKind::Skeleton => Self::Skeleton(Skeleton::new()),
            EnemyKind::Samurai => Self::Samurai(Samurai::new()),
            EnemyKind::Knight => Self::Knight(Knight::new()),
        }
    }

    /// Rebuilds an enemy from a snapshot.
    ///
    /// The instance enters the recorded state with that state's entry
    /// timers, at the recorded position, facing and health.
    pub fn from_snapshot(snapshot: &EnemySnapshot) -> SnapshotResult<Self> {
        snapshot.validate()?;
        Ok(match snapshot.state {
            EnemyState::Minotaur(state) => Self::Minotaur(Minotaur::restore(snapshot, state)),
            EnemyState::Skeleton(state) => Self::Skeleton(Skeleton::restore(snapshot, state)),
            EnemyState::Samurai(state) => Self::Samurai(Samurai::restore(snapshot, state)),
            EnemyState::Knight(state) => Self::Knight(Knight::restore(snapshot, state)),
        })
    }

    /// Requests a state change through the type's own guard.
    /// States of another enemy type are rejected.
    pub fn set_state(&mut self, state: EnemyState) -> bool {
        match (self, state) {
            (Self::Minotaur(e), EnemyState::Minotaur(s)) => e.set_state(s),
            (Self::Skeleton(e), EnemyState::Skeleton(s)) => e.set_state(s),
            (Self::Samurai(e), EnemyState::Samurai(s)) => e.set_state(s),
            (Self::Knight(e), EnemyState::Knight(s)) => e.set_state(s),
            _ => false,
        }
    }

    /// Places the enemy and sets its facing, outside any state rule.
    pub fn place(&mut self, position: Vec2, direction: Direction) {
        each_enemy!(self, e => e.place(position, direction));
    }

    /// Scaled sprite width.
    #[must_use]
    pub fn width(&self) -> f32 {
        each_enemy!(self, e => e.body().width())
    }

    /// Scaled sprite height.
    #[must_use]
    pub fn height(&self) -> f32 {
        each_enemy!(self, e => e.body().height())
    }

    /// The Minotaur, if this is one.
    #[must_use]
    pub fn as_minotaur(&self) -> Option<&Minotaur> {
        match self {
            Self::Minotaur(m) => Some(m),
            _ => None,
        }
    }

    /// The Skeleton, if this is one.
    #[must_use]
    pub fn as_skeleton(&self) -> Option<&Skeleton> {
        match self {
            Self::Skeleton(s) => Some(s),
            _ => None,
        }
    }

    /// The Samurai, if this is one.
    #[must_use]
    pub fn as_samurai(&self) -> Option<&Samurai> {
        match self {
            Self::Samurai(s) => Some(s),
            _ => None,
        }
    }

    /// The Knight, if this is one.
    #[must_use]
    pub fn as_knight(&self) -> Option<&Knight> {
        match self {
            Self::Knight(k) => Some(k),
            _ => None,
        }
    }
}

impl From<Minotaur> for Enemy {
    fn from(value: Minotaur) -> Self {
        Self::Minotaur(value)
    }
}

impl From<Skeleton> for Enemy {
    fn from(value: Skeleton) -> Self {
        Self::Skeleton(value)
    }
}

impl From<Samurai> for Enemy {
    fn from(value: Samurai) -> Self {
        Self::Samurai(value)
    }
}

impl From<Knight> for Enemy {
    fn from(value: Knight) -> Self {
        Self::Knight(value)
    }
}

impl CombatActor for Enemy {
    fn kind(&self) -> EnemyKind {
        each_enemy!(self, e => e.kind())
    }

    fn update(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        each_enemy!(self, e => e.update(dt, ctx));
    }

    fn take_damage(
        &mut self,
        amount: i32,
        source: Option<Vec2>,
        effects: &mut dyn EffectsSink,
    ) -> DamageOutcome {
        each_enemy!(self, e => e.take_damage(amount, source, effects))
    }

    fn walk_in(&mut self, start: Vec2, target: Vec2) {
        each_enemy!(self, e => e.walk_in(start, target));
    }

    fn bounds(&self) -> BoundingRectangle {
        each_enemy!(self, e => e.bounds())
    }

    fn attack_box(&self) -> BoundingRectangle {
        each_enemy!(self, e => e.attack_box())
    }

    fn is_attack_hitbox_active(&self) -> bool {
        each_enemy!(self, e => e.is_attack_hitbox_active())
    }

    fn position(&self) -> Vec2 {
        each_enemy!(self, e => e.position())
    }

    fn direction(&self) -> Direction {
        each_enemy!(self, e => e.direction())
    }

    fn health(&self) -> i32 {
        each_enemy!(self, e => e.health())
    }

    fn state(&self) -> EnemyState {
        each_enemy!(self, e => e.state())
    }

    fn is_removed(&self) -> bool {
        each_enemy!(self, e => e.is_removed())
    }

    fn sprite(&self) -> SpriteRequest {
        each_enemy!(self, e => e.sprite())
    }

    fn after_images(&self) -> &[AfterImage] {
        each_enemy!(self, e => e.after_images())
    }

    fn projectiles(&self) -> &[Projectile] {
        each_enemy!(self, e => e.projectiles())
    }

    fn projectiles_mut(&mut self) -> &mut [Projectile] {
        each_enemy!(self, e => e.projectiles_mut())
    }
}
