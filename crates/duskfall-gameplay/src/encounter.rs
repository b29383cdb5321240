//! Encounter orchestration.
//!
//! The director owns the player, the live enemies, coins, the combat
//! resolver and the random source. One [`Encounter::tick`] runs, in order:
//!
//! 1. capture the player's position for enemy AI
//! 2. player update from input
//! 3. every enemy update against the captured player
//! 4. combat resolution
//! 5. removals, respawns, boss completion
//! 6. coins (ordinary cycle only)
//!
//! The ordinary cycle alternates Minotaur and Skeleton, keeps at most
//! `max_live_enemies` alive, and brings each newcomer in through a walk-in
//! from the side away from the player. Boss modes run a single scripted
//! enemy and neither respawn nor drop coins.

use duskfall_common::EntityId;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::actor::{CombatActor, DamageOutcome, PlayerSample, PlayerView, SpriteRequest, TickContext};
use crate::coin::Coin;
use crate::combat::{CombatEvent, CombatResolver, Combatant};
use crate::config::{ConfigError, EncounterConfig, WorldBounds};
use crate::effects::{EffectsSink, SoundCue};
use crate::enemies::{Enemy, EnemyKind};
use crate::events::{EventBus, GameEvent};
use crate::player::{Player, PlayerInput};
use crate::projectile::Projectile;
use crate::snapshot::{EncounterSnapshot, SnapshotError};

/// Gap between a walk-in anchor and the screen edge.
pub const WALK_IN_MARGIN: f32 = 50.0;

/// Errors raised while building an encounter.
#[derive(Debug, Error)]
pub enum EncounterError {
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Snapshot rejected.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl From<EncounterError> for duskfall_common::DuskfallError {
    fn from(err: EncounterError) -> Self {
        match err {
            EncounterError::Config(e) => Self::Config(e.to_string()),
            EncounterError::Snapshot(e) => Self::Snapshot(e.to_string()),
        }
    }
}

/// Result type for encounter construction.
pub type EncounterResult<T> = Result<T, EncounterError>;

/// Which fight is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncounterMode {
    /// Alternating ordinary enemies with coin drops
    #[default]
    Cycle,
    /// Samurai boss fight
    Samurai,
    /// Knight boss fight
    Knight,
}

impl EncounterMode {
    /// Boss of this mode, if it is a boss fight.
    #[must_use]
    pub fn boss(self) -> Option<EnemyKind> {
        match self {
            Self::Cycle => None,
            Self::Samurai => Some(EnemyKind::Samurai),
            Self::Knight => Some(EnemyKind::Knight),
        }
    }
}

/// Next ordinary enemy to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NextSpawn {
    /// Minotaur comes next
    #[default]
    Minotaur,
    /// Skeleton comes next
    Skeleton,
}

impl NextSpawn {
    /// Enemy type to create.
    #[must_use]
    pub fn kind(self) -> EnemyKind {
        match self {
            Self::Minotaur => EnemyKind::Minotaur,
            Self::Skeleton => EnemyKind::Skeleton,
        }
    }

    /// The entry after this one.
    #[must_use]
    pub fn advance(self) -> Self {
        match self {
            Self::Minotaur => Self::Skeleton,
            Self::Skeleton => Self::Minotaur,
        }
    }
}

/// Where the encounter stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncounterStatus {
    /// Still being fought
    Running,
    /// The boss was defeated
    Victory,
    /// The player died
    Defeat,
}

/// The encounter director.
#[derive(Debug)]
pub struct Encounter {
    config: EncounterConfig,
    mode: EncounterMode,
    player: Player,
    enemies: Vec<Combatant>,
    coins: Vec<Coin>,
    resolver: CombatResolver,
    next_spawn: NextSpawn,
    respawn_timer: Option<f32>,
    coin_timer: f32,
    score: u32,
    status: EncounterStatus,
    elapsed: f32,
    rng: fastrand::Rng,
    bus: EventBus,
}

impl Encounter {
    /// Starts an encounter. The first enemy (or the boss) spawns at once.
    pub fn new(config: EncounterConfig, mode: EncounterMode) -> EncounterResult<Self> {
        let mut encounter = Self::build(config, mode)?;
        match mode.boss() {
            Some(boss) => {
                encounter.spawn(boss);
                info!("{boss:?} encounter started");
            },
            None => encounter.spawn_next(),
        }
        Ok(encounter)
    }

    /// Rebuilds an encounter from a snapshot.
    pub fn from_snapshot(
        config: EncounterConfig,
        snapshot: &EncounterSnapshot,
    ) -> EncounterResult<Self> {
        let mut encounter = Self::build(config, snapshot.mode)?;
        let world = encounter.config.world;
        encounter.player.set_x(snapshot.player_position.x, &world);
        encounter.player.set_health(snapshot.player_health);
        encounter.score = snapshot.score;
        encounter.next_spawn = snapshot.next_spawn;
        encounter.coins = snapshot.coins.iter().copied().map(Coin::new).collect();
        for enemy in &snapshot.enemies {
            let enemy = Enemy::from_snapshot(enemy)?;
            encounter.enemies.push(Combatant::new(enemy));
        }
        encounter.refresh_status();
        debug!(
            "Restored {:?} encounter with {} enemies",
            snapshot.mode,
            encounter.enemies.len()
        );
        Ok(encounter)
    }

    fn build(config: EncounterConfig, mode: EncounterMode) -> EncounterResult<Self> {
        config.validate()?;
        Ok(Self {
            player: Player::new(config.player_health, &config.world),
            resolver: CombatResolver::from_config(&config),
            rng: fastrand::Rng::with_seed(config.seed),
            config,
            mode,
            enemies: Vec::new(),
            coins: Vec::new(),
            next_spawn: NextSpawn::default(),
            respawn_timer: None,
            coin_timer: 0.0,
            score: 0,
            status: EncounterStatus::Running,
            elapsed: 0.0,
            bus: EventBus::default(),
        })
    }

    /// Exports the persisted state.
    #[must_use]
    pub fn snapshot(&self) -> EncounterSnapshot {
        EncounterSnapshot {
            mode: self.mode,
            player_position: self.player.position(),
            player_health: self.player.health(),
            score: self.score,
            next_spawn: self.next_spawn,
            enemies: self.enemies.iter().map(|c| c.enemy.snapshot()).collect(),
            coins: self.coins.iter().map(Coin::position).collect(),
        }
    }

    /// Advances the whole encounter by `dt`.
    pub fn tick(
        &mut self,
        dt: f32,
        input: PlayerInput,
        effects: &mut dyn EffectsSink,
    ) -> EncounterStatus {
        if self.status != EncounterStatus::Running {
            return self.status;
        }
        self.elapsed += dt;
        let world = self.config.world;

        let sample = PlayerSample::capture(&self.player);
        let view: &dyn PlayerView = &sample;
        self.player.update(dt, input, &world, effects);

        for combatant in &mut self.enemies {
            let mut ctx = TickContext::new(Some(view), &world, effects, &mut self.rng);
            combatant.enemy.update(dt, &mut ctx);
        }

        let hits = self
            .resolver
            .resolve(dt, &mut self.player, &mut self.enemies, effects);
        self.publish_hits(&hits);

        self.collect_removed();
        self.run_spawns(dt);
        if self.mode == EncounterMode::Cycle {
            self.run_coins(dt, effects);
        }

        self.refresh_status();
        self.status
    }

    fn publish_hits(&self, hits: &[CombatEvent]) {
        for hit in hits {
            match *hit {
                CombatEvent::EnemyStruck {
                    enemy,
                    damage,
                    outcome,
                } => {
                    let Some(target) = self.enemies.iter().find(|c| c.id == enemy) else {
                        continue;
                    };
                    self.bus.publish(GameEvent::EnemyDamaged {
                        enemy,
                        damage,
                        outcome,
                        health: target.enemy.health(),
                    });
                    if outcome == DamageOutcome::Killed {
                        debug!("{:?} {enemy} killed", target.enemy.kind());
                        self.bus.publish(GameEvent::EnemyDied {
                            enemy,
                            kind: target.enemy.kind(),
                        });
                    }
                },
                CombatEvent::PlayerStruck {
                    source,
                    damage,
                    outcome,
                } => {
                    self.bus.publish(GameEvent::PlayerDamaged {
                        damage,
                        health: self.player.health(),
                        source,
                    });
                    if outcome == DamageOutcome::Killed {
                        info!("Player died after {:.1}s", self.elapsed);
                        self.bus.publish(GameEvent::PlayerDied);
                    }
                },
            }
        }
    }

    fn collect_removed(&mut self) {
        let mut removed = Vec::new();
        self.enemies.retain(|c| {
            if c.enemy.is_removed() {
                removed.push((c.id, c.enemy.kind()));
                false
            } else {
                true
            }
        });

        for (id, kind) in removed {
            self.resolver.forget(id);
            self.bus.publish(GameEvent::EnemyRemoved { enemy: id });
            debug!("{kind:?} {id} removed");
            if kind.is_boss() {
                info!("{kind:?} defeated after {:.1}s", self.elapsed);
                self.bus.publish(GameEvent::EncounterComplete { boss: kind });
            }
        }
    }

    fn run_spawns(&mut self, dt: f32) {
        if self.mode != EncounterMode::Cycle {
            return;
        }
        if self.enemies.len() >= self.config.max_live_enemies {
            return;
        }
        match self.respawn_timer {
            None => self.respawn_timer = Some(self.config.respawn_delay),
            Some(remaining) if remaining - dt <= 0.0 => {
                self.respawn_timer = None;
                self.spawn_next();
            },
            Some(remaining) => self.respawn_timer = Some(remaining - dt),
        }
    }

    fn spawn_next(&mut self) {
        let kind = self.next_spawn.kind();
        self.next_spawn = self.next_spawn.advance();
        self.spawn(kind);
    }

    /// Creates an enemy off-screen on the side away from the player and
    /// walks it in to the matching anchor.
    fn spawn(&mut self, kind: EnemyKind) {
        let world = self.config.world;
        let mut enemy = Enemy::new(kind);
        let y = world.standing_y(enemy.height());
        let width = enemy.width();
        let from_right = self.player.bounds().center().x < world.center_x();
        let (start_x, target_x) = if from_right {
            (world.width, world.width - width - WALK_IN_MARGIN)
        } else {
            (-width, WALK_IN_MARGIN)
        };
        enemy.walk_in(Vec2::new(start_x, y), Vec2::new(target_x, y));

        let combatant = Combatant::new(enemy);
        debug!("{kind:?} {} spawned, walking in to x={target_x}", combatant.id);
        self.bus.publish(GameEvent::EnemySpawned {
            enemy: combatant.id,
            kind,
        });
        self.enemies.push(combatant);
    }

    fn run_coins(&mut self, dt: f32, effects: &mut dyn EffectsSink) {
        let world = self.config.world;
        self.coin_timer += dt;
        if self.coin_timer > self.config.coin_interval {
            self.coin_timer = 0.0;
            self.coins.push(Coin::spawn(&world, &mut self.rng));
        }

        let player_bounds = self.player.bounds();
        let player_alive = !self.player.is_dead();
        let mut collected = Vec::new();
        self.coins.retain_mut(|coin| {
            coin.update(dt);
            if player_alive && coin.touches(&player_bounds) {
                collected.push(coin.position());
                return false;
            }
            !coin.is_below(&world)
        });

        for at in collected {
            self.score += 1;
            effects.play_sound(SoundCue::CoinPickup);
            self.bus.publish(GameEvent::CoinCollected {
                at,
                score: self.score,
            });
        }
    }

    fn refresh_status(&mut self) {
        self.status = if self.player.is_dead() {
            EncounterStatus::Defeat
        } else if self.mode.boss().is_some() && self.enemies.is_empty() {
            EncounterStatus::Victory
        } else {
            EncounterStatus::Running
        };
    }

    /// Encounter mode.
    #[must_use]
    pub fn mode(&self) -> EncounterMode {
        self.mode
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> EncounterStatus {
        self.status
    }

    /// The player.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Live enemies in spawn order.
    #[must_use]
    pub fn enemies(&self) -> &[Combatant] {
        &self.enemies
    }

    /// Falling coins.
    #[must_use]
    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    /// Coins collected.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Next ordinary enemy type.
    #[must_use]
    pub fn next_spawn(&self) -> NextSpawn {
        self.next_spawn
    }

    /// Seconds until the pending spawn, if one is scheduled.
    #[must_use]
    pub fn respawn_timer(&self) -> Option<f32> {
        self.respawn_timer
    }

    /// Simulated time.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Playfield.
    #[must_use]
    pub fn world(&self) -> &WorldBounds {
        &self.config.world
    }

    /// Event stream.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// Looks up a live enemy.
    #[must_use]
    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|c| c.id == id).map(|c| &c.enemy)
    }

    /// Everything to draw this frame, back to front: coins, enemy trails,
    /// enemies, projectiles, player.
    #[must_use]
    pub fn render_requests(&self) -> Vec<SpriteRequest> {
        let mut requests: Vec<SpriteRequest> = self.coins.iter().map(Coin::sprite).collect();
        for combatant in &self.enemies {
            let enemy = &combatant.enemy;
            let base = enemy.sprite();
            requests.extend(enemy.after_images().iter().map(|image| SpriteRequest {
                position: image.position,
                frame: image.frame,
                flip: image.flip,
                tint: image.tint,
                alpha: image.alpha,
                ..base
            }));
            requests.push(base);
            requests.extend(enemy.projectiles().iter().map(Projectile::sprite));
        }
        requests.push(self.player.sprite());
        requests
    }
}
