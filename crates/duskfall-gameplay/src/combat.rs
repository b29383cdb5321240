//! Combat resolution.
//!
//! Runs once per tick after every actor has updated. This module provides:
//! - Player swing vs. enemy hurtboxes, gated by a swing cooldown
//! - Enemy hitboxes vs. the player hurtbox, once per hitbox activation
//! - Enemy projectiles vs. the player hurtbox
//!
//! Invulnerability lives with the defender: a hit on a rolling player or a
//! guarding Knight reports [`DamageOutcome::Ignored`] and has no effect.

use std::collections::HashSet;

use duskfall_common::EntityId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actor::{CombatActor, DamageOutcome};
use crate::config::EncounterConfig;
use crate::effects::EffectsSink;
use crate::enemies::Enemy;
use crate::player::PlayerCombatant;

/// An enemy tracked by the encounter, with a stable identity.
#[derive(Debug, Clone)]
pub struct Combatant {
    /// Identity used by combat bookkeeping and events
    pub id: EntityId,
    /// The enemy itself
    pub enemy: Enemy,
}

impl Combatant {
    /// Wraps an enemy under a fresh ID.
    #[must_use]
    pub fn new(enemy: impl Into<Enemy>) -> Self {
        Self {
            id: EntityId::new(),
            enemy: enemy.into(),
        }
    }
}

/// What the resolver applied during one pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// The player's swing reached an enemy
    EnemyStruck {
        /// Enemy hit
        enemy: EntityId,
        /// Damage dealt
        damage: i32,
        /// Enemy reaction
        outcome: DamageOutcome,
    },
    /// An enemy hitbox or projectile reached the player
    PlayerStruck {
        /// Enemy responsible
        source: EntityId,
        /// Damage dealt
        damage: i32,
        /// Player reaction
        outcome: DamageOutcome,
    },
}

/// Cross-actor hit detection with per-swing bookkeeping.
#[derive(Debug, Clone)]
pub struct CombatResolver {
    swing_cooldown: f32,
    swing_cooldown_remaining: f32,
    player_damage: i32,
    enemy_damage: i32,
    /// Enemies already hit by the current player swing
    swing_victims: HashSet<EntityId>,
    /// Enemies whose current hitbox activation already hit the player
    spent_activations: HashSet<EntityId>,
}

impl CombatResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(swing_cooldown: f32, player_damage: i32, enemy_damage: i32) -> Self {
        Self {
            swing_cooldown,
            swing_cooldown_remaining: 0.0,
            player_damage,
            enemy_damage,
            swing_victims: HashSet::new(),
            spent_activations: HashSet::new(),
        }
    }

    /// Creates a resolver tuned by `config`.
    #[must_use]
    pub fn from_config(config: &EncounterConfig) -> Self {
        Self::new(
            config.player_swing_cooldown,
            config.player_damage,
            config.enemy_damage,
        )
    }

    /// Time until the player's swing may register again.
    #[must_use]
    pub fn swing_cooldown_remaining(&self) -> f32 {
        self.swing_cooldown_remaining.max(0.0)
    }

    /// Drops bookkeeping for an enemy that left play.
    pub fn forget(&mut self, id: EntityId) {
        self.swing_victims.remove(&id);
        self.spent_activations.remove(&id);
    }

    /// Applies every hit of this tick.
    pub fn resolve(
        &mut self,
        dt: f32,
        player: &mut dyn PlayerCombatant,
        enemies: &mut [Combatant],
        effects: &mut dyn EffectsSink,
    ) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        if self.swing_cooldown_remaining > 0.0 {
            self.swing_cooldown_remaining -= dt;
        }

        self.resolve_swing(player, enemies, effects, &mut events);
        self.resolve_enemy_hitboxes(player, enemies, effects, &mut events);
        self.resolve_projectiles(player, enemies, effects, &mut events);
        events
    }

    fn resolve_swing(
        &mut self,
        player: &mut dyn PlayerCombatant,
        enemies: &mut [Combatant],
        effects: &mut dyn EffectsSink,
        events: &mut Vec<CombatEvent>,
    ) {
        if player.is_dead() || !player.is_attack_hitbox_active() {
            self.swing_victims.clear();
            return;
        }
        if self.swing_cooldown_remaining > 0.0 {
            return;
        }

        let swing = player.attack_box();
        let mut connected = false;
        for combatant in enemies.iter_mut() {
            let enemy = &mut combatant.enemy;
            if enemy.is_removed()
                || self.swing_victims.contains(&combatant.id)
                || !swing.collides_with(&enemy.bounds())
            {
                continue;
            }
            connected = true;
            self.swing_victims.insert(combatant.id);
            let outcome = enemy.take_damage(self.player_damage, Some(swing.center()), effects);
            debug!("Swing on {} -> {:?}", combatant.id, outcome);
            if outcome.landed() {
                events.push(CombatEvent::EnemyStruck {
                    enemy: combatant.id,
                    damage: self.player_damage,
                    outcome,
                });
            }
        }
        if connected {
            self.swing_cooldown_remaining = self.swing_cooldown;
        }
    }

    fn resolve_enemy_hitboxes(
        &mut self,
        player: &mut dyn PlayerCombatant,
        enemies: &[Combatant],
        effects: &mut dyn EffectsSink,
        events: &mut Vec<CombatEvent>,
    ) {
        for combatant in enemies {
            let enemy = &combatant.enemy;
            if enemy.is_removed() || !enemy.is_attack_hitbox_active() {
                self.spent_activations.remove(&combatant.id);
                continue;
            }
            if self.spent_activations.contains(&combatant.id)
                || !enemy.attack_box().collides_with(&player.bounds())
            {
                continue;
            }
            let outcome = player.take_damage(self.enemy_damage, enemy.direction(), effects);
            if outcome.landed() {
                self.spent_activations.insert(combatant.id);
                events.push(CombatEvent::PlayerStruck {
                    source: combatant.id,
                    damage: self.enemy_damage,
                    outcome,
                });
            }
        }
    }

    fn resolve_projectiles(
        &mut self,
        player: &mut dyn PlayerCombatant,
        enemies: &mut [Combatant],
        effects: &mut dyn EffectsSink,
        events: &mut Vec<CombatEvent>,
    ) {
        let target = player.bounds();
        for combatant in enemies.iter_mut() {
            for projectile in combatant.enemy.projectiles_mut() {
                if !projectile.strikes(&target) {
                    continue;
                }
                projectile.remove();
                let outcome = player.take_damage(self.enemy_damage, projectile.direction(), effects);
                if outcome.landed() {
                    events.push(CombatEvent::PlayerStruck {
                        source: combatant.id,
                        damage: self.enemy_damage,
                        outcome,
                    });
                }
            }
        }
    }
}
