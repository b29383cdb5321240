//! # Duskfall Gameplay
//!
//! Combat core for a side-view 2D action game.
//!
//! This crate provides the simulation layer beneath any renderer:
//! - Frame-indexed sprite animation clocks
//! - The player controller (run, roll, attack, hurt, death)
//! - Enemy state machines: Minotaur, Skeleton, Samurai and Knight bosses
//! - Projectiles, coins and after-image trails
//! - Combat resolution between the player and live enemies
//! - The encounter director (spawn cycle, boss fights, scoring)
//! - Snapshots and an event bus for observers
//!
//! Everything advances on an explicit `dt`; presentation is reported back
//! through [`EffectsSink`] and [`SpriteRequest`] values.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod actor;
pub mod animation;
pub mod coin;
pub mod combat;
pub mod config;
pub mod effects;
pub mod encounter;
pub mod enemies;
pub mod events;
pub mod frames;
pub mod player;
pub mod projectile;
pub mod snapshot;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::actor::*;
    pub use crate::animation::*;
    pub use crate::coin::*;
    pub use crate::combat::*;
    pub use crate::config::*;
    pub use crate::effects::*;
    pub use crate::encounter::*;
    pub use crate::enemies::*;
    pub use crate::events::*;
    pub use crate::frames::*;
    pub use crate::player::*;
    pub use crate::projectile::*;
    pub use crate::snapshot::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_ron() {
        let config = EncounterConfig::default();
        let text = config.to_ron().expect("serialize");
        let back = EncounterConfig::from_ron(&text).expect("parse");
        assert_eq!(back, config);
    }

    #[test]
    fn test_encounter_runs_from_prelude() {
        let mut encounter =
            Encounter::new(EncounterConfig::default(), EncounterMode::Cycle).expect("valid");
        let mut effects = EffectLog::new();
        for _ in 0..60 {
            encounter.tick(1.0 / 60.0, PlayerInput::NONE, &mut effects);
        }
        assert_eq!(encounter.status(), EncounterStatus::Running);
        assert!(!encounter.render_requests().is_empty());
    }
}
