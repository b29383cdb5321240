//! Encounter tuning.
//!
//! Provides the playfield dimensions and the knobs of the ordinary enemy
//! cycle. Configuration is plain data loaded from RON; every field has a
//! default so partial files are accepted.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Errors raised while loading encounter configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse RON.
    #[error("Failed to parse encounter config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// A field holds a value the simulation cannot run with.
    #[error("Invalid encounter config: {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Playfield dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Viewport width; patrol bounce and clamping use it
    pub width: f32,
    /// Viewport height; falling coins are culled past it
    pub height: f32,
    /// Y of the floor; ground-locked actors stand on it
    pub ground_y: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 480.0,
            ground_y: 384.0,
        }
    }
}

impl WorldBounds {
    /// Creates world bounds.
    #[must_use]
    pub fn new(width: f32, height: f32, ground_y: f32) -> Self {
        Self {
            width,
            height,
            ground_y,
        }
    }

    /// Horizontal center of the playfield.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    /// Top-left y at which an actor of `height` stands on the floor.
    #[must_use]
    pub fn standing_y(&self, height: f32) -> f32 {
        self.ground_y - height
    }
}

/// Tuning for an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Playfield dimensions
    pub world: WorldBounds,
    /// Maximum enemies alive at once in the ordinary cycle
    pub max_live_enemies: usize,
    /// Seconds between a removal and the next spawn
    pub respawn_delay: f32,
    /// Seconds between coin drops (ordinary cycle only)
    pub coin_interval: f32,
    /// Seconds between two player swings registering
    pub player_swing_cooldown: f32,
    /// Damage dealt to the player by one enemy hitbox activation or arrow
    pub enemy_damage: i32,
    /// Damage dealt to an enemy by one player swing
    pub player_damage: i32,
    /// Player starting health
    pub player_health: i32,
    /// Random seed for attack choice, trail tints and coin drops
    pub seed: u64,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            world: WorldBounds::default(),
            max_live_enemies: 1,
            respawn_delay: 1.0,
            coin_interval: 1.0,
            player_swing_cooldown: 0.5,
            enemy_damage: 1,
            player_damage: 1,
            player_health: 5,
            seed: 0x00D5_CFA1,
        }
    }
}

impl EncounterConfig {
    /// Parses a RON document and validates it.
    pub fn from_ron(source: &str) -> ConfigResult<Self> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to pretty RON.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });

        if self.world.width <= 0.0 {
            return invalid("world.width", "must be positive");
        }
        if self.world.height <= 0.0 {
            return invalid("world.height", "must be positive");
        }
        if self.world.ground_y <= 0.0 || self.world.ground_y > self.world.height {
            return invalid("world.ground_y", "must lie inside the playfield");
        }
        if self.max_live_enemies == 0 {
            return invalid("max_live_enemies", "must be at least 1");
        }
        if self.respawn_delay < 0.0 {
            return invalid("respawn_delay", "must not be negative");
        }
        if self.coin_interval <= 0.0 {
            return invalid("coin_interval", "must be positive");
        }
        if self.player_swing_cooldown < 0.0 {
            return invalid("player_swing_cooldown", "must not be negative");
        }
        if self.player_health <= 0 {
            return invalid("player_health", "must be positive");
        }
        if self.enemy_damage < 0 || self.player_damage < 0 {
            return invalid("damage", "must not be negative");
        }
        if self.max_live_enemies > 2 {
            warn!(
                "max_live_enemies = {} exceeds the intended one or two",
                self.max_live_enemies
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EncounterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.width, 800.0);
        assert_eq!(config.max_live_enemies, 1);
        assert_eq!(config.player_swing_cooldown, 0.5);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = EncounterConfig::from_ron("(max_live_enemies: 2, seed: 7)").unwrap();
        assert_eq!(config.max_live_enemies, 2);
        assert_eq!(config.seed, 7);
        assert_eq!(config.coin_interval, 1.0);
    }

    #[test]
    fn test_ron_round_trip() {
        let config = EncounterConfig {
            respawn_delay: 2.5,
            ..EncounterConfig::default()
        };
        let text = config.to_ron().unwrap();
        assert_eq!(EncounterConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = EncounterConfig::from_ron("(max_live_enemies: 0)").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "max_live_enemies",
                ..
            }
        ));

        let mut config = EncounterConfig::default();
        config.world.ground_y = 1000.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            EncounterConfig::from_ron("(max_live_enemies: \"two\")"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_world_helpers() {
        let world = WorldBounds::default();
        assert_eq!(world.center_x(), 400.0);
        assert_eq!(world.standing_y(100.0), 284.0);
    }
}
