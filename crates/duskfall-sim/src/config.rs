//! Simulation runner configuration.
//!
//! Loaded from `duskfall.toml`. Every field has a default, and a missing or
//! unreadable file falls back to defaults with a warning.

use duskfall_gameplay::{EncounterConfig, EncounterMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "duskfall.toml";

/// Runner configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Timing ===
    /// Fixed simulation step in seconds
    pub timestep: f32,
    /// Number of fixed steps to run before stopping
    pub tick_budget: u32,
    /// Pace steps against the wall clock instead of running flat out
    pub realtime: bool,

    // === Encounter ===
    /// Which fight to run
    pub mode: EncounterMode,
    /// Encounter tuning; defaults apply when the table is absent
    pub encounter: Option<EncounterConfig>,

    // === Autopilot ===
    /// How eagerly the scripted player closes in and swings (0.0 - 1.0)
    pub aggressiveness: f32,

    // === Output ===
    /// Where to write the final snapshot as JSON (None = don't save)
    pub save_path: Option<PathBuf>,
    /// Snapshot to resume from instead of starting fresh
    pub resume_from: Option<PathBuf>,
    /// Log a progress line every this many steps (0 = never)
    pub report_interval: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            tick_budget: 60 * 60,
            realtime: false,

            mode: EncounterMode::Cycle,
            encounter: None,

            aggressiveness: 0.8,

            save_path: None,
            resume_from: None,
            report_interval: 600,
        }
    }
}

impl SimConfig {
    /// Load configuration from `duskfall.toml` in the working directory.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match toml::from_str::<Self>(&contents) {
            Ok(mut config) => {
                info!("Loaded config from {}", path.display());
                config.validate();
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp values to sensible ranges. An encounter table that fails
    /// validation is dropped in favor of defaults.
    pub fn validate(&mut self) {
        if self.timestep.is_nan() || self.timestep <= 0.0 {
            warn!("Timestep {} is not positive, using 1/60", self.timestep);
            self.timestep = 1.0 / 60.0;
        }
        self.timestep = self.timestep.clamp(0.001, 0.25);
        self.aggressiveness = self.aggressiveness.clamp(0.0, 1.0);

        if let Some(encounter) = &self.encounter {
            if let Err(e) = encounter.validate() {
                warn!("Ignoring encounter table: {e}");
                self.encounter = None;
            }
        }
    }

    /// Encounter tuning with defaults filled in.
    #[must_use]
    pub fn encounter_config(&self) -> EncounterConfig {
        self.encounter.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.mode, EncounterMode::Cycle);
        assert!((config.timestep - 1.0 / 60.0).abs() < f32::EPSILON);
        assert!(config.encounter.is_none());
        assert_eq!(config.encounter_config(), EncounterConfig::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SimConfig {
            timestep: -1.0,
            aggressiveness: 3.0,
            encounter: Some(EncounterConfig {
                max_live_enemies: 0,
                ..EncounterConfig::default()
            }),
            ..SimConfig::default()
        };

        config.validate();

        assert!((config.timestep - 1.0 / 60.0).abs() < f32::EPSILON);
        assert_eq!(config.aggressiveness, 1.0);
        assert!(config.encounter.is_none());
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join(CONFIG_FILE);

        let config = SimConfig {
            tick_budget: 900,
            mode: EncounterMode::Knight,
            encounter: Some(EncounterConfig {
                seed: 77,
                ..EncounterConfig::default()
            }),
            save_path: Some(PathBuf::from("out/run.json")),
            ..SimConfig::default()
        };

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = SimConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "mode = \"samurai\"\ntick_budget = 10\n").expect("write");

        let loaded = SimConfig::load_from(&config_path);
        assert_eq!(loaded.mode, EncounterMode::Samurai);
        assert_eq!(loaded.tick_budget, 10);
        assert_eq!(loaded.report_interval, SimConfig::default().report_interval);
    }

    #[test]
    fn test_config_load_missing_or_broken_file() {
        let config = SimConfig::load_from("/nonexistent/path/duskfall.toml");
        assert_eq!(config, SimConfig::default());

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "mode = [").expect("write");
        assert_eq!(SimConfig::load_from(&config_path), SimConfig::default());
    }
}
