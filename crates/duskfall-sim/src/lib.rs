//! # Duskfall Sim
//!
//! Headless runner for Duskfall encounters: loads `duskfall.toml`, drives
//! the player with a scripted autopilot at a fixed timestep, logs the event
//! stream and optionally saves the final snapshot as JSON.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod autopilot;
pub mod config;
pub mod runner;
pub mod save;
pub mod timing;

pub use autopilot::{Autopilot, Hazard};
pub use config::{SimConfig, CONFIG_FILE};
pub use runner::{RunSummary, Simulation, TracingEffects};
pub use save::{read_save, write_save, SaveError, SaveFile, SaveResult, SAVE_VERSION};
pub use timing::StepClock;
