//! Headless encounter runner.

use std::time::Instant;

use duskfall_gameplay::{
    DamageOutcome, EffectsSink, Encounter, EncounterMode, EncounterStatus, GameEvent, SoundCue,
};
use glam::Vec2;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::autopilot::Autopilot;
use crate::config::SimConfig;
use crate::save::{read_save, write_save, SaveFile};
use crate::timing::StepClock;

/// Effects sink that logs cues and keeps counts for the run summary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TracingEffects {
    /// Sound cues played
    pub sounds: u32,
    /// Blood splatters spawned
    pub splatters: u32,
    /// Screen shakes requested
    pub shakes: u32,
}

impl EffectsSink for TracingEffects {
    fn blood_splatter(&mut self, at: Vec2) {
        self.splatters += 1;
        trace!("Blood splatter at ({:.0}, {:.0})", at.x, at.y);
    }

    fn play_sound(&mut self, cue: SoundCue) {
        self.sounds += 1;
        trace!("Sound {cue:?}");
    }

    fn screen_shake(&mut self, intensity: f32, duration: f32) {
        self.shakes += 1;
        trace!("Screen shake {intensity} for {duration}s");
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Fight that ran
    pub mode: EncounterMode,
    /// Final status
    pub status: EncounterStatus,
    /// Fixed steps taken
    pub steps: u64,
    /// Simulated seconds
    pub simulated_seconds: f32,
    /// Coins collected
    pub score: u32,
    /// Enemies killed
    pub kills: u32,
    /// Hits that landed on enemies
    pub hits_landed: u32,
    /// Hits the player took
    pub hits_taken: u32,
    /// Player health at the end
    pub player_health: i32,
}

/// A configured encounter driven by the autopilot.
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    encounter: Encounter,
    autopilot: Autopilot,
    clock: StepClock,
    effects: TracingEffects,
    kills: u32,
    hits_landed: u32,
    hits_taken: u32,
}

impl Simulation {
    /// Builds a fresh encounter, or resumes one when `resume_from` is set.
    pub fn new(config: SimConfig) -> anyhow::Result<Self> {
        let encounter_config = config.encounter_config();
        let (encounter, steps) = match &config.resume_from {
            Some(path) => {
                let save = read_save(path)?;
                info!(
                    "Resuming {:?} encounter from {}",
                    save.snapshot.mode,
                    path.display()
                );
                (
                    Encounter::from_snapshot(encounter_config, &save.snapshot)?,
                    save.steps,
                )
            },
            None => (Encounter::new(encounter_config, config.mode)?, 0),
        };

        let mut clock = StepClock::new(config.timestep);
        clock.resume_at(steps);

        Ok(Self {
            autopilot: Autopilot::new(config.aggressiveness),
            config,
            encounter,
            clock,
            effects: TracingEffects::default(),
            kills: 0,
            hits_landed: 0,
            hits_taken: 0,
        })
    }

    /// The encounter being run.
    #[must_use]
    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    /// Cosmetic effect counts so far.
    #[must_use]
    pub fn effects(&self) -> &TracingEffects {
        &self.effects
    }

    /// Advances one fixed step. Returns the encounter status afterwards.
    pub fn step(&mut self) -> EncounterStatus {
        let started = Instant::now();
        let dt = self.clock.fixed_dt();

        let input = self.autopilot.decide(dt, &self.encounter);
        let status = self.encounter.tick(dt, input, &mut self.effects);
        for event in self.encounter.events().drain() {
            self.record(&event);
        }

        self.clock.record_step(started.elapsed());
        status
    }

    /// Runs until the encounter ends or the tick budget is spent, then
    /// writes the save if one is configured.
    pub fn run(&mut self) -> anyhow::Result<RunSummary> {
        info!(
            "Running {:?} encounter for up to {} steps of {:.4}s",
            self.encounter.mode(),
            self.config.tick_budget,
            self.clock.fixed_dt()
        );

        let mut status = self.encounter.status();
        let mut remaining = self.config.tick_budget;
        while remaining > 0 && status == EncounterStatus::Running {
            let due = if self.config.realtime {
                self.clock.sleep_remainder();
                let dt = self.clock.frame_delta();
                self.clock.accumulate(dt).min(remaining)
            } else {
                1
            };

            for _ in 0..due {
                status = self.step();
                remaining -= 1;
                self.report_progress();
                if status != EncounterStatus::Running {
                    break;
                }
            }
        }

        let summary = self.summary();
        info!(
            "Encounter finished: {:?} after {:.1}s, score {}, kills {}",
            summary.status, summary.simulated_seconds, summary.score, summary.kills
        );

        if let Some(path) = &self.config.save_path {
            let save = SaveFile::new(self.clock.steps(), self.encounter.snapshot());
            write_save(path, &save)?;
        }

        Ok(summary)
    }

    /// Current run statistics.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            mode: self.encounter.mode(),
            status: self.encounter.status(),
            steps: self.clock.steps(),
            simulated_seconds: self.clock.simulated_seconds(),
            score: self.encounter.score(),
            kills: self.kills,
            hits_landed: self.hits_landed,
            hits_taken: self.hits_taken,
            player_health: self.encounter.player().health(),
        }
    }

    fn report_progress(&self) {
        let interval = u64::from(self.config.report_interval);
        if interval == 0 || self.clock.steps() % interval != 0 {
            return;
        }
        info!(
            "Step {}: {} enemies, score {}, player health {}, {:.3}ms/step",
            self.clock.steps(),
            self.encounter.enemies().len(),
            self.encounter.score(),
            self.encounter.player().health(),
            self.clock.average_step_ms()
        );
    }

    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::EnemySpawned { enemy, kind } => {
                debug!("{kind:?} {enemy} entering");
            },
            GameEvent::EnemyDamaged {
                enemy,
                damage,
                outcome,
                health,
            } => {
                self.hits_landed += 1;
                debug!("{enemy} took {damage} ({outcome:?}), {health} left");
                if *outcome == DamageOutcome::Killed {
                    self.kills += 1;
                }
            },
            GameEvent::EnemyDied { enemy, kind } => {
                debug!("{kind:?} {enemy} died");
            },
            GameEvent::EnemyRemoved { enemy } => {
                trace!("{enemy} removed");
            },
            GameEvent::PlayerDamaged {
                damage,
                health,
                source,
            } => {
                self.hits_taken += 1;
                debug!("Player took {damage} from {source}, {health} left");
            },
            GameEvent::PlayerDied => info!("Player died"),
            GameEvent::CoinCollected { score, .. } => {
                debug!("Coin collected, score {score}");
            },
            GameEvent::EncounterComplete { boss } => info!("{boss:?} defeated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duskfall_gameplay::EncounterConfig;
    use tempfile::TempDir;

    fn config(mode: EncounterMode, budget: u32) -> SimConfig {
        SimConfig {
            mode,
            tick_budget: budget,
            report_interval: 0,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_run_respects_tick_budget() {
        let mut sim = Simulation::new(config(EncounterMode::Cycle, 120)).expect("sim");
        let summary = sim.run().expect("run");
        assert!(summary.steps <= 120);
        if summary.status == EncounterStatus::Running {
            assert_eq!(summary.steps, 120);
        }
        assert!((summary.simulated_seconds - summary.steps as f32 / 60.0).abs() < 0.01);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed| {
            let cfg = SimConfig {
                encounter: Some(EncounterConfig {
                    seed,
                    ..EncounterConfig::default()
                }),
                ..config(EncounterMode::Samurai, 600)
            };
            let mut sim = Simulation::new(cfg).expect("sim");
            sim.run().expect("run");
            sim.encounter().snapshot()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_run_writes_and_resumes_save() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let save_path = temp_dir.path().join("run.json");

        let cfg = SimConfig {
            save_path: Some(save_path.clone()),
            ..config(EncounterMode::Knight, 90)
        };
        let mut sim = Simulation::new(cfg).expect("sim");
        sim.run().expect("run");
        let saved = sim.encounter().snapshot();
        assert!(save_path.exists());

        let resumed = Simulation::new(SimConfig {
            resume_from: Some(save_path),
            ..config(EncounterMode::Cycle, 10)
        })
        .expect("resume");
        assert_eq!(resumed.encounter().mode(), EncounterMode::Knight);
        assert_eq!(resumed.encounter().snapshot(), saved);
        assert_eq!(resumed.summary().steps, sim.summary().steps);
    }

    #[test]
    fn test_tracing_effects_count() {
        let mut effects = TracingEffects::default();
        effects.play_sound(SoundCue::CoinPickup);
        effects.blood_splatter(Vec2::ZERO);
        effects.screen_shake(1.0, 0.2);
        assert_eq!(
            effects,
            TracingEffects {
                sounds: 1,
                splatters: 1,
                shakes: 1,
            }
        );
    }
}
