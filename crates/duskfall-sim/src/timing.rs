//! Fixed-step timing.
//!
//! The encounter always advances in equal steps. In realtime mode the
//! runner measures wall-clock time and converts it into a number of fixed
//! steps; headless runs skip the clock and step flat out.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Most steps taken for one wall-clock frame before dropping time.
const MAX_STEPS_PER_FRAME: u32 = 10;

/// Longest wall-clock delta accepted for one frame.
const MAX_FRAME_DT: f32 = 0.25;

/// Converts wall-clock time into fixed simulation steps.
#[derive(Debug)]
pub struct StepClock {
    /// Fixed simulation step
    fixed_dt: f32,
    /// Unconsumed wall-clock time
    accumulator: f32,
    /// Time of last frame start
    last_frame: Instant,
    /// Steps taken so far
    steps: u64,
    /// Recent step costs in seconds, for reporting
    step_costs: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl StepClock {
    /// Creates a clock stepping every `fixed_dt` seconds.
    #[must_use]
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            fixed_dt: fixed_dt.max(0.001),
            accumulator: 0.0,
            last_frame: Instant::now(),
            steps: 0,
            step_costs: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// The fixed step.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Steps taken so far.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Continues counting from a step total reached in an earlier run.
    pub fn resume_at(&mut self, steps: u64) {
        self.steps = steps;
    }

    /// Simulated seconds covered by the steps taken.
    #[must_use]
    pub fn simulated_seconds(&self) -> f32 {
        self.steps as f32 * self.fixed_dt
    }

    /// Measures wall-clock time since the previous call, clamped to avoid a
    /// catch-up spiral.
    pub fn frame_delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        dt.min(MAX_FRAME_DT)
    }

    /// Adds `dt` of elapsed time and returns how many fixed steps are due.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt;
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < MAX_STEPS_PER_FRAME {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // Still behind: drop the backlog.
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        count
    }

    /// Records one completed step and how long it took to compute.
    pub fn record_step(&mut self, cost: Duration) {
        self.steps += 1;
        self.step_costs.push_back(cost.as_secs_f32());
        if self.step_costs.len() > self.max_samples {
            self.step_costs.pop_front();
        }
    }

    /// Average step cost in milliseconds over recent steps.
    #[must_use]
    pub fn average_step_ms(&self) -> f32 {
        if self.step_costs.is_empty() {
            return 0.0;
        }

        (self.step_costs.iter().sum::<f32>() / self.step_costs.len() as f32) * 1000.0
    }

    /// Sleeps until roughly one fixed step has passed since the frame
    /// started.
    pub fn sleep_remainder(&self) {
        let budget = Duration::from_secs_f32(self.fixed_dt);
        let elapsed = self.last_frame.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_clock_creation() {
        let clock = StepClock::new(1.0 / 60.0);
        assert!((clock.fixed_dt() - 1.0 / 60.0).abs() < 0.001);
        assert_eq!(clock.steps(), 0);

        let clamped = StepClock::new(0.0);
        assert!(clamped.fixed_dt() > 0.0);
    }

    #[test]
    fn test_accumulate_counts_whole_steps() {
        let mut clock = StepClock::new(0.01);
        assert_eq!(clock.accumulate(0.025), 2);
        assert_eq!(clock.accumulate(0.004), 0);
        assert_eq!(clock.accumulate(0.002), 1);
    }

    #[test]
    fn test_accumulate_spiral_prevention() {
        let mut clock = StepClock::new(1.0 / 60.0);
        let updates = clock.accumulate(1.0);
        assert!(updates <= MAX_STEPS_PER_FRAME);
        assert_eq!(clock.accumulate(0.0), 0);
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut clock = StepClock::new(1.0 / 60.0);
        std::thread::sleep(Duration::from_millis(300));
        assert!(clock.frame_delta() <= MAX_FRAME_DT);
    }

    #[test]
    fn test_record_step_tracks_progress() {
        let mut clock = StepClock::new(0.5);
        clock.record_step(Duration::from_millis(2));
        clock.record_step(Duration::from_millis(4));
        assert_eq!(clock.steps(), 2);
        assert!((clock.simulated_seconds() - 1.0).abs() < f32::EPSILON);
        assert!((clock.average_step_ms() - 3.0).abs() < 0.01);

        clock.resume_at(10);
        assert_eq!(clock.steps(), 10);
        assert!((clock.simulated_seconds() - 5.0).abs() < f32::EPSILON);
    }
}
