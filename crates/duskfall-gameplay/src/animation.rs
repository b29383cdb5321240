//! Per-actor animation clock.
//!
//! This module provides:
//! - Animation clips: sheet name, frame count, frame timing, overflow policy
//! - Uniform and per-frame duration tables
//! - A clock that advances at most one frame per tick
//!
//! Overflow and remainder policy are chosen per clip. Looping clips wrap
//! to frame 0.
//! Holding clips let the frame counter reach `frames` (one past the end),
//! which is the "animation finished" signal; the displayed frame and every
//! frame-indexed table lookup use the clamped [`AnimationClock::display_frame`].

use serde::{Deserialize, Serialize};

/// Fallback frame duration when a per-frame table is empty.
const FALLBACK_FRAME_TIME: f32 = 0.1;

/// How long each frame of a clip is shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameDurations {
    /// Every frame lasts the same time (seconds).
    Uniform(f32),
    /// One duration per frame, indexed by frame.
    PerFrame(&'static [f32]),
}

impl FrameDurations {
    /// Duration of a given frame. Out-of-range indices reuse the last entry.
    #[must_use]
    pub fn for_frame(&self, frame: usize) -> f32 {
        match self {
            Self::Uniform(duration) => *duration,
            Self::PerFrame(table) => table
                .get(frame)
                .or_else(|| table.last())
                .copied()
                .unwrap_or(FALLBACK_FRAME_TIME),
        }
    }
}

/// What happens when playback runs past the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Playback {
    /// Wrap back to frame 0.
    Loop,
    /// Stop past the last frame and report finished; display clamps.
    Hold,
}

/// What happens to time left over when a frame step happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Remainder {
    /// Leftover time counts toward the next frame.
    Carry,
    /// The next frame starts from zero.
    Discard,
}

/// A single animation strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClip {
    /// Sprite sheet identifier handed to the renderer.
    pub sheet: &'static str,
    /// Number of frames in the strip.
    pub frames: usize,
    /// Frame timing.
    pub durations: FrameDurations,
    /// Overflow policy.
    pub playback: Playback,
    /// Leftover time policy.
    pub remainder: Remainder,
}

impl AnimationClip {
    /// A looping clip with a flat frame rate.
    #[must_use]
    pub const fn looping(sheet: &'static str, frames: usize, frame_time: f32) -> Self {
        Self {
            sheet,
            frames,
            durations: FrameDurations::Uniform(frame_time),
            playback: Playback::Loop,
            remainder: Remainder::Carry,
        }
    }

    /// A play-once clip with a flat frame rate.
    #[must_use]
    pub const fn once(sheet: &'static str, frames: usize, frame_time: f32) -> Self {
        Self {
            sheet,
            frames,
            durations: FrameDurations::Uniform(frame_time),
            playback: Playback::Hold,
            remainder: Remainder::Carry,
        }
    }

    /// A play-once clip with one duration per frame.
    #[must_use]
    pub const fn timed(sheet: &'static str, durations: &'static [f32]) -> Self {
        Self {
            sheet,
            frames: durations.len(),
            durations: FrameDurations::PerFrame(durations),
            playback: Playback::Hold,
            remainder: Remainder::Carry,
        }
    }

    /// The same clip, restarting the frame timer from zero on every step.
    #[must_use]
    pub const fn discarding(self) -> Self {
        Self {
            remainder: Remainder::Discard,
            ..self
        }
    }

    /// Total playback time of one pass through the clip.
    #[must_use]
    pub fn total_duration(&self) -> f32 {
        (0..self.frames).map(|f| self.durations.for_frame(f)).sum()
    }
}

/// Result of advancing the clock by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAdvance {
    /// Still on the same frame.
    Stayed,
    /// Moved to the given frame.
    Advanced(usize),
    /// Looping clip wrapped back to frame 0.
    Wrapped,
    /// Holding clip ran past its last frame.
    Finished,
}

/// Frame index and timer for the clip currently playing.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClock {
    clip: AnimationClip,
    frame: usize,
    elapsed: f32,
    frozen: bool,
}

impl AnimationClock {
    /// Creates a clock at frame 0 of `clip`.
    #[must_use]
    pub fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            frame: 0,
            elapsed: 0.0,
            frozen: false,
        }
    }

    /// Switches to a new clip, resetting frame and timer.
    pub fn play(&mut self, clip: AnimationClip) {
        self.clip = clip;
        self.frame = 0;
        self.elapsed = 0.0;
        self.frozen = false;
    }

    /// Jumps to a frame, resetting the per-frame timer.
    pub fn jump_to(&mut self, frame: usize) {
        self.frame = frame.min(self.last_frame());
        self.elapsed = 0.0;
    }

    /// Advances by `dt`. At most one frame step happens per call.
    pub fn advance(&mut self, dt: f32) -> FrameAdvance {
        if self.frozen || self.is_finished() {
            return FrameAdvance::Stayed;
        }

        self.elapsed += dt;
        let duration = self.clip.durations.for_frame(self.frame);
        if self.elapsed < duration {
            return FrameAdvance::Stayed;
        }

        self.elapsed = match self.clip.remainder {
            Remainder::Carry => self.elapsed - duration,
            Remainder::Discard => 0.0,
        };
        self.frame += 1;
        if self.frame < self.clip.frames {
            return FrameAdvance::Advanced(self.frame);
        }

        match self.clip.playback {
            Playback::Loop => {
                self.frame = 0;
                FrameAdvance::Wrapped
            },
            Playback::Hold => {
                self.frame = self.clip.frames;
                FrameAdvance::Finished
            },
        }
    }

    /// Raw frame counter. Equals `frames` once a holding clip finished.
    #[must_use]
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Frame to draw and to look up in frame tables.
    #[must_use]
    pub fn display_frame(&self) -> usize {
        self.frame.min(self.last_frame())
    }

    /// Index of the clip's last frame.
    #[must_use]
    pub fn last_frame(&self) -> usize {
        self.clip.frames.saturating_sub(1)
    }

    /// Whether the displayed frame is the clip's last one.
    #[must_use]
    pub fn on_last_frame(&self) -> bool {
        self.display_frame() == self.last_frame()
    }

    /// Whether a holding clip has played past its final frame.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.clip.playback == Playback::Hold && self.frame >= self.clip.frames
    }

    /// Stops frame advancement until [`Self::unfreeze`] or a new clip.
    pub fn freeze(&mut self) {
        self.frozen = true;
        self.elapsed = 0.0;
    }

    /// Resumes frame advancement.
    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    /// Whether advancement is frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Time spent on the current frame.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The clip being played.
    #[must_use]
    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALK: AnimationClip = AnimationClip::looping("walk", 3, 0.1);
    const SWING: AnimationClip = AnimationClip::once("swing", 3, 0.1);
    const UNEVEN: [f32; 3] = [0.2, 0.05, 0.3];

    #[test]
    fn test_loop_wraps_to_zero() {
        let mut clock = AnimationClock::new(WALK);
        assert_eq!(clock.advance(0.1), FrameAdvance::Advanced(1));
        assert_eq!(clock.advance(0.1), FrameAdvance::Advanced(2));
        assert_eq!(clock.advance(0.1), FrameAdvance::Wrapped);
        assert_eq!(clock.frame(), 0);
        assert!(!clock.is_finished());
    }

    #[test]
    fn test_hold_reports_finished_and_clamps_display() {
        let mut clock = AnimationClock::new(SWING);
        clock.advance(0.1);
        clock.advance(0.1);
        assert!(clock.on_last_frame());
        assert!(!clock.is_finished());

        assert_eq!(clock.advance(0.1), FrameAdvance::Finished);
        assert_eq!(clock.frame(), 3);
        assert_eq!(clock.display_frame(), 2);
        assert!(clock.is_finished());

        // Further ticks are inert
        assert_eq!(clock.advance(1.0), FrameAdvance::Stayed);
        assert_eq!(clock.frame(), 3);
    }

    #[test]
    fn test_one_step_per_tick() {
        let mut clock = AnimationClock::new(WALK);
        assert_eq!(clock.advance(0.35), FrameAdvance::Advanced(1));
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_per_frame_durations() {
        let clip = AnimationClip::timed("uneven", &UNEVEN);
        assert_eq!(clip.frames, 3);
        assert!((clip.total_duration() - 0.55).abs() < 1e-6);

        let mut clock = AnimationClock::new(clip);
        assert_eq!(clock.advance(0.1), FrameAdvance::Stayed);
        assert_eq!(clock.advance(0.1), FrameAdvance::Advanced(1));
        assert_eq!(clock.advance(0.05), FrameAdvance::Advanced(2));
        assert_eq!(clock.advance(0.2), FrameAdvance::Stayed);
    }

    #[test]
    fn test_remainder_policy() {
        let mut carry = AnimationClock::new(WALK);
        let mut discard = AnimationClock::new(WALK.discarding());

        assert_eq!(carry.advance(0.15), FrameAdvance::Advanced(1));
        assert_eq!(discard.advance(0.15), FrameAdvance::Advanced(1));
        assert!((carry.elapsed() - 0.05).abs() < 1e-6);
        assert_eq!(discard.elapsed(), 0.0);

        assert_eq!(carry.advance(0.06), FrameAdvance::Advanced(2));
        assert_eq!(discard.advance(0.06), FrameAdvance::Stayed);
    }

    #[test]
    fn test_freeze_and_jump() {
        let mut clock = AnimationClock::new(SWING);
        clock.freeze();
        assert_eq!(clock.advance(1.0), FrameAdvance::Stayed);
        clock.unfreeze();
        clock.jump_to(10);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_play_resets() {
        let mut clock = AnimationClock::new(WALK);
        clock.advance(0.1);
        clock.freeze();
        clock.play(SWING);
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
        assert!(!clock.is_frozen());
        assert_eq!(clock.clip().sheet, "swing");
    }

    #[test]
    fn test_per_frame_out_of_range_reuses_last() {
        let durations = FrameDurations::PerFrame(&UNEVEN);
        assert_eq!(durations.for_frame(7), 0.3);
        assert_eq!(FrameDurations::PerFrame(&[]).for_frame(0), FALLBACK_FRAME_TIME);
    }
}
