//! Effects sink.
//!
//! Actors never reach for a global particle system or audio player. Every
//! damage/death path receives an `&mut dyn EffectsSink` and reports what
//! happened; the host decides how to render or play it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Sound cues raised by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// An enemy took a hit.
    EnemyHurt,
    /// An enemy died.
    EnemyDeath,
    /// The player took a hit.
    PlayerHurt,
    /// The player swung their weapon.
    PlayerSwing,
    /// An arrow left the bow.
    ArrowLoosed,
    /// A coin was collected.
    CoinPickup,
}

/// Receiver for cosmetic side effects.
pub trait EffectsSink {
    /// Spray blood at a world position.
    fn blood_splatter(&mut self, at: Vec2);

    /// Play a one-shot sound.
    fn play_sound(&mut self, cue: SoundCue);

    /// Shake the camera.
    fn screen_shake(&mut self, _intensity: f32, _duration: f32) {}
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEffects;

impl EffectsSink for NullEffects {
    fn blood_splatter(&mut self, _at: Vec2) {}

    fn play_sound(&mut self, _cue: SoundCue) {}
}

/// A recorded effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectEvent {
    /// Blood splatter at a position
    BloodSplatter(Vec2),
    /// Sound cue
    Sound(SoundCue),
    /// Screen shake
    ScreenShake {
        /// Shake strength in pixels
        intensity: f32,
        /// Shake duration in seconds
        duration: f32,
    },
}

/// Sink that records every call, for tests and replays.
#[derive(Debug, Clone, Default)]
pub struct EffectLog {
    events: Vec<EffectEvent>,
}

impl EffectLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events in order.
    #[must_use]
    pub fn events(&self) -> &[EffectEvent] {
        &self.events
    }

    /// Number of times a sound cue was played.
    #[must_use]
    pub fn sound_count(&self, cue: SoundCue) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, EffectEvent::Sound(c) if *c == cue))
            .count()
    }

    /// Number of blood splatters.
    #[must_use]
    pub fn splatter_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, EffectEvent::BloodSplatter(_)))
            .count()
    }

    /// Removes and returns all recorded events.
    pub fn drain(&mut self) -> Vec<EffectEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EffectsSink for EffectLog {
    fn blood_splatter(&mut self, at: Vec2) {
        self.events.push(EffectEvent::BloodSplatter(at));
    }

    fn play_sound(&mut self, cue: SoundCue) {
        self.events.push(EffectEvent::Sound(cue));
    }

    fn screen_shake(&mut self, intensity: f32, duration: f32) {
        self.events.push(EffectEvent::ScreenShake {
            intensity,
            duration,
        });
    }
}
