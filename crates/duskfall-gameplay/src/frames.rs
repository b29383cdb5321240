//! Declarative frame tables.
//!
//! Which frames of an attack carry an active hitbox, and which frames move
//! the actor, are data: each enemy declares `const` tables of
//! `(state, frame range)` rows and looks them up with its current state and
//! displayed frame. Keeping them as tables makes combo timing auditable
//! without reading control flow.

/// Inclusive range of animation frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRange {
    /// First frame in the range
    pub first: usize,
    /// Last frame in the range (inclusive)
    pub last: usize,
}

impl FrameRange {
    /// A single frame.
    #[must_use]
    pub const fn single(frame: usize) -> Self {
        Self {
            first: frame,
            last: frame,
        }
    }

    /// Frames `first..=last`.
    #[must_use]
    pub const fn span(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    /// Every frame from `first` onwards.
    #[must_use]
    pub const fn starting_at(first: usize) -> Self {
        Self {
            first,
            last: usize::MAX,
        }
    }

    /// Whether `frame` lies in the range.
    #[must_use]
    pub const fn contains(self, frame: usize) -> bool {
        frame >= self.first && frame <= self.last
    }
}

/// A state's hitbox-active frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow<S> {
    /// State the row applies to
    pub state: S,
    /// Frames on which the hitbox is live
    pub frames: FrameRange,
}

impl<S> FrameWindow<S> {
    /// Creates a table row.
    #[must_use]
    pub const fn new(state: S, frames: FrameRange) -> Self {
        Self { state, frames }
    }
}

/// Horizontal speed applied on certain frames of a state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementWindow<S> {
    /// State the row applies to
    pub state: S,
    /// Frames on which the actor moves
    pub frames: FrameRange,
    /// Speed along the facing direction (px/s)
    pub speed: f32,
}

impl<S> MovementWindow<S> {
    /// Creates a table row.
    #[must_use]
    pub const fn new(state: S, frames: FrameRange, speed: f32) -> Self {
        Self {
            state,
            frames,
            speed,
        }
    }
}

/// True if any row of `table` covers `(state, frame)`.
#[must_use]
pub fn window_active<S: PartialEq>(table: &[FrameWindow<S>], state: &S, frame: usize) -> bool {
    table
        .iter()
        .any(|row| row.state == *state && row.frames.contains(frame))
}

/// Speed of the first row of `table` covering `(state, frame)`.
#[must_use]
pub fn movement_speed<S: PartialEq>(
    table: &[MovementWindow<S>],
    state: &S,
    frame: usize,
) -> Option<f32> {
    table
        .iter()
        .find(|row| row.state == *state && row.frames.contains(frame))
        .map(|row| row.speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Move {
        Jab,
        Sweep,
    }

    const HITS: &[FrameWindow<Move>] = &[
        FrameWindow::new(Move::Jab, FrameRange::single(2)),
        FrameWindow::new(Move::Sweep, FrameRange::starting_at(3)),
    ];

    const STEPS: &[MovementWindow<Move>] = &[
        MovementWindow::new(Move::Sweep, FrameRange::span(0, 1), 200.0),
        MovementWindow::new(Move::Sweep, FrameRange::span(2, 4), 50.0),
    ];

    #[test]
    fn test_frame_range_bounds() {
        assert!(FrameRange::span(2, 4).contains(2));
        assert!(FrameRange::span(2, 4).contains(4));
        assert!(!FrameRange::span(2, 4).contains(5));
        assert!(FrameRange::starting_at(3).contains(1000));
        assert!(!FrameRange::single(3).contains(2));
    }

    #[test]
    fn test_window_lookup() {
        assert!(!window_active(HITS, &Move::Jab, 1));
        assert!(window_active(HITS, &Move::Jab, 2));
        assert!(!window_active(HITS, &Move::Jab, 3));
        assert!(window_active(HITS, &Move::Sweep, 7));
    }

    #[test]
    fn test_movement_lookup() {
        assert_eq!(movement_speed(STEPS, &Move::Sweep, 1), Some(200.0));
        assert_eq!(movement_speed(STEPS, &Move::Sweep, 3), Some(50.0));
        assert_eq!(movement_speed(STEPS, &Move::Sweep, 5), None);
        assert_eq!(movement_speed(STEPS, &Move::Jab, 0), None);
    }
}
