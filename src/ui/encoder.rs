//! Quadrature rotary encoder decoder.
//!
//! Two active-low channels (CLK, DT) with pull-ups, both idle high.
//! One detent walks through a full phase cycle:
//!
//! ```text
//! Clockwise:         (1,1) -> (0,1) -> (0,0) -> (1,0) -> (1,1)   position += 1
//!                     Idle    Cw1      Cw2      Cw3      commit
//! Counter-clockwise: (1,1) -> (1,0) -> (0,0) -> (0,1) -> (1,1)   position -= 1
//!                     Idle    Ccw1     Ccw2     Ccw3     commit
//!                    (clk, dt)
//! ```
//!
//! The state machine is the debounce filter: bouncing edges that do not
//! complete the cycle never reach the commit transition, so no timer is
//! involved. Both channels reading high before Cw3/Ccw3 means the detent
//! was abandoned and the machine drops back to Idle. `update()` is O(1), never blocks and never allocates, so it
//! can run straight from the pin-change interrupt.

use core::sync::atomic::{AtomicI32, Ordering};

/// Decoder phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    #[default]
    Idle,
    Cw1,
    Cw2,
    Cw3,
    Ccw1,
    Ccw2,
    Ccw3,
}

/// Rotation direction of a completed detent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Phase {
    /// Advance the machine by one pin sample.
    ///
    /// Returns the next phase and, on the closing transition, the
    /// direction of the completed detent.
    pub fn next(self, clk: bool, dt: bool) -> (Phase, Option<Direction>) {
        use Phase::*;

        match (self, clk, dt) {
            // CLK falls first -> clockwise, DT falls first -> counter-clockwise.
            (Idle, false, _) => (Cw1, None),
            (Idle, true, false) => (Ccw1, None),

            (Cw1, _, false) => (Cw2, None),
            (Cw1, true, true) => (Idle, None),
            (Cw2, true, false) => (Cw3, None),
            (Cw2, true, true) => (Idle, None),
            (Cw3, true, true) => (Idle, Some(Direction::Clockwise)),
            (Cw3, false, false) => (Cw2, None),

            (Ccw1, false, _) => (Ccw2, None),
            (Ccw1, true, true) => (Idle, None),
            (Ccw2, false, true) => (Ccw3, None),
            (Ccw2, true, true) => (Idle, None),
            (Ccw3, true, true) => (Idle, Some(Direction::CounterClockwise)),
            (Ccw3, false, false) => (Ccw2, None),

            (phase, _, _) => (phase, None),
        }
    }
}

/// Relative encoder position shared between the ISR and the tuner.
///
/// Single writer (the encoder interrupt), any number of readers taking
/// an atomic snapshot.
pub struct EncoderPosition {
    position: AtomicI32,
}

impl EncoderPosition {
    pub const fn new() -> Self {
        Self {
            position: AtomicI32::new(0),
        }
    }

    /// Current relative position (snapshot).
    pub fn read(&self) -> i32 {
        self.position.load(Ordering::Acquire)
    }

    fn step(&self, direction: Direction) {
        let delta = match direction {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        };
        // Wraps on overflow; the tuner only ever looks at differences.
        self.position.fetch_add(delta, Ordering::Release);
    }
}

impl Default for EncoderPosition {
    fn default() -> Self {
        Self::new()
    }
}

/// Encoder FSM bound to the shared position counter.
///
/// Owned by the interrupt-side task; the phase never leaves it.
pub struct QuadratureEncoder<'a> {
    phase: Phase,
    position: &'a EncoderPosition,
}

impl<'a> QuadratureEncoder<'a> {
    pub fn new(position: &'a EncoderPosition) -> Self {
        Self {
            phase: Phase::Idle,
            position,
        }
    }

    /// Feed the current pin levels (`true` = high).
    ///
    /// Returns `true` when a full detent was completed and the position
    /// moved by one.
    pub fn update(&mut self, clk: bool, dt: bool) -> bool {
        let (phase, step) = self.phase.next(clk, dt);
        self.phase = phase;

        match step {
            Some(direction) => {
                self.position.step(direction);
                true
            }
            None => false,
        }
    }

    /// Current relative position.
    pub fn read(&self) -> i32 {
        self.position.read()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}
