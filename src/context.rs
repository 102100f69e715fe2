//! Shared input context.
//!
//! Everything that both interrupt handlers and cooperative tasks touch
//! lives in one `HmiContext`, built once at startup and handed out by
//! reference:
//!
//! - `encoder`: relative position, written by the encoder ISR
//! - `activity`: poll-killer timestamp, written by every input path
//! - `events`: ISR -> tuner FIFO
//! - the coarse/fine flag flipped by the button ISR
//!
//! Every field is an atomic or an interrupt-safe queue; no method here
//! blocks or allocates.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::events::{EventBridge, PendingEvent};
use crate::power::{ActivityTracker, Clock};
use crate::ui::encoder::EncoderPosition;

pub struct HmiContext<C, const N: usize> {
    pub encoder: EncoderPosition,
    pub activity: ActivityTracker<C>,
    pub events: EventBridge<N>,
    coarse: AtomicBool,
}

impl<C: Clock, const N: usize> HmiContext<C, N> {
    pub fn new(clock: C, inactivity_threshold_ms: u32, poll_interval_ms: u32) -> Self {
        Self {
            encoder: EncoderPosition::new(),
            activity: ActivityTracker::new(clock, inactivity_threshold_ms, poll_interval_ms),
            events: EventBridge::new(),
            coarse: AtomicBool::new(false),
        }
    }

    /// Encoder button pressed (interrupt path, or via `polled_press`).
    ///
    /// Flips coarse/fine, keeps the poll killer awake and queues the new
    /// mode for the tuner. Returns the new coarse flag.
    pub fn press(&self) -> bool {
        let coarse = !self.coarse.fetch_xor(true, Ordering::AcqRel);
        self.activity.mark_activity();
        self.events.enqueue(PendingEvent::CoarseToggle(coarse));
        coarse
    }

    /// Encoder button press caught by the watcher's fallback polling.
    pub fn polled_press(&self) -> bool {
        self.activity.mark_activity();
        self.events.enqueue(PendingEvent::EncoderButton(true));
        self.press()
    }

    /// Encoder completed a detent (interrupt path).
    pub fn encoder_moved(&self) {
        self.activity.mark_activity();
    }

    /// Coarse flag as last set by the button path.
    pub fn coarse(&self) -> bool {
        self.coarse.load(Ordering::Acquire)
    }
}
