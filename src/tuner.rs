//! Control loop: turns encoder movement and queued input events into
//! radio retunes and display updates, once per scheduler tick.
//!
//! Tick order:
//! 1. drain the event bridge (coarse/fine changes)
//! 2. snapshot the encoder position, skip if unchanged
//! 3. scale the delta by the tuning step and clamp to the band
//! 4. push a new frequency to the radio, keep the poll killer awake
//! 5. idle -> blink the idle indicator, otherwise redraw if anything changed
//!
//! Collaborator failures are logged and retried on the next tick. Nothing
//! here can stop the loop.

use crate::config::{FM_DEFAULT_TENTHS, IDLE_BLINK_TICKS};
use crate::context::HmiContext;
use crate::error::Error;
use crate::events::PendingEvent;
use crate::power::Clock;
use crate::ui::input_logic::{apply_encoder_delta, tenths_to_mhz, TuningMode};

#[cfg(feature = "defmt")]
use defmt::{debug, info, warn};

// Stub macros when defmt is not available
#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}

/// FM receiver the tuner drives.
pub trait RadioControl {
    /// Tune to `mhz`. The tuner only ever passes values inside the band.
    fn set_frequency(&mut self, mhz: f32) -> Result<(), Error>;
}

/// Screen the tuner renders to. Both calls render and flush synchronously.
pub trait FrequencyDisplay {
    fn draw(&mut self, mhz: f32, mode: TuningMode) -> Result<(), Error>;
    fn draw_idle_indicator(&mut self) -> Result<(), Error>;
}

/// User-visible tuning state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TunerState {
    /// Always inside `[FM_MIN_TENTHS, FM_MAX_TENTHS]`.
    pub frequency_tenths: u16,
    pub last_encoder_position: i32,
    pub coarse_mode: bool,
}

impl TunerState {
    pub fn mode(&self) -> TuningMode {
        TuningMode::from_coarse(self.coarse_mode)
    }

    pub fn frequency_mhz(&self) -> f32 {
        tenths_to_mhz(self.frequency_tenths)
    }
}

/// What a tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// A new frequency reached the radio.
    pub retuned: bool,
    /// The full frame was redrawn.
    pub redrawn: bool,
    /// The device is idle (indicator mode).
    pub idle: bool,
}

pub struct Tuner {
    state: TunerState,
    redraw_pending: bool,
    retune_pending: bool,
    idle_ticks: u32,
    was_idle: bool,
    dropped_seen: u32,
}

impl Tuner {
    /// Start at the default frequency, in fine mode, anchored to the
    /// encoder's current position.
    pub fn new(encoder_position: i32) -> Self {
        Self {
            state: TunerState {
                frequency_tenths: FM_DEFAULT_TENTHS,
                last_encoder_position: encoder_position,
                coarse_mode: false,
            },
            redraw_pending: true,
            retune_pending: true,
            idle_ticks: 0,
            was_idle: false,
            dropped_seen: 0,
        }
    }

    pub fn state(&self) -> &TunerState {
        &self.state
    }

    /// Push the startup frequency and draw the first frame.
    pub fn start<R, D>(&mut self, radio: &mut R, display: &mut D) -> TickReport
    where
        R: RadioControl,
        D: FrequencyDisplay,
    {
        info!("Tuner: starting at {} tenths MHz", self.state.frequency_tenths);
        TickReport {
            retuned: self.flush_radio(radio),
            redrawn: self.flush_display(display),
            idle: false,
        }
    }

    /// Apply one drained event. Returns `true` if it needs a redraw.
    pub fn apply_event(&mut self, event: PendingEvent) -> bool {
        match event {
            PendingEvent::CoarseToggle(coarse) => {
                if coarse != self.state.coarse_mode {
                    info!("Tuner: mode -> {}", TuningMode::from_coarse(coarse).label());
                }
                self.state.coarse_mode = coarse;
                self.redraw_pending = true;
                true
            }
            PendingEvent::EncoderButton(_pressed) => {
                debug!("Tuner: polled button event ({})", _pressed);
                false
            }
        }
    }

    /// Run one control-loop pass.
    pub fn tick<C, R, D, const N: usize>(
        &mut self,
        hmi: &HmiContext<C, N>,
        radio: &mut R,
        display: &mut D,
    ) -> TickReport
    where
        C: Clock,
        R: RadioControl,
        D: FrequencyDisplay,
    {
        // 1. events
        for event in hmi.events.drain_nonblocking() {
            self.apply_event(event);
        }
        let dropped = hmi.events.dropped();
        if dropped != self.dropped_seen {
            warn!(
                "Tuner: event queue saturated, {} events dropped",
                dropped.wrapping_sub(self.dropped_seen)
            );
            self.dropped_seen = dropped;
        }

        // 2-4. encoder
        let position = hmi.encoder.read();
        if position != self.state.last_encoder_position {
            let delta = position.wrapping_sub(self.state.last_encoder_position);
            self.state.last_encoder_position = position;

            let tuned = apply_encoder_delta(self.state.frequency_tenths, delta, self.state.mode());
            if tuned != self.state.frequency_tenths {
                debug!("Tuner: {} -> {} (delta {})", self.state.frequency_tenths, tuned, delta);
                self.state.frequency_tenths = tuned;
                self.retune_pending = true;
                self.redraw_pending = true;
            }

            if hmi.activity.mark_activity() {
                info!("Poll killer: waking");
            }
        }

        let retuned = self.flush_radio(radio);

        // 5. display
        let idle = hmi.activity.is_idle();
        let mut redrawn = false;
        if idle {
            if !self.was_idle {
                info!("Tuner: idle, dimming display");
                self.idle_ticks = 0;
            }
            if self.idle_ticks % IDLE_BLINK_TICKS == 0 {
                if let Err(_e) = display.draw_idle_indicator() {
                    warn!("Tuner: idle indicator failed: {:?}", _e);
                }
            }
            self.idle_ticks = self.idle_ticks.wrapping_add(1);
        } else {
            if self.was_idle {
                self.redraw_pending = true;
            }
            redrawn = self.flush_display(display);
        }
        self.was_idle = idle;

        TickReport {
            retuned,
            redrawn,
            idle,
        }
    }

    fn flush_radio<R: RadioControl>(&mut self, radio: &mut R) -> bool {
        if !self.retune_pending {
            return false;
        }
        match radio.set_frequency(self.state.frequency_mhz()) {
            Ok(()) => {
                self.retune_pending = false;
                true
            }
            Err(_e) => {
                warn!("Tuner: radio set failed: {:?}", _e);
                false
            }
        }
    }

    fn flush_display<D: FrequencyDisplay>(&mut self, display: &mut D) -> bool {
        if !self.redraw_pending {
            return false;
        }
        match display.draw(self.state.frequency_mhz(), self.state.mode()) {
            Ok(()) => {
                self.redraw_pending = false;
                true
            }
            Err(_e) => {
                warn!("Tuner: display draw failed: {:?}", _e);
                false
            }
        }
    }
}
