//! Encoder push-button with edge detection.
//!
//! Active-low with pull-up. `was_pressed()` reports a press once per
//! press/release cycle: the RELEASED -> PRESSED edge returns `true`,
//! further samples while held return `false`, and a released sample
//! re-arms the edge silently.
//!
//! Contact bounce on the falling edge looks like several short
//! press/release cycles, so a minimum re-arm interval is applied on top
//! of the edge logic: a second press inside `rearm_ms` of the last one
//! is swallowed.

use embedded_hal::digital::InputPin;

#[cfg(feature = "defmt")]
use defmt::warn;

// Stub macros when defmt is not available
#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

/// Edge state of the button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    Released,
    Pressed,
}

/// Debounced, edge-triggered button.
pub struct Button<P> {
    pin: P,
    state: ButtonState,
    rearm_ms: u32,
    last_press_ms: Option<u32>,
}

impl<P: InputPin> Button<P> {
    /// Wrap an active-low input pin.
    pub fn new(pin: P, rearm_ms: u32) -> Self {
        Self {
            pin,
            state: ButtonState::Released,
            rearm_ms,
            last_press_ms: None,
        }
    }

    /// Level check: `true` while the button is held down.
    pub fn is_pressed(&mut self) -> bool {
        match self.pin.is_low() {
            Ok(low) => low,
            Err(_) => {
                warn!("Button: pin read failed, treating as released");
                false
            }
        }
    }

    /// Edge check: `true` exactly once per physical press.
    pub fn was_pressed(&mut self, now_ms: u32) -> bool {
        let pressed = self.is_pressed();
        self.sample(pressed, now_ms)
    }

    /// Run the edge logic on an already-read level.
    pub fn sample(&mut self, pressed: bool, now_ms: u32) -> bool {
        match (self.state, pressed) {
            (ButtonState::Released, true) => {
                self.state = ButtonState::Pressed;
                if self.rearmed(now_ms) {
                    self.last_press_ms = Some(now_ms);
                    true
                } else {
                    false
                }
            }
            (ButtonState::Pressed, false) => {
                self.state = ButtonState::Released;
                false
            }
            _ => false,
        }
    }

    fn rearmed(&self, now_ms: u32) -> bool {
        match self.last_press_ms {
            Some(last) => now_ms.wrapping_sub(last) >= self.rearm_ms,
            None => true,
        }
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Access the pin, e.g. to await an edge on it.
    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}
