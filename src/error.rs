//! Unified error type for fmtuner.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.
//!
//! None of these is fatal: the tuner logs the failure and skips the side
//! effect for the current tick.

/// Top-level error type used by the display and radio collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Bus
    /// I²C transaction failed.
    I2c,

    // Radio
    /// The tuner has not reported a locked PLL.
    RadioNotReady,

    /// Frequency outside the FM band reached the radio driver.
    OutOfBand,

    // UI / Display
    /// Render or flush to the display failed.
    Display,
}
