//! Rotary-encoder FM tuner.
//!
//! Everything except the hardware wiring lives in this library so it can
//! be tested on the host (no embedded hardware required):
//!
//! - `ui::encoder` / `ui::buttons`: interrupt-side input handling
//! - `events`: ISR -> task event queue
//! - `power`: activity tracking ("poll killer") and the background watcher
//! - `tuner`: control loop driving the radio and the display
//! - `radio`: TEA5767 driver
//!
//! Usage: `cargo test --lib`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and is only built with `--features embedded`.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod power;
pub mod power_logic;
pub mod radio;
pub mod tuner;
pub mod ui;

pub use context::HmiContext;
pub use error::Error;
pub use events::{EventBridge, PendingEvent};
pub use power::{ActivityTracker, Clock, ManualClock, Watcher};
pub use tuner::{FrequencyDisplay, RadioControl, TickReport, Tuner, TunerState};
pub use ui::input_logic::TuningMode;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests - pure helpers (tuning arithmetic, idle timing)
// ═══════════════════════════════════════════════════════════════════════════
