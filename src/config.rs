//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and tuning limits
//! live here so they can be tuned in one place.

// FM band

/// Lower band edge in tenths of a MHz (87.5 MHz).
pub const FM_MIN_TENTHS: u16 = 875;

/// Upper band edge in tenths of a MHz (108.0 MHz).
pub const FM_MAX_TENTHS: u16 = 1080;

/// Startup frequency in tenths of a MHz.
pub const FM_DEFAULT_TENTHS: u16 = 1000;

/// Startup frequency (MHz).
pub const FM_DEFAULT: f32 = 100.0;

/// Tuning step per encoder detent in coarse mode (1.0 MHz).
pub const COARSE_STEP_TENTHS: i32 = 10;

/// Tuning step per encoder detent in fine mode (0.1 MHz).
pub const FINE_STEP_TENTHS: i32 = 1;

// Poll killer / activity tracking

/// No input for longer than this puts the device into idle (ms).
pub const INACTIVITY_THRESHOLD_MS: u32 = 5000;

/// Watcher sleep between checks while idle (ms).
pub const POLL_INTERVAL_MS: u32 = 200;

/// Watcher cadence while polling is active (ms).
pub const ACTIVE_POLL_INTERVAL_MS: u32 = 50;

// Control loop

/// Tuner tick period (ms).
pub const TUNER_TICK_MS: u64 = 100;

/// Number of idle ticks between idle-indicator frames.
pub const IDLE_BLINK_TICKS: u32 = 10;

/// How long the boot status screen stays up (ms).
pub const BOOT_SCREEN_MS: u64 = 1500;

/// Time the TEA5767 PLL gets to lock before the boot probe (ms).
pub const RADIO_SETTLE_MS: u64 = 100;

/// Capacity of the ISR -> task event queue.
pub const EVENT_QUEUE_DEPTH: usize = 8;

// GPIO pin assignments (nRF52840-DK defaults)
//
// Actual `embassy_nrf::peripherals::*` pins are picked in `main.rs`.
// Adjust for your board.
//
//   Encoder CLK      → P0.03
//   Encoder DT       → P0.04
//   Encoder button   → P0.28 (active-low, pull-up)
//   OLED SDA/SCL     → P0.26 / P0.27 (TWIM0)
//   Radio SDA/SCL    → P0.30 / P0.31 (TWIM1)

/// Minimum time between two reported button presses (ms).
pub const BUTTON_REARM_MS: u32 = 30;

/// Button is edge-interrupt driven. When `false` the watcher polls it.
pub const BUTTON_IRQ_ENABLED: bool = true;

// I²C addresses

/// SSD1306 7-bit address.
pub const OLED_I2C_ADDR: u8 = 0x3C;

/// TEA5767 7-bit address.
pub const TEA5767_I2C_ADDR: u8 = 0x60;
