//! User interface subsystem - rotary encoder, push-button and OLED.
//!
//! ## Components
//!
//! - **Encoder**: quadrature FSM, run from the pin-change interrupt
//! - **Button**: active-low encoder push-button, edge-once with re-arm
//! - **Display**: SSD1306 128×64 OLED via I²C (firmware only)
//! - **Input logic**: coarse/fine step scaling and band clamping

pub mod buttons;
#[cfg(feature = "embedded")]
pub mod display;
pub mod encoder;
pub mod input_logic;
