//! FM receiver subsystem.
//!
//! The TEA5767 sits alone on its own I²C bus. The tuner only talks to
//! it through `tuner::RadioControl`.

pub mod tea5767;

pub use tea5767::{Status, Tea5767};
