//! TEA5767 single-chip FM receiver over I²C.
//!
//! Write layout (5 bytes, no register address):
//! ```text
//! Byte 0: MUTE | SM | PLL[13:8]
//! Byte 1: PLL[7:0]
//! Byte 2: SUD | SSL1 | SSL0 | HLSI | MS | MR | ML | SWP1
//! Byte 3: SWP2 | STBY | BL | XTAL | SMUTE | HCC | SNC | SI
//! Byte 4: PLLREF | DTC | 0 ...
//! ```
//!
//! Read layout (5 bytes): byte 0 bit 7 = ready flag, byte 2 bit 7 =
//! stereo, byte 3 bits 7..4 = ADC signal level.

use embedded_hal::i2c::I2c;

use crate::config::{FM_MAX_TENTHS, FM_MIN_TENTHS, TEA5767_I2C_ADDR};
use crate::error::Error;
use crate::tuner::RadioControl;

const MUTE: u8 = 0x80;
/// Search up, mid ADC stop level, high-side LO injection.
const BYTE2_DEFAULT: u8 = 0xB0;
/// 32.768 kHz crystal.
const BYTE3_XTAL: u8 = 0x10;
/// 50 µs de-emphasis.
const BYTE4_DTC: u8 = 0x40;

const IF_HZ: u32 = 225_000;
const XTAL_HZ: u32 = 32_768;

/// Decoded status block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub ready: bool,
    pub stereo: bool,
    /// ADC level, 0..=15.
    pub signal_level: u8,
}

/// PLL word for high-side injection.
pub fn pll_word(freq_hz: u32) -> u16 {
    (4 * (freq_hz + IF_HZ) / XTAL_HZ) as u16
}

/// Tenths of a MHz inside the band, or `OutOfBand`.
fn band_tenths(mhz: f32) -> Result<u32, Error> {
    if !mhz.is_finite() {
        return Err(Error::OutOfBand);
    }
    // Round to the nearest 100 kHz so 87.5 and 108.0 survive f32 error.
    let tenths = (mhz * 10.0 + 0.5) as i32;
    if tenths < FM_MIN_TENTHS as i32 || tenths > FM_MAX_TENTHS as i32 {
        return Err(Error::OutOfBand);
    }
    Ok(tenths as u32)
}

pub struct Tea5767<I2C> {
    i2c: I2C,
    pll: u16,
    muted: bool,
}

impl<I2C: I2c> Tea5767<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            pll: 0,
            muted: false,
        }
    }

    /// Tune to `mhz` (87.5..=108.0).
    pub fn set_frequency(&mut self, mhz: f32) -> Result<(), Error> {
        let tenths = band_tenths(mhz)?;
        self.pll = pll_word(tenths * 100_000);
        self.write()
    }

    pub fn set_muted(&mut self, muted: bool) -> Result<(), Error> {
        self.muted = muted;
        self.write()
    }

    pub fn read_status(&mut self) -> Result<Status, Error> {
        let mut buf = [0u8; 5];
        self.i2c
            .read(TEA5767_I2C_ADDR, &mut buf)
            .map_err(|_| Error::I2c)?;
        Ok(Status {
            ready: buf[0] & 0x80 != 0,
            stereo: buf[2] & 0x80 != 0,
            signal_level: buf[3] >> 4,
        })
    }

    /// Fails with `RadioNotReady` until the PLL has locked.
    pub fn ensure_ready(&mut self) -> Result<Status, Error> {
        let status = self.read_status()?;
        if status.ready {
            Ok(status)
        } else {
            Err(Error::RadioNotReady)
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn control_block(&self) -> [u8; 5] {
        let mute = if self.muted { MUTE } else { 0 };
        [
            mute | ((self.pll >> 8) as u8 & 0x3F),
            self.pll as u8,
            BYTE2_DEFAULT,
            BYTE3_XTAL,
            BYTE4_DTC,
        ]
    }

    fn write(&mut self) -> Result<(), Error> {
        let block = self.control_block();
        self.i2c
            .write(TEA5767_I2C_ADDR, &block)
            .map_err(|_| Error::I2c)
    }
}

impl<I2C: I2c> RadioControl for Tea5767<I2C> {
    fn set_frequency(&mut self, mhz: f32) -> Result<(), Error> {
        Tea5767::set_frequency(self, mhz)
    }
}
