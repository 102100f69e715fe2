use crate::config::{
    COARSE_STEP_TENTHS, FINE_STEP_TENTHS, FM_MAX_TENTHS, FM_MIN_TENTHS,
};

/// Coarse/fine tuning mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TuningMode {
    #[default]
    Fine,
    Coarse,
}

impl TuningMode {
    pub fn from_coarse(coarse: bool) -> Self {
        if coarse {
            TuningMode::Coarse
        } else {
            TuningMode::Fine
        }
    }

    /// Frequency change per encoder detent, in tenths of a MHz.
    pub fn step_tenths(self) -> i32 {
        match self {
            TuningMode::Coarse => COARSE_STEP_TENTHS,
            TuningMode::Fine => FINE_STEP_TENTHS,
        }
    }

    /// Label shown on the display.
    pub fn label(self) -> &'static str {
        match self {
            TuningMode::Coarse => "Coarse",
            TuningMode::Fine => "Fine",
        }
    }
}

/// Clamp a frequency to the FM band.
pub fn clamp_to_band(tenths: i32) -> u16 {
    tenths.clamp(FM_MIN_TENTHS as i32, FM_MAX_TENTHS as i32) as u16
}

/// Apply an encoder delta to a frequency, clamping immediately so spins
/// past either band edge never build up hidden state.
pub fn apply_encoder_delta(freq_tenths: u16, delta: i32, mode: TuningMode) -> u16 {
    let change = delta.saturating_mul(mode.step_tenths());
    clamp_to_band((freq_tenths as i32).saturating_add(change))
}

/// Tenths of a MHz to MHz.
pub fn tenths_to_mhz(tenths: u16) -> f32 {
    tenths as f32 / 10.0
}
