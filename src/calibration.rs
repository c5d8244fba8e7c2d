//! Calibration math for INA226.
//!
//! Turns shunt parameters into the CALIBRATION register value and the current/power LSBs,
//! following datasheet equations 1-4:
//!
//! ```text
//! Current_LSB = Max_Expected_Current / 2^15
//! CAL         = 0.00512 / (Current_LSB × R_shunt)
//! Power_LSB   = 25 × Current_LSB
//! ```
//!
//! Internally the math runs in `f64` so that `CAL` is not floored one count low when the
//! quotient is integral; results are stored as `f32` like the rest of the driver.

use crate::data_types::{Config, ShuntSpec};
use crate::error::CalibrationError;
use crate::registers::{CAL_CONSTANT, CURRENT_FULL_SCALE_COUNTS, POWER_LSB_FACTOR, SHUNT_FULL_RANGE_MV};

/// Shunt fitted on most breakout boards.
pub const DEFAULT_SHUNT_MOHM: f32 = 100.0;
/// Rated drop of a dedicated shunt at its nominal current.
pub const DEFAULT_SHUNT_DROPOUT_MV: f32 = 75.0;
/// 75 mV across the default 100 mΩ shunt.
pub const DEFAULT_MAX_CURRENT_A: f32 = 0.75;

// Relative slack applied before flooring CAL.
const CAL_FLOOR_SLACK: f64 = 1e-9;

/// Inputs to [`Calibration::compute`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationParams {
    /// Written to CONFIG together with the calibration.
    pub config: Config,
    /// Maximum current to resolve (A). Takes precedence over the shunt's nominal current.
    pub max_current_a: Option<f32>,
    /// Shunt description; `None` selects [`DEFAULT_SHUNT_MOHM`].
    pub shunt: Option<ShuntSpec>,
    /// Shunt drop at nominal current (mV).
    pub shunt_dropout_mv: f32,
    /// Largest shunt voltage the resolved current may produce (mV).
    pub shunt_full_range_mv: f32,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            config: Config::default(),
            max_current_a: None,
            shunt: None,
            shunt_dropout_mv: DEFAULT_SHUNT_DROPOUT_MV,
            shunt_full_range_mv: SHUNT_FULL_RANGE_MV,
        }
    }
}

impl CalibrationParams {
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_max_current(mut self, amps: f32) -> Self {
        self.max_current_a = Some(amps);
        self
    }

    pub fn with_shunt(mut self, shunt: ShuntSpec) -> Self {
        self.shunt = Some(shunt);
        self
    }

    pub fn with_shunt_dropout_mv(mut self, mv: f32) -> Self {
        self.shunt_dropout_mv = mv;
        self
    }

    pub fn with_shunt_full_range_mv(mut self, mv: f32) -> Self {
        self.shunt_full_range_mv = mv;
        self
    }
}

/// Derived calibration state. `power_lsb` is always `25 × current_lsb`.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    current_lsb: f32,
    power_lsb: f32,
    shunt_resistance_ohm: f32,
    max_current_a: f32,
    register_value: u16,
}

impl Calibration {
    /// Compute the calibration for `params`.
    ///
    /// The maximum current is taken from `max_current_a`, else from the shunt's nominal
    /// current (`dropout / resistance`), else 0.75 A on the default shunt; it is then clamped
    /// to `shunt_full_range_mv / resistance`. The current LSB is `max / 2^15` rounded up to a
    /// single significant digit (`d × 10^k`, `d` in 1..=10), so it is never below the raw value.
    ///
    /// Fails with [`CalibrationError::OutOfRange`] when CAL is 0 or above 65535, and with
    /// [`CalibrationError::InvalidParameter`] for non-finite or non-positive inputs.
    pub fn compute(params: &CalibrationParams) -> Result<Self, CalibrationError> {
        let dropout_mv = positive(params.shunt_dropout_mv)?;
        let full_range_mv = positive(params.shunt_full_range_mv)?;

        // mV / mΩ = A
        let (shunt_mohm, nominal_a) = match params.shunt {
            Some(ShuntSpec::ByResistance(mohm)) => {
                let mohm = positive(mohm)?;
                (mohm, dropout_mv / mohm)
            }
            Some(ShuntSpec::ByNominalCurrent(amps)) => {
                let amps = positive(amps)?;
                (dropout_mv / amps, amps)
            }
            None => (DEFAULT_SHUNT_MOHM as f64, DEFAULT_MAX_CURRENT_A as f64),
        };

        let requested_a = match params.max_current_a {
            Some(amps) => positive(amps)?,
            None => nominal_a,
        };
        let max_current_a = requested_a.min(full_range_mv / shunt_mohm);

        let current_lsb = round_up_lsb(max_current_a / CURRENT_FULL_SCALE_COUNTS);
        let resistance_ohm = shunt_mohm / 1000.0;
        let cal = libm::floor(CAL_CONSTANT / (current_lsb * resistance_ohm) * (1.0 + CAL_FLOOR_SLACK));
        if !(1.0..=u16::MAX as f64).contains(&cal) {
            return Err(CalibrationError::OutOfRange);
        }

        let current_lsb = current_lsb as f32;
        Ok(Self {
            current_lsb,
            power_lsb: current_lsb * POWER_LSB_FACTOR,
            shunt_resistance_ohm: resistance_ohm as f32,
            max_current_a: max_current_a as f32,
            register_value: cal as u16,
        })
    }

    /// Amps per count of the CURRENT register.
    pub fn current_lsb(&self) -> f32 {
        self.current_lsb
    }

    /// Watts per count of the POWER register.
    pub fn power_lsb(&self) -> f32 {
        self.power_lsb
    }

    pub fn shunt_resistance_ohm(&self) -> f32 {
        self.shunt_resistance_ohm
    }

    /// Maximum current after clamping to the shunt's measurable range.
    pub fn max_current_a(&self) -> f32 {
        self.max_current_a
    }

    /// Value for the CALIBRATION register.
    pub fn register_value(&self) -> u16 {
        self.register_value
    }

    /// Scale a raw CURRENT reading (two's complement) to amps.
    pub fn current_from_raw(&self, raw: u16) -> f32 {
        raw as i16 as f32 * self.current_lsb
    }

    /// Scale a raw POWER reading (unsigned) to watts.
    pub fn power_from_raw(&self, raw: u16) -> f32 {
        raw as f32 * self.power_lsb
    }

    /// ALERT_LIMIT code for a power over-limit threshold. Clamps to the register range.
    pub fn power_to_raw(&self, watts: f32) -> u16 {
        let counts = libm::roundf(watts / self.power_lsb);
        counts.clamp(0.0, u16::MAX as f32) as u16
    }
}

fn positive(value: f32) -> Result<f64, CalibrationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value as f64)
    } else {
        Err(CalibrationError::InvalidParameter)
    }
}

/// Smallest `d × 10^k` (integer `d` in 1..=10) that is `>= raw`.
fn round_up_lsb(raw: f64) -> f64 {
    let scale = libm::pow(10.0, libm::floor(libm::log10(raw)));
    let mut digit = libm::ceil(raw / scale);
    // log10/pow round-off can leave the digit one step off in either direction.
    if digit > 1.0 && (digit - 1.0) * scale >= raw {
        digit -= 1.0;
    }
    if digit * scale < raw {
        digit += 1.0;
    }
    digit * scale
}
