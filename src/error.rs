//! Error definitions for INA226 driver.

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug)]
pub enum Error<I2cError> {
    /// Underlying I2C transaction failed.
    I2c(I2cError),
    /// Derived calibration register value is 0 or exceeds 65535.
    CalibrationOutOfRange,
    /// A physical parameter was non-finite or not strictly positive.
    InvalidParameter,
    /// Current or power requested before a successful calibration.
    NotCalibrated,
}

/// Failure of the pure calibration computation (no bus involved).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CalibrationError {
    OutOfRange,
    InvalidParameter,
}

impl<I2cError> From<CalibrationError> for Error<I2cError> {
    fn from(err: CalibrationError) -> Self {
        match err {
            CalibrationError::OutOfRange => Error::CalibrationOutOfRange,
            CalibrationError::InvalidParameter => Error::InvalidParameter,
        }
    }
}

impl<I2cError: core::fmt::Debug> core::fmt::Display for Error<I2cError> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "I2C error: {:?}", e),
            Error::CalibrationOutOfRange => write!(f, "calibration value out of register range"),
            Error::InvalidParameter => write!(f, "invalid calibration parameter"),
            Error::NotCalibrated => write!(f, "device not calibrated"),
        }
    }
}

impl core::fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CalibrationError::OutOfRange => write!(f, "calibration value out of register range"),
            CalibrationError::InvalidParameter => write!(f, "invalid calibration parameter"),
        }
    }
}
