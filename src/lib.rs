//! INA226 Rust Driver
//!
//! `no_std` driver for the TI INA226 bidirectional current/power monitor over I2C.
//! Calibration is derived from the shunt parameters ([`CalibrationParams`]); measurements are
//! returned in volts, amps and watts. Optional async API (`async` feature) and `defmt` support.
//!
//! ```no_run
//! # fn demo<I2C: embedded_hal::i2c::I2c>(i2c: I2C) -> Result<(), ina226_rs::Error<I2C::Error>> {
//! use ina226_rs::{CalibrationParams, Ina226, ShuntSpec};
//!
//! let mut ina = Ina226::new(i2c);
//! ina.calibrate(&CalibrationParams::default().with_shunt(ShuntSpec::ByResistance(10.0)))?;
//! let amps = ina.current()?;
//! # let _ = amps;
//! # Ok(())
//! # }
//! ```

#![no_std]

pub mod calibration;
pub mod data_types;
pub mod driver;
pub mod error;
pub mod registers;

pub use calibration::{Calibration, CalibrationParams};
pub use data_types::{Config, Measurements, ShuntSpec};
pub use driver::Ina226;
pub use error::{CalibrationError, Error};
pub use registers::DEFAULT_I2C_ADDRESS;
