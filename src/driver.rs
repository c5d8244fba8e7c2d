//! INA226 driver.
//! Blocking I2C API; the async version mirrors it behind the `async` feature with `_async` suffixes.

use crate::calibration::{Calibration, CalibrationParams};
use crate::data_types::{AlertFunction, AlertOptions, Config, Measurements, StatusFlags};
use crate::error::Error;
use crate::registers::{ConfigBits, DEFAULT_I2C_ADDRESS, MaskEnableBits, addr, bus_raw_to_volts, shunt_raw_to_volts};

/// INA226 current/power monitor.
///
/// Starts uncalibrated: bus and shunt voltage can be read right away, current and power
/// return [`Error::NotCalibrated`] until [`calibrate`](Self::calibrate) succeeds.
pub struct Ina226<I2C> {
    i2c: I2C,
    address: u8,
    calibration: Option<Calibration>,
}

impl<I2C> Ina226<I2C> {
    /// Create a new driver instance with the default I2C address (0x40).
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_I2C_ADDRESS)
    }

    /// Create a new driver instance with a custom I2C address (0x40..=0x4F via A0/A1).
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            calibration: None,
        }
    }

    /// Return the 7-bit I2C address configured for this instance.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Calibration from the last successful [`calibrate`](Self::calibrate), if any.
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    /// Release the underlying bus.
    pub fn free(self) -> I2C {
        self.i2c
    }

    fn require_calibration<E>(&self) -> Result<Calibration, Error<E>> {
        self.calibration.ok_or(Error::NotCalibrated)
    }
}

fn alert_mask(function: AlertFunction, options: AlertOptions) -> u16 {
    (function.mask_bit() | options.bits()).bits()
}

impl<I2C> Ina226<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Write a 16-bit register (MSB first).
    pub fn write_reg(&mut self, reg: u8, value: u16) -> Result<(), Error<I2C::Error>> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c.write(self.address, &[reg, hi, lo]).map_err(Error::I2c)
    }

    /// Read a 16-bit register (MSB first).
    pub fn read_reg(&mut self, reg: u8) -> Result<u16, Error<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(Error::I2c)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Compute the calibration for `params`, then write CONFIG and CALIBRATION.
    ///
    /// Nothing is written if the computation fails. The stored calibration is only replaced
    /// once both writes have succeeded.
    pub fn calibrate(&mut self, params: &CalibrationParams) -> Result<(), Error<I2C::Error>> {
        let calibration = Calibration::compute(params)?;
        self.write_reg(addr::CONFIG, params.config.bits())?;
        self.write_reg(addr::CALIBRATION, calibration.register_value())?;
        self.calibration = Some(calibration);
        Ok(())
    }

    /// Rewrite the stored calibration value, e.g. after the chip lost it in a brown-out.
    pub fn restore_calibration(&mut self) -> Result<(), Error<I2C::Error>> {
        let calibration = self.require_calibration::<I2C::Error>()?;
        self.write_reg(addr::CALIBRATION, calibration.register_value())
    }

    /// Software reset. All registers return to power-on defaults, so the calibration is dropped.
    pub fn reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_reg(addr::CONFIG, (ConfigBits::RST | ConfigBits::FIXED).bits())?;
        self.calibration = None;
        Ok(())
    }

    /// Write CONFIG without touching the calibration. In triggered modes this starts a conversion.
    pub fn set_config(&mut self, config: Config) -> Result<(), Error<I2C::Error>> {
        self.write_reg(addr::CONFIG, config.bits())
    }

    pub fn read_config(&mut self) -> Result<Config, Error<I2C::Error>> {
        let raw = self.read_reg(addr::CONFIG)?;
        Ok(Config::from_bits(raw))
    }

    /// Bus voltage in volts (1.25 mV LSB). Does not need calibration.
    pub fn bus_voltage(&mut self) -> Result<f32, Error<I2C::Error>> {
        let raw = self.read_reg(addr::BUS_VOLTAGE)?;
        Ok(bus_raw_to_volts(raw))
    }

    /// Shunt voltage in volts (2.5 µV LSB, signed). Does not need calibration.
    pub fn shunt_voltage(&mut self) -> Result<f32, Error<I2C::Error>> {
        let raw = self.read_reg(addr::SHUNT_VOLTAGE)?;
        Ok(shunt_raw_to_volts(raw))
    }

    /// Current in amps (signed).
    pub fn current(&mut self) -> Result<f32, Error<I2C::Error>> {
        let calibration = self.require_calibration::<I2C::Error>()?;
        let raw = self.read_reg(addr::CURRENT)?;
        Ok(calibration.current_from_raw(raw))
    }

    /// Power in watts.
    pub fn power(&mut self) -> Result<f32, Error<I2C::Error>> {
        let calibration = self.require_calibration::<I2C::Error>()?;
        let raw = self.read_reg(addr::POWER)?;
        Ok(calibration.power_from_raw(raw))
    }

    /// Read bus voltage, shunt voltage, current and power in that order.
    pub fn read_measurements(&mut self) -> Result<Measurements, Error<I2C::Error>> {
        let calibration = self.require_calibration::<I2C::Error>()?;
        let bus = self.read_reg(addr::BUS_VOLTAGE)?;
        let shunt = self.read_reg(addr::SHUNT_VOLTAGE)?;
        let current = self.read_reg(addr::CURRENT)?;
        let power = self.read_reg(addr::POWER)?;
        Ok(Measurements {
            bus_voltage_v: bus_raw_to_volts(bus),
            shunt_voltage_v: shunt_raw_to_volts(shunt),
            current_a: calibration.current_from_raw(current),
            power_w: calibration.power_from_raw(power),
        })
    }

    /// Select the ALERT source and its threshold. `limit` is in the units of the monitored
    /// register (see `bus_volts_to_raw`, `shunt_volts_to_raw`, [`Calibration::power_to_raw`]).
    pub fn set_alert(
        &mut self,
        function: AlertFunction,
        limit: u16,
        options: AlertOptions,
    ) -> Result<(), Error<I2C::Error>> {
        self.write_reg(addr::ALERT_LIMIT, limit)?;
        self.write_reg(addr::MASK_ENABLE, alert_mask(function, options))
    }

    /// Disable every ALERT source.
    pub fn clear_alert(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_reg(addr::MASK_ENABLE, 0)
    }

    /// Read MASK_ENABLE raw bits. Reading clears CVRF and a latched alert.
    pub fn read_mask_enable(&mut self) -> Result<MaskEnableBits, Error<I2C::Error>> {
        let raw = self.read_reg(addr::MASK_ENABLE)?;
        Ok(MaskEnableBits::from_bits_truncate(raw))
    }

    pub fn read_flags(&mut self) -> Result<StatusFlags, Error<I2C::Error>> {
        Ok(self.read_mask_enable()?.into())
    }

    pub fn conversion_ready(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.read_flags()?.conversion_ready)
    }

    pub fn read_manufacturer_id(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_reg(addr::MANUFACTURER_ID)
    }

    pub fn read_die_id(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_reg(addr::DIE_ID)
    }
}

#[cfg(feature = "async")]
impl<I2C> Ina226<I2C>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    pub async fn write_reg_async(&mut self, reg: u8, value: u16) -> Result<(), Error<I2C::Error>> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c
            .write(self.address, &[reg, hi, lo])
            .await
            .map_err(Error::I2c)
    }

    pub async fn read_reg_async(&mut self, reg: u8) -> Result<u16, Error<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .await
            .map_err(Error::I2c)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Async version of [`calibrate`](Self::calibrate).
    pub async fn calibrate_async(&mut self, params: &CalibrationParams) -> Result<(), Error<I2C::Error>> {
        let calibration = Calibration::compute(params)?;
        self.write_reg_async(addr::CONFIG, params.config.bits()).await?;
        self.write_reg_async(addr::CALIBRATION, calibration.register_value())
            .await?;
        self.calibration = Some(calibration);
        Ok(())
    }

    pub async fn restore_calibration_async(&mut self) -> Result<(), Error<I2C::Error>> {
        let calibration = self.require_calibration::<I2C::Error>()?;
        self.write_reg_async(addr::CALIBRATION, calibration.register_value())
            .await
    }

    pub async fn reset_async(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_reg_async(addr::CONFIG, (ConfigBits::RST | ConfigBits::FIXED).bits())
            .await?;
        self.calibration = None;
        Ok(())
    }

    pub async fn set_config_async(&mut self, config: Config) -> Result<(), Error<I2C::Error>> {
        self.write_reg_async(addr::CONFIG, config.bits()).await
    }

    pub async fn read_config_async(&mut self) -> Result<Config, Error<I2C::Error>> {
        let raw = self.read_reg_async(addr::CONFIG).await?;
        Ok(Config::from_bits(raw))
    }

    pub async fn bus_voltage_async(&mut self) -> Result<f32, Error<I2C::Error>> {
        let raw = self.read_reg_async(addr::BUS_VOLTAGE).await?;
        Ok(bus_raw_to_volts(raw))
    }

    pub async fn shunt_voltage_async(&mut self) -> Result<f32, Error<I2C::Error>> {
        let raw = self.read_reg_async(addr::SHUNT_VOLTAGE).await?;
        Ok(shunt_raw_to_volts(raw))
    }

    pub async fn current_async(&mut self) -> Result<f32, Error<I2C::Error>> {
        let calibration = self.require_calibration::<I2C::Error>()?;
        let raw = self.read_reg_async(addr::CURRENT).await?;
        Ok(calibration.current_from_raw(raw))
    }

    pub async fn power_async(&mut self) -> Result<f32, Error<I2C::Error>> {
        let calibration = self.require_calibration::<I2C::Error>()?;
        let raw = self.read_reg_async(addr::POWER).await?;
        Ok(calibration.power_from_raw(raw))
    }

    pub async fn read_measurements_async(&mut self) -> Result<Measurements, Error<I2C::Error>> {
        let calibration = self.require_calibration::<I2C::Error>()?;
        let bus = self.read_reg_async(addr::BUS_VOLTAGE).await?;
        let shunt = self.read_reg_async(addr::SHUNT_VOLTAGE).await?;
        let current = self.read_reg_async(addr::CURRENT).await?;
        let power = self.read_reg_async(addr::POWER).await?;
        Ok(Measurements {
            bus_voltage_v: bus_raw_to_volts(bus),
            shunt_voltage_v: shunt_raw_to_volts(shunt),
            current_a: calibration.current_from_raw(current),
            power_w: calibration.power_from_raw(power),
        })
    }

    pub async fn set_alert_async(
        &mut self,
        function: AlertFunction,
        limit: u16,
        options: AlertOptions,
    ) -> Result<(), Error<I2C::Error>> {
        self.write_reg_async(addr::ALERT_LIMIT, limit).await?;
        self.write_reg_async(addr::MASK_ENABLE, alert_mask(function, options))
            .await
    }

    pub async fn clear_alert_async(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_reg_async(addr::MASK_ENABLE, 0).await
    }

    pub async fn read_mask_enable_async(&mut self) -> Result<MaskEnableBits, Error<I2C::Error>> {
        let raw = self.read_reg_async(addr::MASK_ENABLE).await?;
        Ok(MaskEnableBits::from_bits_truncate(raw))
    }

    pub async fn read_flags_async(&mut self) -> Result<StatusFlags, Error<I2C::Error>> {
        Ok(self.read_mask_enable_async().await?.into())
    }

    pub async fn conversion_ready_async(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.read_flags_async().await?.conversion_ready)
    }

    pub async fn read_manufacturer_id_async(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_reg_async(addr::MANUFACTURER_ID).await
    }

    pub async fn read_die_id_async(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_reg_async(addr::DIE_ID).await
    }
}
