#![cfg(not(feature = "async"))]

use embedded_hal::i2c::ErrorKind;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};
use ina226_rs::calibration::CalibrationParams;
use ina226_rs::data_types::{AlertFunction, AlertOptions, Averaging, Config, ConversionTime, OperatingMode, ShuntSpec};
use ina226_rs::driver::Ina226;
use ina226_rs::error::Error;

const ADDR: u8 = 0x40;

fn assert_close(actual: f32, expected: f32) {
    let tol = expected.abs() * 1e-5 + 1e-9;
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual}"
    );
}

/// CONFIG = 0x4CDF, CALIBRATION = 1706 (0x06AA).
fn default_calibration_writes() -> [I2cTrans; 2] {
    [
        I2cTrans::write(ADDR, vec![0x00, 0x4C, 0xDF]),
        I2cTrans::write(ADDR, vec![0x05, 0x06, 0xAA]),
    ]
}

#[test]
fn calibrate_writes_config_then_calibration() {
    let mock = I2cMock::new(&default_calibration_writes());
    let mut driver = Ina226::new(mock);
    assert!(!driver.is_calibrated());
    driver.calibrate(&CalibrationParams::default()).unwrap();

    let cal = driver.calibration().unwrap();
    assert_eq!(cal.register_value(), 1706);
    assert_close(cal.current_lsb(), 30e-6);
    driver.free().done();
}

#[test]
fn calibrate_uses_custom_config_and_shunt() {
    // 16 samples, 1.1 ms bus, 140 µs shunt, shunt-triggered:
    // 0x4000 | 0b010 << 9 | 0b100 << 6 | 0b000 << 3 | 0b001 = 0x4501
    // "20 A / 75 mV" shunt -> CAL 1950 (0x079E)
    let config = Config {
        averaging: Averaging::X16,
        bus_conversion_time: ConversionTime::Us1100,
        shunt_conversion_time: ConversionTime::Us140,
        mode: OperatingMode::ShuntTriggered,
    };
    let expectations = [
        I2cTrans::write(ADDR, vec![0x00, 0x45, 0x01]),
        I2cTrans::write(ADDR, vec![0x05, 0x07, 0x9E]),
    ];
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::new(mock);
    let params = CalibrationParams::default()
        .with_config(config)
        .with_shunt(ShuntSpec::ByNominalCurrent(20.0));
    driver.calibrate(&params).unwrap();
    assert_eq!(driver.calibration().unwrap().register_value(), 1950);
    driver.free().done();
}

#[test]
fn recalibration_overwrites_previous_state() {
    let mut expectations = default_calibration_writes().to_vec();
    // 10 mΩ shunt: same CAL, LSB ten times larger.
    expectations.extend(default_calibration_writes());
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::new(mock);

    driver.calibrate(&CalibrationParams::default()).unwrap();
    driver
        .calibrate(&CalibrationParams::default().with_shunt(ShuntSpec::ByResistance(10.0)))
        .unwrap();
    assert_close(driver.calibration().unwrap().current_lsb(), 300e-6);
    driver.free().done();
}

#[test]
fn out_of_range_calibration_writes_nothing_and_keeps_state() {
    let mock = I2cMock::new(&default_calibration_writes());
    let mut driver = Ina226::new(mock);
    driver.calibrate(&CalibrationParams::default()).unwrap();
    let before = *driver.calibration().unwrap();

    let params = CalibrationParams::default()
        .with_max_current(0.001)
        .with_shunt(ShuntSpec::ByResistance(1.0));
    let err = driver.calibrate(&params).unwrap_err();
    assert!(matches!(err, Error::CalibrationOutOfRange));
    assert_eq!(driver.calibration(), Some(&before));
    driver.free().done();
}

#[test]
fn invalid_parameter_is_reported_before_any_write() {
    let expectations: [I2cTrans; 0] = [];
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::new(mock);
    let params = CalibrationParams::default().with_shunt(ShuntSpec::ByResistance(-1.0));
    assert!(matches!(driver.calibrate(&params), Err(Error::InvalidParameter)));
    assert!(!driver.is_calibrated());
    driver.free().done();
}

#[test]
fn failed_calibration_write_leaves_device_uncalibrated() {
    let expectations = [
        I2cTrans::write(ADDR, vec![0x00, 0x4C, 0xDF]),
        I2cTrans::write(ADDR, vec![0x05, 0x06, 0xAA]).with_error(ErrorKind::Other),
    ];
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::new(mock);
    let err = driver.calibrate(&CalibrationParams::default()).unwrap_err();
    assert!(matches!(err, Error::I2c(ErrorKind::Other)));
    assert!(!driver.is_calibrated());
    driver.free().done();
}

#[test]
fn current_and_power_require_calibration() {
    let expectations: [I2cTrans; 0] = [];
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::new(mock);
    assert!(matches!(driver.current(), Err(Error::NotCalibrated)));
    assert!(matches!(driver.power(), Err(Error::NotCalibrated)));
    assert!(matches!(driver.read_measurements(), Err(Error::NotCalibrated)));
    assert!(matches!(driver.restore_calibration(), Err(Error::NotCalibrated)));
    driver.free().done();
}

#[test]
fn voltages_are_readable_before_calibration() {
    let expectations = [
        // 0x0C80 = 3200 counts × 1.25 mV = 4.0 V
        I2cTrans::write_read(ADDR, vec![0x02], vec![0x0C, 0x80]),
        // 0xFC18 = -1000 counts × 2.5 µV = -2.5 mV
        I2cTrans::write_read(ADDR, vec![0x01], vec![0xFC, 0x18]),
    ];
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::new(mock);
    assert_close(driver.bus_voltage().unwrap(), 4.0);
    assert_close(driver.shunt_voltage().unwrap(), -2.5e-3);
    driver.free().done();
}

#[test]
fn current_and_power_apply_stored_lsb() {
    let mut expectations = default_calibration_writes().to_vec();
    expectations.extend([
        // -100 counts × 30 µA
        I2cTrans::write_read(ADDR, vec![0x04], vec![0xFF, 0x9C]),
        // 400 counts × 750 µW
        I2cTrans::write_read(ADDR, vec![0x03], vec![0x01, 0x90]),
    ]);
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::new(mock);
    driver.calibrate(&CalibrationParams::default()).unwrap();
    assert_close(driver.current().unwrap(), -0.003);
    assert_close(driver.power().unwrap(), 0.3);
    driver.free().done();
}

#[test]
fn read_measurements_reads_all_four_registers() {
    let mut expectations = default_calibration_writes().to_vec();
    expectations.extend([
        I2cTrans::write_read(ADDR, vec![0x02], vec![0x25, 0x80]),
        I2cTrans::write_read(ADDR, vec![0x01], vec![0x03, 0xE8]),
        I2cTrans::write_read(ADDR, vec![0x04], vec![0x00, 0x64]),
        I2cTrans::write_read(ADDR, vec![0x03], vec![0x00, 0x30]),
    ]);
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::new(mock);
    driver.calibrate(&CalibrationParams::default()).unwrap();

    let m = driver.read_measurements().unwrap();
    assert_close(m.bus_voltage_v, 12.0);
    assert_close(m.shunt_voltage_v, 2.5e-3);
    assert_close(m.current_a, 0.003);
    assert_close(m.power_w, 48.0 * 750e-6);
    driver.free().done();
}

#[test]
fn bus_error_is_propagated_unchanged() {
    let expectations = [I2cTrans::write_read(ADDR, vec![0x02], vec![0x00, 0x00]).with_error(ErrorKind::Bus)];
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::new(mock);
    assert!(matches!(driver.bus_voltage(), Err(Error::I2c(ErrorKind::Bus))));
    driver.free().done();
}

#[test]
fn reset_drops_calibration() {
    let mut expectations = default_calibration_writes().to_vec();
    expectations.push(I2cTrans::write(ADDR, vec![0x00, 0xC0, 0x00]));
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::new(mock);
    driver.calibrate(&CalibrationParams::default()).unwrap();
    driver.reset().unwrap();
    assert!(!driver.is_calibrated());
    assert!(matches!(driver.current(), Err(Error::NotCalibrated)));
    driver.free().done();
}

#[test]
fn restore_calibration_rewrites_register() {
    let mut expectations = default_calibration_writes().to_vec();
    expectations.push(I2cTrans::write(ADDR, vec![0x05, 0x06, 0xAA]));
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::new(mock);
    driver.calibrate(&CalibrationParams::default()).unwrap();
    driver.restore_calibration().unwrap();
    driver.free().done();
}

#[test]
fn config_read_and_write() {
    let expectations = [
        I2cTrans::write_read(ADDR, vec![0x00], vec![0x41, 0x27]),
        I2cTrans::write(ADDR, vec![0x00, 0x4C, 0xDF]),
    ];
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::new(mock);
    let config = driver.read_config().unwrap();
    assert_eq!(config.averaging, Averaging::X1);
    assert_eq!(config.bus_conversion_time, ConversionTime::Us1100);
    assert_eq!(config.shunt_conversion_time, ConversionTime::Us1100);
    assert_eq!(config.mode, OperatingMode::ShuntBusContinuous);
    driver.set_config(Config::default()).unwrap();
    driver.free().done();
}

#[test]
fn set_alert_writes_limit_then_mask() {
    // Bus over-voltage at 12 V (9600 = 0x2580), latched, active-low.
    let expectations = [
        I2cTrans::write(ADDR, vec![0x07, 0x25, 0x80]),
        I2cTrans::write(ADDR, vec![0x06, 0x20, 0x01]),
        I2cTrans::write(ADDR, vec![0x06, 0x00, 0x00]),
    ];
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::new(mock);
    let options = AlertOptions {
        active_high: false,
        latch: true,
    };
    driver
        .set_alert(AlertFunction::BusOverVoltage, ina226_rs::registers::bus_volts_to_raw(12.0), options)
        .unwrap();
    driver.clear_alert().unwrap();
    driver.free().done();
}

#[test]
fn read_flags_decodes_mask_enable() {
    // CVRF | OVF
    let expectations = [
        I2cTrans::write_read(ADDR, vec![0x06], vec![0x00, 0x0C]),
        I2cTrans::write_read(ADDR, vec![0x06], vec![0x00, 0x10]),
    ];
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::new(mock);
    let flags = driver.read_flags().unwrap();
    assert!(flags.conversion_ready);
    assert!(flags.math_overflow);
    assert!(!flags.alert);
    assert!(!driver.conversion_ready().unwrap());
    driver.free().done();
}

#[test]
fn identification_registers_with_custom_address() {
    let expectations = [
        I2cTrans::write_read(0x45, vec![0xFE], vec![0x54, 0x49]),
        I2cTrans::write_read(0x45, vec![0xFF], vec![0x22, 0x60]),
    ];
    let mock = I2cMock::new(&expectations);
    let mut driver = Ina226::with_address(mock, 0x45);
    assert_eq!(driver.address(), 0x45);
    assert_eq!(driver.read_manufacturer_id().unwrap(), ina226_rs::registers::MANUFACTURER_ID);
    assert_eq!(driver.read_die_id().unwrap(), ina226_rs::registers::DIE_ID);
    driver.free().done();
}
