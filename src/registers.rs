//! Register map and constants for INA226.
//! Addresses, field layouts and LSB weights are copied from the datasheet (SBOS547).

/// Default I2C address with A0 = A1 = GND.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x40;

/// Register addresses. All registers are 16-bit, transferred MSB first.
pub mod addr {
    /// Configuration (averaging, conversion times, operating mode).
    pub const CONFIG: u8 = 0x00;
    /// Shunt voltage, signed, 2.5 µV LSB (read-only).
    pub const SHUNT_VOLTAGE: u8 = 0x01;
    /// Bus voltage, 1.25 mV LSB (read-only).
    pub const BUS_VOLTAGE: u8 = 0x02;
    /// Power, unsigned, LSB = 25 × current LSB (read-only).
    pub const POWER: u8 = 0x03;
    /// Current, signed, LSB set by the calibration register (read-only).
    pub const CURRENT: u8 = 0x04;
    /// Calibration value used by the on-chip current/power math.
    pub const CALIBRATION: u8 = 0x05;
    /// Alert function selection and status flags.
    pub const MASK_ENABLE: u8 = 0x06;
    /// Threshold compared against the selected alert function.
    pub const ALERT_LIMIT: u8 = 0x07;
    /// Manufacturer ID, reads 0x5449 ("TI").
    pub const MANUFACTURER_ID: u8 = 0xFE;
    /// Die ID, reads 0x2260.
    pub const DIE_ID: u8 = 0xFF;
}

pub const MANUFACTURER_ID: u16 = 0x5449;
pub const DIE_ID: u16 = 0x2260;

/// Shunt voltage register LSB (V).
pub const SHUNT_LSB_V: f32 = 2.5e-6;
/// Bus voltage register LSB (V).
pub const BUS_LSB_V: f32 = 1.25e-3;
/// Full-scale shunt voltage: 32768 × 2.5 µV.
pub const SHUNT_FULL_RANGE_MV: f32 = 81.92;

/// Fixed constant of the calibration equation `CAL = 0.00512 / (Current_LSB × R_shunt)`.
pub const CAL_CONSTANT: f64 = 0.00512;
/// Power LSB is fixed at 25 × Current LSB.
pub const POWER_LSB_FACTOR: f32 = 25.0;
/// Positive range of the signed current register.
pub const CURRENT_FULL_SCALE_COUNTS: f64 = 32_768.0;

/// Field offsets inside CONFIG.
pub const AVG_SHIFT: u16 = 9;
pub const VBUSCT_SHIFT: u16 = 6;
pub const VSHCT_SHIFT: u16 = 3;
pub const MODE_SHIFT: u16 = 0;

bitflags::bitflags! {
    /// CONFIG register bits (0x00).
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct ConfigBits: u16 {
        /// Bit 15: Software reset, self-clearing.
        const RST          = 1 << 15;
        /// Bit 14: Reads back as 1; kept set on every write.
        const FIXED        = 1 << 14;
        // Bits 13-12 reserved.
        /// Bits 11-9: Averaging mode.
        const AVG_MASK     = 0b111 << 9;
        /// Bits 8-6: Bus voltage conversion time.
        const VBUSCT_MASK  = 0b111 << 6;
        /// Bits 5-3: Shunt voltage conversion time.
        const VSHCT_MASK   = 0b111 << 3;
        /// Bits 2-0: Operating mode.
        const MODE_MASK    = 0b111;
    }

    /// MASK_ENABLE register bits (0x06). Bits 15-10 select the ALERT source (only one at a time);
    /// bits 4-2 are status flags; bits 1-0 configure the ALERT pin.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct MaskEnableBits: u16 {
        /// Shunt voltage over-voltage.
        const SOL  = 1 << 15;
        /// Shunt voltage under-voltage.
        const SUL  = 1 << 14;
        /// Bus voltage over-voltage.
        const BOL  = 1 << 13;
        /// Bus voltage under-voltage.
        const BUL  = 1 << 12;
        /// Power over-limit.
        const POL  = 1 << 11;
        /// Conversion ready on ALERT.
        const CNVR = 1 << 10;
        // Bits 9-5 reserved.
        /// Alert function flag.
        const AFF  = 1 << 4;
        /// Conversion ready flag, cleared by reading MASK_ENABLE or writing CONFIG.
        const CVRF = 1 << 3;
        /// Math overflow: current or power data may be invalid.
        const OVF  = 1 << 2;
        /// ALERT pin active-high.
        const APOL = 1 << 1;
        /// Latch ALERT until MASK_ENABLE is read.
        const LEN  = 1 << 0;
    }
}

/// Power-on default CONFIG value (1 sample, 1.1 ms conversions, continuous shunt+bus).
pub const CONFIG_RESET_VALUE: u16 = 0x4127;

/// Convert a raw SHUNT_VOLTAGE reading (two's complement) to volts.
pub fn shunt_raw_to_volts(raw: u16) -> f32 {
    raw as i16 as f32 * SHUNT_LSB_V
}

/// Convert a raw BUS_VOLTAGE reading to volts. Bit 15 is always 0 on a healthy part,
/// so the signed interpretation matches the unsigned one for every valid reading.
pub fn bus_raw_to_volts(raw: u16) -> f32 {
    raw as i16 as f32 * BUS_LSB_V
}

/// Convert bus volts to the raw code used by ALERT_LIMIT for BOL/BUL. Clamps to the register range.
pub fn bus_volts_to_raw(volts: f32) -> u16 {
    let counts = libm::roundf(volts / BUS_LSB_V);
    counts.clamp(0.0, i16::MAX as f32) as u16
}

/// Convert shunt volts to the raw code used by ALERT_LIMIT for SOL/SUL. Clamps to the register range.
pub fn shunt_volts_to_raw(volts: f32) -> u16 {
    let counts = libm::roundf(volts / SHUNT_LSB_V);
    counts.clamp(i16::MIN as f32, i16::MAX as f32) as i16 as u16
}
