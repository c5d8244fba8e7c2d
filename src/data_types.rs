//! Data types for INA226 driver, based on the datasheet field encodings.

use crate::registers::{AVG_SHIFT, ConfigBits, MODE_SHIFT, MaskEnableBits, VBUSCT_SHIFT, VSHCT_SHIFT};

/// Number of samples averaged per reading (CONFIG bits 11-9).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Averaging {
    X1,
    X4,
    X16,
    X64,
    X128,
    X256,
    X512,
    X1024,
}

impl Averaging {
    /// 3-bit field code.
    pub fn code(self) -> u16 {
        match self {
            Averaging::X1 => 0b000,
            Averaging::X4 => 0b001,
            Averaging::X16 => 0b010,
            Averaging::X64 => 0b011,
            Averaging::X128 => 0b100,
            Averaging::X256 => 0b101,
            Averaging::X512 => 0b110,
            Averaging::X1024 => 0b111,
        }
    }

    /// Decode a 3-bit field code; higher bits are ignored.
    pub fn from_code(code: u16) -> Self {
        match code & 0b111 {
            0b000 => Averaging::X1,
            0b001 => Averaging::X4,
            0b010 => Averaging::X16,
            0b011 => Averaging::X64,
            0b100 => Averaging::X128,
            0b101 => Averaging::X256,
            0b110 => Averaging::X512,
            _ => Averaging::X1024,
        }
    }

    pub fn samples(self) -> u16 {
        match self {
            Averaging::X1 => 1,
            Averaging::X4 => 4,
            Averaging::X16 => 16,
            Averaging::X64 => 64,
            Averaging::X128 => 128,
            Averaging::X256 => 256,
            Averaging::X512 => 512,
            Averaging::X1024 => 1024,
        }
    }
}

/// ADC conversion time, shared encoding for VBUSCT (bits 8-6) and VSHCT (bits 5-3).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConversionTime {
    Us140,
    Us204,
    Us332,
    Us588,
    Us1100,
    Us2116,
    Us4156,
    Us8244,
}

impl ConversionTime {
    pub fn code(self) -> u16 {
        match self {
            ConversionTime::Us140 => 0b000,
            ConversionTime::Us204 => 0b001,
            ConversionTime::Us332 => 0b010,
            ConversionTime::Us588 => 0b011,
            ConversionTime::Us1100 => 0b100,
            ConversionTime::Us2116 => 0b101,
            ConversionTime::Us4156 => 0b110,
            ConversionTime::Us8244 => 0b111,
        }
    }

    pub fn from_code(code: u16) -> Self {
        match code & 0b111 {
            0b000 => ConversionTime::Us140,
            0b001 => ConversionTime::Us204,
            0b010 => ConversionTime::Us332,
            0b011 => ConversionTime::Us588,
            0b100 => ConversionTime::Us1100,
            0b101 => ConversionTime::Us2116,
            0b110 => ConversionTime::Us4156,
            _ => ConversionTime::Us8244,
        }
    }

    /// Nominal conversion time in microseconds.
    pub fn micros(self) -> u32 {
        match self {
            ConversionTime::Us140 => 140,
            ConversionTime::Us204 => 204,
            ConversionTime::Us332 => 332,
            ConversionTime::Us588 => 588,
            ConversionTime::Us1100 => 1_100,
            ConversionTime::Us2116 => 2_116,
            ConversionTime::Us4156 => 4_156,
            ConversionTime::Us8244 => 8_244,
        }
    }
}

/// Operating mode (CONFIG bits 2-0).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperatingMode {
    PowerDown,
    ShuntTriggered,
    BusTriggered,
    ShuntBusTriggered,
    /// Second power-down encoding (0b100).
    PowerDownAlt,
    ShuntContinuous,
    BusContinuous,
    ShuntBusContinuous,
}

impl OperatingMode {
    pub fn code(self) -> u16 {
        match self {
            OperatingMode::PowerDown => 0b000,
            OperatingMode::ShuntTriggered => 0b001,
            OperatingMode::BusTriggered => 0b010,
            OperatingMode::ShuntBusTriggered => 0b011,
            OperatingMode::PowerDownAlt => 0b100,
            OperatingMode::ShuntContinuous => 0b101,
            OperatingMode::BusContinuous => 0b110,
            OperatingMode::ShuntBusContinuous => 0b111,
        }
    }

    pub fn from_code(code: u16) -> Self {
        match code & 0b111 {
            0b000 => OperatingMode::PowerDown,
            0b001 => OperatingMode::ShuntTriggered,
            0b010 => OperatingMode::BusTriggered,
            0b011 => OperatingMode::ShuntBusTriggered,
            0b100 => OperatingMode::PowerDownAlt,
            0b101 => OperatingMode::ShuntContinuous,
            0b110 => OperatingMode::BusContinuous,
            _ => OperatingMode::ShuntBusContinuous,
        }
    }

    /// True for the single-shot modes that need a CONFIG write per conversion.
    pub fn is_triggered(self) -> bool {
        matches!(
            self,
            OperatingMode::ShuntTriggered | OperatingMode::BusTriggered | OperatingMode::ShuntBusTriggered
        )
    }
}

/// Decoded CONFIG register.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    pub averaging: Averaging,
    pub bus_conversion_time: ConversionTime,
    pub shunt_conversion_time: ConversionTime,
    pub mode: OperatingMode,
}

impl Default for Config {
    /// 512 samples, 588 µs conversions, continuous shunt and bus (0x4CDF).
    fn default() -> Self {
        Self {
            averaging: Averaging::X512,
            bus_conversion_time: ConversionTime::Us588,
            shunt_conversion_time: ConversionTime::Us588,
            mode: OperatingMode::ShuntBusContinuous,
        }
    }
}

impl Config {
    /// Encode into the CONFIG register word. Bit 14 is always set, RST never.
    pub fn bits(&self) -> u16 {
        ConfigBits::FIXED.bits()
            | (self.averaging.code() << AVG_SHIFT)
            | (self.bus_conversion_time.code() << VBUSCT_SHIFT)
            | (self.shunt_conversion_time.code() << VSHCT_SHIFT)
            | (self.mode.code() << MODE_SHIFT)
    }

    /// Decode a CONFIG register word. Reserved and reset bits are ignored.
    pub fn from_bits(bits: u16) -> Self {
        let bits = ConfigBits::from_bits_truncate(bits);
        let field = |mask: ConfigBits, shift: u16| (bits & mask).bits() >> shift;
        Self {
            averaging: Averaging::from_code(field(ConfigBits::AVG_MASK, AVG_SHIFT)),
            bus_conversion_time: ConversionTime::from_code(field(ConfigBits::VBUSCT_MASK, VBUSCT_SHIFT)),
            shunt_conversion_time: ConversionTime::from_code(field(ConfigBits::VSHCT_MASK, VSHCT_SHIFT)),
            mode: OperatingMode::from_code(field(ConfigBits::MODE_MASK, MODE_SHIFT)),
        }
    }

    /// Time for one complete averaged reading in the current mode, in microseconds.
    pub fn total_conversion_micros(&self) -> u32 {
        let per_sample = match self.mode {
            OperatingMode::PowerDown | OperatingMode::PowerDownAlt => 0,
            OperatingMode::ShuntTriggered | OperatingMode::ShuntContinuous => self.shunt_conversion_time.micros(),
            OperatingMode::BusTriggered | OperatingMode::BusContinuous => self.bus_conversion_time.micros(),
            OperatingMode::ShuntBusTriggered | OperatingMode::ShuntBusContinuous => {
                self.shunt_conversion_time.micros() + self.bus_conversion_time.micros()
            }
        };
        per_sample * self.averaging.samples() as u32
    }
}

/// How the shunt is described to the calibration.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShuntSpec {
    /// Shunt resistance in milliohms.
    ByResistance(f32),
    /// Nominal current (A) of a dedicated shunt rated for the dropout voltage,
    /// e.g. a "20 A / 75 mV" shunt is `ByNominalCurrent(20.0)`.
    ByNominalCurrent(f32),
}

/// Source driving the ALERT pin. Only one can be active.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlertFunction {
    ShuntOverVoltage,
    ShuntUnderVoltage,
    BusOverVoltage,
    BusUnderVoltage,
    PowerOverLimit,
    ConversionReady,
}

impl AlertFunction {
    pub fn mask_bit(self) -> MaskEnableBits {
        match self {
            AlertFunction::ShuntOverVoltage => MaskEnableBits::SOL,
            AlertFunction::ShuntUnderVoltage => MaskEnableBits::SUL,
            AlertFunction::BusOverVoltage => MaskEnableBits::BOL,
            AlertFunction::BusUnderVoltage => MaskEnableBits::BUL,
            AlertFunction::PowerOverLimit => MaskEnableBits::POL,
            AlertFunction::ConversionReady => MaskEnableBits::CNVR,
        }
    }
}

/// ALERT pin electrical behaviour.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AlertOptions {
    /// Drive ALERT high when asserted (default is active-low open drain).
    pub active_high: bool,
    /// Hold ALERT until MASK_ENABLE is read.
    pub latch: bool,
}

impl AlertOptions {
    pub fn bits(&self) -> MaskEnableBits {
        let mut bits = MaskEnableBits::empty();
        if self.active_high {
            bits |= MaskEnableBits::APOL;
        }
        if self.latch {
            bits |= MaskEnableBits::LEN;
        }
        bits
    }
}

/// Status flags decoded from MASK_ENABLE.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StatusFlags {
    pub alert: bool,
    pub conversion_ready: bool,
    pub math_overflow: bool,
}

impl From<MaskEnableBits> for StatusFlags {
    fn from(bits: MaskEnableBits) -> Self {
        Self {
            alert: bits.contains(MaskEnableBits::AFF),
            conversion_ready: bits.contains(MaskEnableBits::CVRF),
            math_overflow: bits.contains(MaskEnableBits::OVF),
        }
    }
}

/// One reading of every measured quantity, in SI units.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Measurements {
    pub bus_voltage_v: f32,
    pub shunt_voltage_v: f32,
    pub current_a: f32,
    pub power_w: f32,
}
