//! TAS5720 register map
//!
//! Source: TI TAS5720L / TAS5720M datasheet, "Register Maps" section.
//!
//! # I²C Constraints
//!
//! All registers are 8 bits wide behind an 8-bit address. Every access is a
//! single-register transaction; the driver never relies on auto-increment.
//!
//! ## Volatile registers
//! `REG_DEVICE_ID` and `REG_FAULT` change outside driver writes and must
//! always be read from the bus. Everything else is write-through cacheable.
//!
//! ## ANALOG_CTRL bit 7
//! Bit 7 of `REG_ANALOG_CTRL` is documented as reserved but must be written
//! as 1 during initialisation. Its purpose is not documented.
//!
//! ## Digital clip
//! `REG_DIGITAL_CLIP2` / `REG_DIGITAL_CLIP1` exist on the device but the
//! driver never touches them.

use bitflags::bitflags;

// ---------------------------------------------------------------------------
// Register addresses
// ---------------------------------------------------------------------------

/// Device identification (read-only, volatile)
pub const REG_DEVICE_ID: u8 = 0x00;

/// Power control: shutdown (SDZ), sleep, digital clip bits
pub const REG_POWER_CTRL: u8 = 0x01;

/// Digital control 1: HPF bypass, digital boost, double-rate, serial format
pub const REG_DIGITAL_CTRL1: u8 = 0x02;

/// Volume control configuration: fade, per-channel mute
pub const REG_VOLUME_CTRL_CFG: u8 = 0x03;

/// Left channel volume, `0x00..=0xFF` → −103.5 dB + 0.5 dB × code
pub const REG_LEFT_VOLUME: u8 = 0x04;

/// Right channel volume, same scale as [`REG_LEFT_VOLUME`]
pub const REG_RIGHT_VOLUME: u8 = 0x05;

/// Analog control: reserved bit 7, PWM rate, analog gain, channel select
pub const REG_ANALOG_CTRL: u8 = 0x06;

/// Fault status (volatile)
pub const REG_FAULT: u8 = 0x08;

/// Digital clip 2 (unused)
pub const REG_DIGITAL_CLIP2: u8 = 0x10;

/// Digital clip 1 (unused)
pub const REG_DIGITAL_CLIP1: u8 = 0x11;

/// Highest register address
pub const REG_MAX: u8 = REG_DIGITAL_CLIP1;

/// Number of addressable registers, the cache size of the register map.
pub const REG_COUNT: usize = 0x12;

/// Value `REG_DEVICE_ID` must read back for a supported part.
pub const DEVICE_ID: u8 = 0x00;

/// Returns `true` for registers that must never be served from a cache.
pub fn is_volatile(reg: u8) -> bool {
    matches!(reg, REG_DEVICE_ID | REG_FAULT)
}

// ---------------------------------------------------------------------------
// Field layouts
// ---------------------------------------------------------------------------

bitflags! {
    /// `REG_POWER_CTRL` bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PowerCtrl: u8 {
        /// Shutdown control, active low: 1 = device on, 0 = shutdown.
        const SDZ = 1 << 0;
        /// Sleep mode.
        const SLEEP = 1 << 1;
        /// Digital clip level, upper six bits.
        const DIGITAL_CLIP = 0b1111_1100;
    }
}

bitflags! {
    /// `REG_DIGITAL_CTRL1` bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DigitalCtrl1: u8 {
        /// High-pass filter bypass.
        const HPF_BYPASS = 1 << 7;
        /// Digital boost, 2-bit field.
        const DIGITAL_BOOST = 0b0011_0000;
        /// Double-rate (88.2/96 kHz) speed select.
        const DOUBLE_RATE = 1 << 3;
        /// Serial audio input format, 3-bit field. See [`SaifFormat`].
        const SAIF_FORMAT = 0b0000_0111;
    }
}

bitflags! {
    /// `REG_VOLUME_CTRL_CFG` bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VolumeCtrlCfg: u8 {
        /// Volume fade enable.
        const FADE = 1 << 7;
        /// Mute right channel.
        const MUTE_RIGHT = 1 << 1;
        /// Mute left channel.
        const MUTE_LEFT = 1 << 0;
        /// Both mute bits.
        const MUTE = Self::MUTE_LEFT.bits() | Self::MUTE_RIGHT.bits();
    }
}

bitflags! {
    /// `REG_ANALOG_CTRL` bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AnalogCtrl: u8 {
        /// Reserved, must be set during initialisation.
        const RESERVED7 = 1 << 7;
        /// PWM rate, 3-bit field.
        const PWM_RATE = 0b0111_0000;
        /// Analog gain, 2-bit field. See `controls::AnalogGain`.
        const ANALOG_GAIN = 0b0000_1100;
        /// Channel select (left / right) in mono mode.
        const CHANNEL_SELECT = 1 << 1;
    }
}

/// Bit offset of the analog gain field in `REG_ANALOG_CTRL`.
pub const ANALOG_GAIN_SHIFT: u8 = 2;

bitflags! {
    /// `REG_FAULT` bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FaultStatus: u8 {
        /// Over-temperature error.
        const OTE = 1 << 0;
        /// DC offset detection error.
        const DCE = 1 << 1;
        /// Over-current error.
        const OCE = 1 << 2;
        /// Serial audio clock error. Read but never acted on.
        const CLKE = 1 << 3;
        /// Over-current threshold setting, 2-bit field.
        const OC_THRESHOLD = 0b0011_0000;
    }
}

impl FaultStatus {
    /// Fault conditions that are reported and trigger a recovery pulse.
    pub const ALERTABLE: Self = Self::OCE.union(Self::DCE).union(Self::OTE);

    /// Human-readable description of a single alertable fault bit.
    pub fn describe(self) -> &'static str {
        if self == Self::OCE {
            "over current"
        } else if self == Self::DCE {
            "DC detection"
        } else if self == Self::OTE {
            "over temperature"
        } else if self == Self::CLKE {
            "serial clock"
        } else {
            "unknown"
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FaultStatus {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(f, "FaultStatus({=u8:#x})", self.bits());
    }
}

/// Serial audio input format codes for [`DigitalCtrl1::SAIF_FORMAT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SaifFormat {
    /// Right-justified, 24-bit
    RightJustified24 = 0b000,
    /// Right-justified, 20-bit
    RightJustified20 = 0b001,
    /// Right-justified, 18-bit
    RightJustified18 = 0b010,
    /// Right-justified, 16-bit
    RightJustified16 = 0b011,
    /// I²S
    I2s = 0b100,
    /// Left-justified
    LeftJustified = 0b101,
}

impl SaifFormat {
    /// Raw field value.
    pub const fn bits(self) -> u8 {
        self as u8
    }
}
