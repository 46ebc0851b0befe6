//! Mixer controls
//!
//! Two controls are exposed to the audio framework:
//!
//! | Name | Registers | Range |
//! |------|-----------|-------|
//! | `Speaker Driver Playback Volume` | `0x04` / `0x05` | −103.5 dB … +24 dB, 0.5 dB steps |
//! | `Speaker Driver Analog Gain` | `0x06` bits 3:2 | 19.2 / 22.6 / 25.0 dB |
//!
//! Volume codes below 7 are effectively silent on the device.

use platform::{DbScale, OutOfRangeError, RegisterMap};

use crate::error::{Error, Result};
use crate::registers::{
    AnalogCtrl, ANALOG_GAIN_SHIFT, REG_ANALOG_CTRL, REG_LEFT_VOLUME, REG_RIGHT_VOLUME,
};

/// Name of the stereo volume control.
pub const VOLUME_CONTROL: &str = "Speaker Driver Playback Volume";

/// Name of the analog gain control.
pub const GAIN_CONTROL: &str = "Speaker Driver Analog Gain";

/// Volume register scale: code 0 = −103.5 dB, 0.5 dB per code.
pub const VOLUME_SCALE: DbScale = DbScale {
    min_centi_db: -10_350,
    step_centi_db: 50,
    max_code: 0xFF,
};

/// Analog gain settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogGain {
    /// 19.2 dB
    Db19_2,
    /// 22.6 dB
    Db22_6,
    /// 25.0 dB
    Db25_0,
}

impl AnalogGain {
    /// All settings in register code order.
    pub const ALL: [Self; 3] = [Self::Db19_2, Self::Db22_6, Self::Db25_0];

    /// Register field value.
    pub const fn code(self) -> u8 {
        match self {
            Self::Db19_2 => 0,
            Self::Db22_6 => 1,
            Self::Db25_0 => 2,
        }
    }

    /// Setting for a register field value. Code 3 is reserved.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Db19_2),
            1 => Some(Self::Db22_6),
            2 => Some(Self::Db25_0),
            _ => None,
        }
    }

    /// Gain in 0.01 dB.
    pub const fn centi_db(self) -> i32 {
        match self {
            Self::Db19_2 => 1_920,
            Self::Db22_6 => 2_260,
            Self::Db25_0 => 2_500,
        }
    }
}

/// Raw volume register codes for both channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StereoVolume {
    /// Left channel code
    pub left: u8,
    /// Right channel code
    pub right: u8,
}

impl StereoVolume {
    /// Same code on both channels.
    pub const fn both(code: u8) -> Self {
        Self {
            left: code,
            right: code,
        }
    }

    /// Codes for levels given in 0.01 dB, rounded down to the 0.5 dB grid.
    pub fn from_centi_db(left: i32, right: i32) -> core::result::Result<Self, OutOfRangeError> {
        Ok(Self {
            left: VOLUME_SCALE.code_for(left)?,
            right: VOLUME_SCALE.code_for(right)?,
        })
    }

    /// Levels in 0.01 dB as `(left, right)`.
    pub fn centi_db(self) -> (i32, i32) {
        // Every u8 code is on the scale.
        (
            VOLUME_SCALE.to_centi_db(self.left).unwrap_or(VOLUME_SCALE.min_centi_db),
            VOLUME_SCALE.to_centi_db(self.right).unwrap_or(VOLUME_SCALE.min_centi_db),
        )
    }
}

/// Kind-specific description of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Two full-width registers, one per channel, on a linear dB scale.
    StereoVolume {
        /// Left channel register
        left_reg: u8,
        /// Right channel register
        right_reg: u8,
        /// Code → level mapping
        scale: DbScale,
    },
    /// A bitfield selecting one of a few fixed gains.
    GainSelect {
        /// Register holding the field
        reg: u8,
        /// Field offset
        shift: u8,
        /// Selectable gains, in code order, in 0.01 dB
        levels: &'static [i32],
    },
}

/// Static metadata for one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlInfo {
    /// Name shown to the user
    pub name: &'static str,
    /// Layout and scale
    pub kind: ControlKind,
}

/// Controls registered with the audio framework.
pub const CONTROLS: [ControlInfo; 2] = [
    ControlInfo {
        name: VOLUME_CONTROL,
        kind: ControlKind::StereoVolume {
            left_reg: REG_LEFT_VOLUME,
            right_reg: REG_RIGHT_VOLUME,
            scale: VOLUME_SCALE,
        },
    },
    ControlInfo {
        name: GAIN_CONTROL,
        kind: ControlKind::GainSelect {
            reg: REG_ANALOG_CTRL,
            shift: ANALOG_GAIN_SHIFT,
            levels: &[
                AnalogGain::Db19_2.centi_db(),
                AnalogGain::Db22_6.centi_db(),
                AnalogGain::Db25_0.centi_db(),
            ],
        },
    },
];

/// Write both channel volumes. Unchanged channels are not rewritten.
pub async fn set_volume<R: RegisterMap>(regs: &mut R, volume: StereoVolume) -> Result<(), R::Error> {
    regs.update_bits(REG_LEFT_VOLUME, 0xFF, volume.left)
        .await
        .map_err(Error::Bus)?;
    regs.update_bits(REG_RIGHT_VOLUME, 0xFF, volume.right)
        .await
        .map_err(Error::Bus)?;
    Ok(())
}

/// Read both channel volumes.
pub async fn volume<R: RegisterMap>(regs: &mut R) -> Result<StereoVolume, R::Error> {
    let left = regs.read(REG_LEFT_VOLUME).await.map_err(Error::Bus)?;
    let right = regs.read(REG_RIGHT_VOLUME).await.map_err(Error::Bus)?;
    Ok(StereoVolume { left, right })
}

/// Select the analog gain.
pub async fn set_analog_gain<R: RegisterMap>(regs: &mut R, gain: AnalogGain) -> Result<(), R::Error> {
    regs.update_bits(
        REG_ANALOG_CTRL,
        AnalogCtrl::ANALOG_GAIN.bits(),
        gain.code().wrapping_shl(u32::from(ANALOG_GAIN_SHIFT)),
    )
    .await
    .map_err(Error::Bus)?;
    Ok(())
}

/// Select the analog gain by raw control value, as delivered by a mixer.
pub async fn set_analog_gain_code<R: RegisterMap>(regs: &mut R, code: u8) -> Result<(), R::Error> {
    let gain = AnalogGain::from_code(code).ok_or(Error::InvalidControlValue)?;
    set_analog_gain(regs, gain).await
}

/// Current analog gain.
///
/// Fails with [`Error::InvalidControlValue`] if the field holds the reserved
/// code.
pub async fn analog_gain<R: RegisterMap>(regs: &mut R) -> Result<AnalogGain, R::Error> {
    let raw = regs.read(REG_ANALOG_CTRL).await.map_err(Error::Bus)?;
    let code = (raw & AnalogCtrl::ANALOG_GAIN.bits()).wrapping_shr(u32::from(ANALOG_GAIN_SHIFT));
    AnalogGain::from_code(code).ok_or(Error::InvalidControlValue)
}
