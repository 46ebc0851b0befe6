//! Stream rate and serial format configuration
//!
//! Both settings live in `REG_DIGITAL_CTRL1` in disjoint fields and are
//! applied read-modify-write. Validation happens before any register access,
//! so a rejected request leaves the device untouched.

use platform::{ClockInversion, ClockRole, DaiFormat, RegisterMap, SerialFormat};

use crate::error::{Error, Result};
use crate::registers::{DigitalCtrl1, SaifFormat, REG_DIGITAL_CTRL1};

/// Sample rates the device accepts, in Hz.
pub const SUPPORTED_RATES: [u32; 4] = [44_100, 48_000, 88_200, 96_000];

/// Double-rate setting for `rate`.
///
/// `Some(false)` for single-rate (44.1/48 kHz), `Some(true)` for double-rate
/// (88.2/96 kHz), `None` for anything else.
pub const fn double_rate_for(rate: u32) -> Option<bool> {
    match rate {
        44_100 | 48_000 => Some(false),
        88_200 | 96_000 => Some(true),
        _ => None,
    }
}

/// Physical serial format for a logical DAI format.
///
/// The device must consume both clocks and only understands normal clock
/// polarity. DSP_A is received as I²S and DSP_B as left-justified: in a
/// one-slot frame the data starts at the same bit clock.
pub fn saif_format_for<E>(fmt: DaiFormat) -> Result<SaifFormat, E> {
    if fmt.role != ClockRole::Consumer {
        return Err(Error::UnsupportedRole);
    }
    if fmt.inversion != ClockInversion::None {
        return Err(Error::UnsupportedFormat);
    }
    match fmt.format {
        SerialFormat::I2s | SerialFormat::DspA => Ok(SaifFormat::I2s),
        SerialFormat::LeftJustified | SerialFormat::DspB => Ok(SaifFormat::LeftJustified),
        SerialFormat::RightJustified => Err(Error::UnsupportedFormat),
    }
}

/// Select single- or double-rate operation for `rate`.
pub async fn apply_rate<R: RegisterMap>(regs: &mut R, rate: u32) -> Result<(), R::Error> {
    let double = double_rate_for(rate).ok_or(Error::UnsupportedRate(rate))?;
    let value = if double { DigitalCtrl1::DOUBLE_RATE } else { DigitalCtrl1::empty() };
    regs.update_bits(REG_DIGITAL_CTRL1, DigitalCtrl1::DOUBLE_RATE.bits(), value.bits())
        .await
        .map_err(Error::Bus)?;
    debug!("tas5720: rate {} Hz, double rate {}", rate, double);
    Ok(())
}

/// Program the serial audio input format for `fmt`.
pub async fn apply_format<R: RegisterMap>(regs: &mut R, fmt: DaiFormat) -> Result<(), R::Error> {
    let saif = saif_format_for(fmt)?;
    regs.update_bits(REG_DIGITAL_CTRL1, DigitalCtrl1::SAIF_FORMAT.bits(), saif.bits())
        .await
        .map_err(Error::Bus)?;
    debug!("tas5720: serial format code {}", saif.bits());
    Ok(())
}
