//! Compile-time driver configuration
//!
//! Timing and identity constants for the TAS5720. Values come from the
//! datasheet (settle time) or are driver policy (fault polling interval).

use embassy_time::Duration;
use platform::RegmapConfig;

use crate::registers;

/// Default 7-bit I²C address (ADR pin strapping 0b00).
pub const I2C_ADDRESS: u8 = 0x6C;

/// Interval between fault status polls while the device is active.
///
/// Also the delay before the first poll after activation.
pub const FAULT_CHECK_INTERVAL: Duration = Duration::from_millis(200);

/// Shutdown-to-active time after clearing SDZ (datasheet nominal value,
/// no extra padding).
pub const SETTLE_TIME: Duration = Duration::from_millis(25);

/// Driver name.
pub const DRIVER_NAME: &str = "tas5720";

/// Device-tree style compatible string.
pub const COMPATIBLE: &str = "ti,tas5720";

/// Name of the playback stream the DAI attaches to.
pub const STREAM_NAME: &str = "Playback";

/// Register map description for [`platform::I2cRegmap`] at `address`.
pub const fn regmap_config(address: u8) -> RegmapConfig {
    RegmapConfig {
        address,
        is_volatile: registers::is_volatile,
    }
}
