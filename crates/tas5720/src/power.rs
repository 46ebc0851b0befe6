//! Power state and SDZ control
//!
//! The TAS5720 keeps all registers while in shutdown and wakes in
//! [`SETTLE_TIME`](crate::config::SETTLE_TIME), so the driver parks it in
//! shutdown whenever the playback pipeline is down.

use platform::RegisterMap;

use crate::registers::{PowerCtrl, REG_POWER_CTRL};

/// Device power state as tracked by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// SDZ low, lowest current draw. Initial state.
    #[default]
    Shutdown,
    /// SDZ high, amplifier running, fault monitor scheduled.
    Active,
}

/// Force the SDZ bit. `on = true` takes the device out of shutdown.
///
/// The write is always issued, even if a cached value says SDZ already has
/// the requested level.
pub async fn set_sdz<R: RegisterMap>(regs: &mut R, on: bool) -> Result<(), R::Error> {
    let value = if on { PowerCtrl::SDZ } else { PowerCtrl::empty() };
    regs.write_bits(REG_POWER_CTRL, PowerCtrl::SDZ.bits(), value.bits())
        .await
}
