//! Fault status checking and recovery
//!
//! One call to [`FaultMonitor::check`] is one firing of the periodic fault
//! poll:
//!
//! 1. Read `REG_FAULT`. A failed read is logged and the firing ends; the next
//!    one is still scheduled.
//! 2. Keep only the alertable bits (over-current, DC offset, over-temperature).
//!    The serial clock error bit is ignored.
//! 3. Report each alertable bit that is set now but was clear last time.
//!    A fault that persists across polls is reported once; a fault that clears
//!    and comes back is reported again.
//! 4. Remember the new mask.
//! 5. While any alertable fault is present, pulse SDZ off then on to clear
//!    latched faults. The "on" write is attempted even if the "off" write
//!    failed so the device is not left in shutdown.
//!
//! The remembered mask is only written from inside a firing, plus the reset
//! on activation, which never overlaps a firing.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use platform::RegisterMap;

use crate::registers::{FaultStatus, PowerCtrl, REG_FAULT, REG_POWER_CTRL};

/// Outcome of the SDZ off/on recovery pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryPulse<E> {
    /// Result of forcing SDZ to shutdown.
    pub off: Result<(), E>,
    /// Result of forcing SDZ back on.
    pub on: Result<(), E>,
}

/// What a single fault check observed and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCheck<E> {
    /// The fault register could not be read. Nothing else happened.
    ReadFailed(E),
    /// No alertable fault present.
    Clear,
    /// At least one alertable fault present.
    Faulted {
        /// Alertable faults currently present.
        present: FaultStatus,
        /// Faults that were newly raised by this check and reported.
        raised: FaultStatus,
        /// The recovery pulse that followed.
        recovery: RecoveryPulse<E>,
    },
}

/// Edge-triggered fault tracker for one device.
pub struct FaultMonitor<M: RawMutex> {
    last: BlockingMutex<M, Cell<FaultStatus>>,
    reports: BlockingMutex<M, Cell<u32>>,
}

impl<M: RawMutex> FaultMonitor<M> {
    /// New monitor with an empty fault history.
    pub const fn new() -> Self {
        Self {
            last: BlockingMutex::new(Cell::new(FaultStatus::empty())),
            reports: BlockingMutex::new(Cell::new(0)),
        }
    }

    /// Forget previously observed faults.
    pub fn reset(&self) {
        self.last.lock(|last| last.set(FaultStatus::empty()));
    }

    /// Alertable faults seen by the most recent successful check.
    pub fn last(&self) -> FaultStatus {
        self.last.lock(Cell::get)
    }

    /// Number of fault reports raised since creation.
    pub fn reports(&self) -> u32 {
        self.reports.lock(Cell::get)
    }

    /// Run one fault check against `regs`.
    pub async fn check<R: RegisterMap>(&self, regs: &mut R) -> FaultCheck<R::Error> {
        let raw = match regs.read(REG_FAULT).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("tas5720: failed to read FAULT register");
                return FaultCheck::ReadFailed(e);
            }
        };

        let present = FaultStatus::from_bits_truncate(raw) & FaultStatus::ALERTABLE;
        let raised = present.difference(self.last());
        for fault in raised.iter() {
            self.report(fault);
        }
        self.last.lock(|last| last.set(present));

        if present.is_empty() {
            return FaultCheck::Clear;
        }

        FaultCheck::Faulted {
            present,
            raised,
            recovery: Self::pulse_sdz(regs).await,
        }
    }

    fn report(&self, fault: FaultStatus) {
        error!("tas5720: {} hardware fault", fault.describe());
        self.reports
            .lock(|count| count.set(count.get().saturating_add(1)));
    }

    async fn pulse_sdz<R: RegisterMap>(regs: &mut R) -> RecoveryPulse<R::Error> {
        let sdz = PowerCtrl::SDZ.bits();
        let off = regs.write_bits(REG_POWER_CTRL, sdz, 0).await;
        if off.is_err() {
            error!("tas5720: failed to write POWER_CTRL register");
        }
        let on = regs.write_bits(REG_POWER_CTRL, sdz, sdz).await;
        if on.is_err() {
            error!("tas5720: failed to write POWER_CTRL register");
        }
        RecoveryPulse { off, on }
    }
}

impl<M: RawMutex> Default for FaultMonitor<M> {
    fn default() -> Self {
        Self::new()
    }
}
