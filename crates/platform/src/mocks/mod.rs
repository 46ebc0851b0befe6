//! Mock implementations for testing
//!
//! [`MockRegisterMap`] is an in-memory register file implementing
//! [`RegisterMap`]. It records every access with a timestamp, can replay
//! scripted read values (e.g. a sequence of status register samples) and can
//! be told to fail specific reads or writes.
//!
//! Clones share the same register file, so a test keeps one handle for
//! inspection while the driver owns the other.

#![cfg(any(test, feature = "std"))]

use core::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::vec::Vec;

use embassy_time::Instant;

use crate::RegisterMap;

/// Error injected by [`MockRegisterMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError;

impl core::fmt::Display for MockBusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "injected bus error")
    }
}

impl std::error::Error for MockBusError {}

/// Kind of register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// A register read; `value` is what was returned (0 on failure).
    Read,
    /// A register write; `value` is what was written.
    Write,
}

/// One journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    /// Read or write.
    pub kind: AccessKind,
    /// Register address.
    pub reg: u8,
    /// Value read or written.
    pub value: u8,
    /// `false` if the access was failed by injection.
    pub ok: bool,
    /// When the access happened.
    pub at: Instant,
}

#[derive(Default)]
struct MockBus {
    regs: BTreeMap<u8, u8>,
    scripted_reads: BTreeMap<u8, VecDeque<Result<u8, MockBusError>>>,
    failing_writes: BTreeMap<u8, usize>,
    journal: Vec<Access>,
}

/// In-memory register map with an access journal.
#[derive(Clone, Default)]
pub struct MockRegisterMap {
    bus: Rc<RefCell<MockBus>>,
}

impl MockRegisterMap {
    /// Create a mock with every register reading 0x00.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with_register(self, reg: u8, value: u8) -> Self {
        self.set(reg, value);
        self
    }

    /// Set a register's stored value without journaling.
    pub fn set(&self, reg: u8, value: u8) {
        self.bus.borrow_mut().regs.insert(reg, value);
    }

    /// Current stored value of a register.
    pub fn get(&self, reg: u8) -> u8 {
        self.bus.borrow().regs.get(&reg).copied().unwrap_or(0)
    }

    /// Queue values (or failures) returned by the next reads of `reg`, in order.
    ///
    /// Once the script runs dry, reads fall back to the stored value.
    pub fn script_reads<I>(&self, reg: u8, reads: I)
    where
        I: IntoIterator<Item = Result<u8, MockBusError>>,
    {
        self.bus
            .borrow_mut()
            .scripted_reads
            .entry(reg)
            .or_default()
            .extend(reads);
    }

    /// Make the next `count` writes to `reg` fail.
    pub fn fail_writes(&self, reg: u8, count: usize) {
        let mut bus = self.bus.borrow_mut();
        let remaining = bus.failing_writes.entry(reg).or_default();
        *remaining = remaining.saturating_add(count);
    }

    /// Every access so far, oldest first.
    pub fn journal(&self) -> Vec<Access> {
        self.bus.borrow().journal.clone()
    }

    /// Attempted writes as `(reg, value)`, oldest first, failed ones included.
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.bus
            .borrow()
            .journal
            .iter()
            .filter(|a| a.kind == AccessKind::Write)
            .map(|a| (a.reg, a.value))
            .collect()
    }

    /// Number of read attempts on `reg`.
    pub fn reads_of(&self, reg: u8) -> usize {
        self.bus
            .borrow()
            .journal
            .iter()
            .filter(|a| a.kind == AccessKind::Read && a.reg == reg)
            .count()
    }

    /// Forget the journal, keep register contents and scripts.
    pub fn clear_journal(&self) {
        self.bus.borrow_mut().journal.clear();
    }
}

impl RegisterMap for MockRegisterMap {
    type Error = MockBusError;

    async fn read(&mut self, reg: u8) -> Result<u8, Self::Error> {
        let mut bus = self.bus.borrow_mut();
        let scripted = bus.scripted_reads.get_mut(&reg).and_then(VecDeque::pop_front);
        let result = match scripted {
            Some(scripted) => scripted,
            None => Ok(bus.regs.get(&reg).copied().unwrap_or(0)),
        };
        bus.journal.push(Access {
            kind: AccessKind::Read,
            reg,
            value: *result.as_ref().unwrap_or(&0),
            ok: result.is_ok(),
            at: Instant::now(),
        });
        result
    }

    async fn write(&mut self, reg: u8, value: u8) -> Result<(), Self::Error> {
        let mut bus = self.bus.borrow_mut();
        let fail = match bus.failing_writes.get_mut(&reg) {
            Some(remaining) if *remaining > 0 => {
                *remaining = remaining.saturating_sub(1);
                true
            }
            _ => false,
        };
        bus.journal.push(Access {
            kind: AccessKind::Write,
            reg,
            value,
            ok: !fail,
            at: Instant::now(),
        });
        if fail {
            return Err(MockBusError);
        }
        bus.regs.insert(reg, value);
        Ok(())
    }
}
