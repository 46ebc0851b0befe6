//! Byte-addressed register map abstraction
//!
//! Amplifier and codec control ports are 8-bit registers behind a narrow
//! command/response bus. Drivers talk to them through [`RegisterMap`] so the
//! transport, the cache policy and the test doubles are interchangeable.
//!
//! [`I2cRegmap`] is the hardware implementation: one I²C transaction per
//! register access, plus a write-through cache for registers that only change
//! when the driver writes them.
//!
//! # Cache rules
//!
//! - Volatile registers (status, identity) are never served from cache.
//! - A failed write leaves the cached value untouched.
//! - [`RegisterMap::update_bits`] skips the bus write when the new value
//!   equals the current one; [`RegisterMap::write_bits`] always writes.

use embedded_hal_async::i2c::I2c;

/// Synchronous-in-spirit register primitive over an addressed register map.
///
/// Implementations serialise nothing themselves; callers that share one map
/// between contexts wrap it in a mutex.
pub trait RegisterMap {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read one register.
    async fn read(&mut self, reg: u8) -> Result<u8, Self::Error>;

    /// Write one register.
    async fn write(&mut self, reg: u8, value: u8) -> Result<(), Self::Error>;

    /// Read-modify-write the bits selected by `mask`.
    ///
    /// Returns `true` when the register value changed and was written.
    /// No bus write is issued when the value is already correct.
    async fn update_bits(&mut self, reg: u8, mask: u8, value: u8) -> Result<bool, Self::Error> {
        let old = self.read(reg).await?;
        let new = (old & !mask) | (value & mask);
        if new == old {
            return Ok(false);
        }
        self.write(reg, new).await?;
        Ok(true)
    }

    /// Read-modify-write the bits selected by `mask`, always issuing the write.
    ///
    /// Used where the write itself is the point (pulses, forced init), so a
    /// stale cache can never suppress it.
    async fn write_bits(&mut self, reg: u8, mask: u8, value: u8) -> Result<(), Self::Error> {
        let old = self.read(reg).await?;
        self.write(reg, (old & !mask) | (value & mask)).await
    }
}

/// Static description of a device's register map.
#[derive(Clone, Copy)]
pub struct RegmapConfig {
    /// 7-bit I²C address of the device.
    pub address: u8,
    /// Returns `true` for registers whose value may change outside driver
    /// writes. These are never cached.
    pub is_volatile: fn(u8) -> bool,
}

impl core::fmt::Debug for RegmapConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegmapConfig")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Errors returned by [`I2cRegmap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegmapError<E> {
    /// The I²C transaction failed.
    Bus(E),
    /// The register address lies beyond the end of the map.
    InvalidRegister(u8),
}

impl<E: core::fmt::Debug> core::fmt::Display for RegmapError<E> {
    #[allow(clippy::use_debug)] // HAL error types only guarantee Debug
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "I2C bus error: {e:?}"),
            Self::InvalidRegister(reg) => write!(f, "register {reg:#04x} is outside the map"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for RegmapError<E> {}

/// I²C-backed register map with a write-through cache.
///
/// `N` is the number of registers in the map (last address + 1). Every
/// access is a single-byte transaction: reads are `write_read` with one
/// address byte and one data byte, writes are `[reg, value]`.
pub struct I2cRegmap<I, const N: usize> {
    i2c: I,
    config: RegmapConfig,
    cache: [Option<u8>; N],
}

impl<I: I2c, const N: usize> I2cRegmap<I, N> {
    /// Create a register map over `i2c`. The cache starts empty.
    pub fn new(i2c: I, config: RegmapConfig) -> Self {
        Self {
            i2c,
            config,
            cache: [None; N],
        }
    }

    /// The configuration this map was built with.
    pub fn config(&self) -> &RegmapConfig {
        &self.config
    }

    /// Value currently held in the cache for `reg`, if any.
    pub fn cached(&self, reg: u8) -> Option<u8> {
        self.cache.get(usize::from(reg)).copied().flatten()
    }

    /// Drop every cached value; the next read of each register goes to the bus.
    pub fn invalidate(&mut self) {
        self.cache = [None; N];
    }

    /// Give back the underlying bus.
    pub fn release(self) -> I {
        self.i2c
    }

    fn slot(&mut self, reg: u8) -> Result<&mut Option<u8>, RegmapError<I::Error>> {
        self.cache
            .get_mut(usize::from(reg))
            .ok_or(RegmapError::InvalidRegister(reg))
    }
}

impl<I: I2c, const N: usize> RegisterMap for I2cRegmap<I, N> {
    type Error = RegmapError<I::Error>;

    async fn read(&mut self, reg: u8) -> Result<u8, Self::Error> {
        let volatile = (self.config.is_volatile)(reg);
        if let Some(value) = *self.slot(reg)? {
            if !volatile {
                return Ok(value);
            }
        }

        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.config.address, &[reg], &mut buf)
            .await
            .map_err(RegmapError::Bus)?;

        let [value] = buf;
        if !volatile {
            *self.slot(reg)? = Some(value);
        }
        Ok(value)
    }

    async fn write(&mut self, reg: u8, value: u8) -> Result<(), Self::Error> {
        // Range check before touching the bus.
        self.slot(reg)?;
        self.i2c
            .write(self.config.address, &[reg, value])
            .await
            .map_err(RegmapError::Bus)?;
        if !(self.config.is_volatile)(reg) {
            *self.slot(reg)? = Some(value);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x6C;
    const STATUS: u8 = 0x08;

    fn config() -> RegmapConfig {
        RegmapConfig {
            address: ADDR,
            is_volatile: |reg| reg == STATUS,
        }
    }

    fn map(expectations: &[I2cTransaction]) -> I2cRegmap<I2cMock, 0x12> {
        I2cRegmap::new(I2cMock::new(expectations), config())
    }

    #[tokio::test]
    async fn test_cached_read_hits_bus_once() {
        let mut regs = map(&[I2cTransaction::write_read(ADDR, vec![0x03], vec![0x11])]);
        assert_eq!(regs.read(0x03).await.unwrap(), 0x11);
        assert_eq!(regs.read(0x03).await.unwrap(), 0x11);
        assert_eq!(regs.cached(0x03), Some(0x11));
        regs.release().done();
    }

    #[tokio::test]
    async fn test_volatile_read_always_hits_bus() {
        let mut regs = map(&[
            I2cTransaction::write_read(ADDR, vec![STATUS], vec![0x00]),
            I2cTransaction::write_read(ADDR, vec![STATUS], vec![0x04]),
        ]);
        assert_eq!(regs.read(STATUS).await.unwrap(), 0x00);
        assert_eq!(regs.read(STATUS).await.unwrap(), 0x04);
        assert_eq!(regs.cached(STATUS), None);
        regs.release().done();
    }

    #[tokio::test]
    async fn test_write_populates_cache() {
        let mut regs = map(&[I2cTransaction::write(ADDR, vec![0x01, 0x01])]);
        regs.write(0x01, 0x01).await.unwrap();
        // Served from cache: no further expectation on the bus.
        assert_eq!(regs.read(0x01).await.unwrap(), 0x01);
        regs.release().done();
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched() {
        let mut regs = map(&[
            I2cTransaction::write(ADDR, vec![0x01, 0x01]),
            I2cTransaction::write(ADDR, vec![0x01, 0x00]).with_error(ErrorKind::Other),
        ]);
        regs.write(0x01, 0x01).await.unwrap();
        assert_eq!(
            regs.write(0x01, 0x00).await,
            Err(RegmapError::Bus(ErrorKind::Other))
        );
        assert_eq!(regs.cached(0x01), Some(0x01));
        regs.release().done();
    }

    #[tokio::test]
    async fn test_update_bits_skips_unchanged_value() {
        let mut regs = map(&[
            I2cTransaction::write_read(ADDR, vec![0x03], vec![0x00]),
            I2cTransaction::write(ADDR, vec![0x03, 0x03]),
        ]);
        assert!(regs.update_bits(0x03, 0x03, 0x03).await.unwrap());
        // Second identical request: cache says nothing changes, no bus write.
        assert!(!regs.update_bits(0x03, 0x03, 0x03).await.unwrap());
        regs.release().done();
    }

    #[tokio::test]
    async fn test_update_bits_preserves_unmasked_bits() {
        let mut regs = map(&[
            I2cTransaction::write_read(ADDR, vec![0x02], vec![0b1000_0100]),
            I2cTransaction::write(ADDR, vec![0x02, 0b1000_1100]),
        ]);
        regs.update_bits(0x02, 0b0000_1000, 0xFF).await.unwrap();
        regs.release().done();
    }

    #[tokio::test]
    async fn test_write_bits_always_writes() {
        let mut regs = map(&[
            I2cTransaction::write(ADDR, vec![0x01, 0x01]),
            I2cTransaction::write(ADDR, vec![0x01, 0x01]),
        ]);
        regs.write(0x01, 0x01).await.unwrap();
        regs.write_bits(0x01, 0x01, 0x01).await.unwrap();
        regs.release().done();
    }

    #[tokio::test]
    async fn test_out_of_range_register_rejected_without_bus_traffic() {
        let mut regs = map(&[]);
        assert_eq!(regs.read(0x12).await, Err(RegmapError::InvalidRegister(0x12)));
        assert_eq!(
            regs.write(0x40, 0x00).await,
            Err(RegmapError::InvalidRegister(0x40))
        );
        regs.release().done();
    }

    #[tokio::test]
    async fn test_invalidate_forces_bus_read() {
        let mut regs = map(&[
            I2cTransaction::write_read(ADDR, vec![0x06], vec![0x80]),
            I2cTransaction::write_read(ADDR, vec![0x06], vec![0x84]),
        ]);
        assert_eq!(regs.read(0x06).await.unwrap(), 0x80);
        regs.invalidate();
        assert_eq!(regs.read(0x06).await.unwrap(), 0x84);
        regs.release().done();
    }

    #[test]
    fn test_display_bus_error() {
        let err: RegmapError<ErrorKind> = RegmapError::Bus(ErrorKind::Other);
        assert_eq!(err.to_string(), "I2C bus error: Other");
    }
}
