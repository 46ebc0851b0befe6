//! Driver error type

/// Errors returned by the TAS5720 driver.
///
/// `E` is the error type of the underlying register map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A register read or write failed.
    Bus(E),
    /// Sample rate is not one of 44.1, 48, 88.2 or 96 kHz.
    UnsupportedRate(u32),
    /// Serial format or clock inversion the device cannot receive.
    UnsupportedFormat,
    /// The device only works as bit-clock and frame-clock consumer.
    UnsupportedRole,
    /// The identity register did not match.
    DeviceNotFound {
        /// Expected identity value
        expected: u8,
        /// Value read from the device
        found: u8,
    },
    /// A control value outside the control's range.
    InvalidControlValue,
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    #[allow(clippy::use_debug)] // bus errors only guarantee Debug
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "register access failed: {e:?}"),
            Self::UnsupportedRate(rate) => write!(f, "unsupported sample rate {rate} Hz"),
            Self::UnsupportedFormat => write!(f, "unsupported DAI format"),
            Self::UnsupportedRole => write!(f, "unsupported clock role, device must be clock consumer"),
            Self::DeviceNotFound { expected, found } => {
                write!(f, "wrong device ID: expected {expected:#04x}, read {found:#04x}")
            }
            Self::InvalidControlValue => write!(f, "control value out of range"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for Error<E> {}

/// Result alias for driver operations over register map error `E`.
pub type Result<T, E> = core::result::Result<T, Error<E>>;
