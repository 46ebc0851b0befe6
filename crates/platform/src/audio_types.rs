//! Control-surface newtypes for compile-time safety.
//!
//! Mixer controls hand raw register codes to the framework together with a
//! description of what those codes mean in decibels. These types keep that
//! mapping in one place:
//! - `DbScale`: linear register-code ↔ centi-dB mapping (min + n × step)
//! - `OutOfRangeError`: returned when a requested code or level doesn't fit

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: i32,
    /// The inclusive minimum allowed value.
    pub min: i32,
    /// The inclusive maximum allowed value.
    pub max: i32,
}

impl core::fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "value {} outside of {}..={}",
            self.value, self.min, self.max
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OutOfRangeError {}

// ── DbScale ──────────────────────────────────────────────────────────────────

/// Linear decibel scale for a register field.
///
/// Code `n` corresponds to `min_centi_db + n * step_centi_db` hundredths of a
/// dB, for `n` in `0..=max_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DbScale {
    /// Level of code 0, in 0.01 dB.
    pub min_centi_db: i32,
    /// Increment per code, in 0.01 dB. Always positive.
    pub step_centi_db: i32,
    /// Largest valid register code.
    pub max_code: u8,
}

impl DbScale {
    /// Level of `code` in 0.01 dB.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `code > max_code`.
    pub fn to_centi_db(&self, code: u8) -> Result<i32, OutOfRangeError> {
        if code > self.max_code {
            return Err(OutOfRangeError {
                value: i32::from(code),
                min: 0,
                max: i32::from(self.max_code),
            });
        }
        // max_code ≤ 255 and |step| is a few hundred, so this stays far from i32::MAX.
        #[allow(clippy::arithmetic_side_effects)]
        Ok(self.min_centi_db + i32::from(code) * self.step_centi_db)
    }

    /// Highest level on the scale, in 0.01 dB.
    #[allow(clippy::arithmetic_side_effects)] // bounded, see to_centi_db
    pub fn max_centi_db(&self) -> i32 {
        self.min_centi_db + i32::from(self.max_code) * self.step_centi_db
    }

    /// Register code for the level nearest to `centi_db`, rounding down to
    /// the step below.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `centi_db` lies outside the scale.
    pub fn code_for(&self, centi_db: i32) -> Result<u8, OutOfRangeError> {
        let max = self.max_centi_db();
        if centi_db < self.min_centi_db || centi_db > max || self.step_centi_db <= 0 {
            return Err(OutOfRangeError {
                value: centi_db,
                min: self.min_centi_db,
                max,
            });
        }
        // In range and step > 0: quotient is within 0..=max_code.
        #[allow(clippy::arithmetic_side_effects)]
        let steps = (centi_db - self.min_centi_db) / self.step_centi_db;
        u8::try_from(steps).map_err(|_| OutOfRangeError {
            value: centi_db,
            min: self.min_centi_db,
            max,
        })
    }
}
