//! Property-based tests for stream setup validation.

#![allow(clippy::unwrap_used)]

use embassy_futures::block_on;
use platform::mocks::MockRegisterMap;
use tas5720::format::{apply_rate, double_rate_for, SUPPORTED_RATES};
use tas5720::registers::REG_DIGITAL_CTRL1;
use tas5720::{Error, StereoVolume};

proptest::proptest! {
    /// Only the four supported rates map to a speed setting.
    #[test]
    fn only_supported_rates_map(rate in 0u32..=u32::MAX) {
        assert_eq!(double_rate_for(rate).is_some(), SUPPORTED_RATES.contains(&rate));
    }

    /// Unsupported rates never reach the register map.
    #[test]
    fn unsupported_rate_issues_no_access(rate in 0u32..=u32::MAX) {
        proptest::prop_assume!(!SUPPORTED_RATES.contains(&rate));
        let mut regs = MockRegisterMap::new();
        assert_eq!(block_on(apply_rate(&mut regs, rate)), Err(Error::UnsupportedRate(rate)));
        assert!(regs.journal().is_empty());
    }

    /// Rate changes leave every other bit of DIGITAL_CTRL1 alone.
    #[test]
    fn rate_only_touches_double_rate_bit(initial in 0u8..=255u8, index in 0usize..4) {
        let rate = SUPPORTED_RATES.get(index).copied().unwrap();
        let mut regs = MockRegisterMap::new().with_register(REG_DIGITAL_CTRL1, initial);
        block_on(apply_rate(&mut regs, rate)).unwrap();
        assert_eq!(regs.get(REG_DIGITAL_CTRL1) & !0x08, initial & !0x08);
    }

    /// Any volume code pair round-trips through dB.
    #[test]
    fn volume_db_roundtrip(left in 0u8..=255u8, right in 0u8..=255u8) {
        let vol = StereoVolume { left, right };
        let (l, r) = vol.centi_db();
        assert_eq!(StereoVolume::from_centi_db(l, r).unwrap(), vol);
    }
}
