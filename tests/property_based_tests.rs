//! Property-based tests
//!
//! Invariants of address parsing, amount formatting and return value decoding
//! over random inputs.

use proptest::prelude::*;
use sui_vault::blockchain::sui::ReturnValueDecoder;
use sui_vault::core::domain::{format_sui, SuiAddress, MIST_PER_SUI};

proptest! {
    #[test]
    fn address_display_parses_back(bytes in prop::array::uniform32(any::<u8>())) {
        let addr = SuiAddress::new(bytes);
        let shown = addr.to_string();
        prop_assert_eq!(shown.len(), 66);
        prop_assert_eq!(shown.parse::<SuiAddress>().unwrap(), addr);
    }

    #[test]
    fn short_hex_is_left_padded(hex in "[0-9a-f]{1,64}") {
        let with_prefix: SuiAddress = format!("0x{}", hex).parse().unwrap();
        let without_prefix: SuiAddress = hex.parse().unwrap();
        prop_assert_eq!(with_prefix, without_prefix);
        prop_assert!(with_prefix.to_string().ends_with(&hex));
    }

    #[test]
    fn too_long_hex_is_rejected(hex in "[0-9a-f]{65,80}") {
        prop_assert!(hex.parse::<SuiAddress>().is_err());
    }

    #[test]
    fn format_sui_keeps_nine_decimals(mist in any::<u64>()) {
        let shown = format_sui(mist);
        let (whole, frac) = shown.split_once('.').unwrap();
        prop_assert_eq!(frac.len(), 9);
        prop_assert_eq!(whole.parse::<u64>().unwrap(), mist / MIST_PER_SUI);
        prop_assert_eq!(frac.parse::<u64>().unwrap(), mist % MIST_PER_SUI);
    }

    #[test]
    fn u64_return_values_decode_exactly(value in any::<u64>()) {
        let decoder = ReturnValueDecoder::default();
        prop_assert_eq!(decoder.decode_u64(&value.to_le_bytes(), "u64").unwrap(), value);
    }

    #[test]
    fn truncated_u64_never_decodes(len in 0usize..8) {
        let decoder = ReturnValueDecoder::default();
        prop_assert!(decoder.decode_u64(&vec![0xff; len], "u64").is_err());
    }
}
