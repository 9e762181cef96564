//! Property-based tests for order number validation.

use proptest::prelude::*;

use super::number::{OrderNumber, is_valid_order_number};

/// Strategy for digit strings of realistic order-number length.
fn digit_string() -> impl Strategy<Value = String> {
    proptest::collection::vec(0u8..10, 2..24)
        .prop_map(|digits| digits.into_iter().map(|d| char::from(b'0' + d)).collect())
}

/// Strategy for whitespace padding.
fn padding() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop_oneof![Just(' '), Just('\t'), Just('\n')], 0..4)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Computes the digit that makes `payload` Luhn-valid when appended.
fn check_digit(payload: &str) -> char {
    (b'0'..=b'9')
        .map(char::from)
        .find(|d| is_valid_order_number(&format!("{payload}{d}")))
        .expect("exactly one check digit exists")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Validity never depends on surrounding whitespace.
    #[test]
    fn prop_whitespace_padding_is_irrelevant(
        digits in digit_string(),
        left in padding(),
        right in padding(),
    ) {
        prop_assert_eq!(
            is_valid_order_number(&digits),
            is_valid_order_number(&format!("{left}{digits}{right}"))
        );
    }

    /// Every payload has exactly one completing check digit.
    #[test]
    fn prop_exactly_one_check_digit(payload in digit_string()) {
        let valid = (b'0'..=b'9')
            .map(char::from)
            .filter(|d| is_valid_order_number(&format!("{payload}{d}")))
            .count();
        prop_assert_eq!(valid, 1);
    }

    /// Changing any single digit of a valid number breaks the checksum.
    #[test]
    fn prop_single_digit_error_detected(
        payload in digit_string(),
        position in any::<prop::sample::Index>(),
        delta in 1u8..10,
    ) {
        let valid = format!("{payload}{}", check_digit(&payload));
        let mut bytes = valid.into_bytes();
        let i = position.index(bytes.len());
        bytes[i] = b'0' + (bytes[i] - b'0' + delta) % 10;
        let mutated = String::from_utf8(bytes).unwrap();

        prop_assert!(!is_valid_order_number(&mutated));
    }

    /// A parsed number is always the whitespace-free digit string.
    #[test]
    fn prop_parse_normalizes(payload in digit_string(), left in padding()) {
        let valid = format!("{payload}{}", check_digit(&payload));
        let parsed = OrderNumber::parse(&format!("{left}{valid}")).unwrap();
        prop_assert_eq!(parsed.as_str(), valid.as_str());
    }

    /// Any non-digit character makes the number invalid.
    #[test]
    fn prop_non_digit_rejected(
        payload in digit_string(),
        junk in "[a-zA-Z\\-_.]",
        position in any::<prop::sample::Index>(),
    ) {
        let mut s = payload;
        let i = position.index(s.len() + 1);
        s.insert_str(i, &junk);
        prop_assert!(!is_valid_order_number(&s));
    }
}
