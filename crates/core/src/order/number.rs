//! Order number validation (Luhn mod-10).

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Returned when a candidate order number fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("order number {0:?} is not a valid Luhn sequence")]
pub struct InvalidOrderNumber(pub String);

/// A whitespace-free digit string that passed the Luhn check.
///
/// [`OrderNumber::parse`] is the only constructor, so holding one proves the
/// number was validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Strips whitespace and validates the remaining digits.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOrderNumber` carrying the raw input when fewer than two
    /// digits remain, a non-digit is present, or the checksum fails.
    pub fn parse(raw: &str) -> Result<Self, InvalidOrderNumber> {
        let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if luhn_valid(&digits) {
            Ok(Self(digits))
        } else {
            Err(InvalidOrderNumber(raw.to_string()))
        }
    }

    /// Returns the normalized digit string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the number and returns the digit string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns `true` if `raw` is an acceptable order number.
///
/// # Example
///
/// ```
/// use loyalty_core::order::is_valid_order_number;
///
/// assert!(is_valid_order_number("12345678903"));
/// assert!(is_valid_order_number(" 9278923470 "));
/// assert!(!is_valid_order_number("1234567890"));
/// ```
#[must_use]
pub fn is_valid_order_number(raw: &str) -> bool {
    OrderNumber::parse(raw).is_ok()
}

/// Luhn check over an already whitespace-stripped string.
fn luhn_valid(digits: &str) -> bool {
    if digits.len() < 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}
