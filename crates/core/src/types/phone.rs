//! Phone number normalization, display formatting, and validation.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a [`PhoneNumber`].
///
/// Variants are ordered the way validation checks them; the first failing
/// rule is reported.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneError {
    /// No digits were entered.
    #[error("enter phone number")]
    Empty,
    /// The number does not have exactly [`PhoneNumber::DIGITS`] digits.
    #[error("must contain 11 digits")]
    WrongLength {
        /// Number of digits actually entered.
        digits: usize,
    },
    /// The number does not start with the country code `7`.
    #[error("must start with 7")]
    WrongPrefix,
}

/// Keep only ASCII digits from `input`, retaining at most
/// [`PhoneNumber::DIGITS`] of them.
#[must_use]
pub fn normalize_digits(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(PhoneNumber::DIGITS)
        .collect()
}

/// Format raw input as `+7 (AAA) BBB-CC-DD`, growing with the digits entered.
///
/// Non-digits are stripped first, so the function is idempotent on its own
/// output. Separators for groups that have not started yet are left out:
///
/// ```
/// use oshop_core::format_phone;
///
/// assert_eq!(format_phone(""), "");
/// assert_eq!(format_phone("7"), "+7");
/// assert_eq!(format_phone("7912"), "+7 (912");
/// assert_eq!(format_phone("79123"), "+7 (912) 3");
/// assert_eq!(format_phone("79123456789"), "+7 (912) 345-67-89");
/// assert_eq!(format_phone("+7 (912) 345-67-89"), "+7 (912) 345-67-89");
/// ```
#[must_use]
pub fn format_phone(input: &str) -> String {
    let digits = normalize_digits(input);
    let mut out = String::with_capacity(18);

    for (i, ch) in digits.chars().enumerate() {
        match i {
            0 => out.push('+'),
            1 => out.push_str(" ("),
            4 => out.push_str(") "),
            7 | 9 => out.push('-'),
            _ => {}
        }
        out.push(ch);
    }

    out
}

/// Validate raw input, returning the first failing rule.
///
/// # Errors
///
/// See [`PhoneNumber::parse`].
pub fn validate_phone(input: &str) -> Result<(), PhoneError> {
    PhoneNumber::parse(input).map(|_| ())
}

/// A validated phone number: exactly 11 digits, starting with `7`.
///
/// Serializes as the bare digit string, which is what the order endpoint
/// expects.
///
/// ## Examples
///
/// ```
/// use oshop_core::{PhoneError, PhoneNumber};
///
/// assert!(PhoneNumber::parse("79123456789").is_ok());
/// assert!(PhoneNumber::parse("+7 (912) 345-67-89").is_ok());
///
/// assert_eq!(PhoneNumber::parse(""), Err(PhoneError::Empty));
/// assert_eq!(
///     PhoneNumber::parse("7912345678"),
///     Err(PhoneError::WrongLength { digits: 10 })
/// );
/// assert_eq!(PhoneNumber::parse("89123456789"), Err(PhoneError::WrongPrefix));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Number of digits in a complete phone number.
    pub const DIGITS: usize = 11;

    /// Required leading digit (country code).
    pub const COUNTRY_CODE: char = '7';

    /// Parse a `PhoneNumber` from raw input, ignoring formatting characters.
    ///
    /// Digits past the eleventh are discarded before validation, the same way
    /// the input field caps them.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Contains no digits
    /// - Does not contain exactly 11 digits
    /// - Does not start with 7
    pub fn parse(input: &str) -> Result<Self, PhoneError> {
        let digits = normalize_digits(input);

        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }

        if digits.len() != Self::DIGITS {
            return Err(PhoneError::WrongLength {
                digits: digits.len(),
            });
        }

        if !digits.starts_with(Self::COUNTRY_CODE) {
            return Err(PhoneError::WrongPrefix);
        }

        Ok(Self(digits))
    }

    /// Returns the bare digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number in display format.
    #[must_use]
    pub fn formatted(&self) -> String {
        format_phone(&self.0)
    }

    /// Consumes the `PhoneNumber` and returns its digits.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
