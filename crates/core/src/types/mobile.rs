//! Mobile phone number type.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// Mainland-China mobile numbers: 11 digits, leading 1, restricted second digit.
static MOBILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // pattern is a compile-time constant
    Regex::new(r"^1[345789]\d{9}$").unwrap()
});

/// Errors that can occur when parsing a [`Mobile`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum MobileError {
    /// The input string is empty.
    #[error("mobile number cannot be empty")]
    Empty,
    /// The input does not look like a valid mobile number.
    #[error("mobile number format is invalid")]
    InvalidFormat,
}

/// A validated mobile phone number.
///
/// ```
/// use pavilion_core::Mobile;
///
/// assert!(Mobile::parse("13800138000").is_ok());
/// assert!(Mobile::parse("12800138000").is_err()); // invalid second digit
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Mobile(String);

impl Mobile {
    /// Parse a `Mobile` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or does not match the
    /// mobile number pattern.
    pub fn parse(s: &str) -> Result<Self, MobileError> {
        if s.is_empty() {
            return Err(MobileError::Empty);
        }

        if !MOBILE_RE.is_match(s) {
            return Err(MobileError::InvalidFormat);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the mobile number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Mobile` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Mobile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Mobile {
    type Err = MobileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Mobile {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Mobile {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Mobile {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Mobile {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_mobiles() {
        assert!(Mobile::parse("13800138000").is_ok());
        assert!(Mobile::parse("15912345678").is_ok());
        assert!(Mobile::parse("17712345678").is_ok());
    }

    #[test]
    fn test_parse_invalid_second_digit() {
        assert!(matches!(
            Mobile::parse("12800138000"),
            Err(MobileError::InvalidFormat)
        ));
        assert!(Mobile::parse("16800138000").is_err());
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(Mobile::parse("1380013800").is_err()); // 10 digits
        assert!(Mobile::parse("138001380001").is_err()); // 12 digits
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Mobile::parse(""), Err(MobileError::Empty)));
    }

    #[test]
    fn test_parse_non_digits() {
        assert!(Mobile::parse("1380013800a").is_err());
    }
}
