//! Raw password type for request payloads.

use std::sync::LazyLock;

use regex::Regex;

static PASSWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // pattern is a compile-time constant
    Regex::new(r"^[0-9A-Za-z]{8,20}$").unwrap()
});

/// Errors that can occur when parsing a [`RawPassword`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PasswordError {
    /// The input string is empty.
    #[error("password cannot be empty")]
    Empty,
    /// The input does not match the allowed pattern.
    #[error("password must be 8-20 letters or digits")]
    InvalidFormat,
}

/// A plaintext password as submitted by a client, validated for format.
///
/// Only ever held transiently between request parsing and hashing. Does not
/// implement `Serialize`, and its `Debug` output is redacted.
#[derive(Clone)]
pub struct RawPassword(String);

impl RawPassword {
    /// Parse a `RawPassword` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or does not match the
    /// 8-20 character alphanumeric pattern.
    pub fn parse(s: &str) -> Result<Self, PasswordError> {
        if s.is_empty() {
            return Err(PasswordError::Empty);
        }

        if !PASSWORD_RE.is_match(s) {
            return Err(PasswordError::InvalidFormat);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the plaintext password for hashing or verification.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RawPassword([REDACTED])")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_passwords() {
        assert!(RawPassword::parse("abc12345").is_ok()); // 8 chars
        assert!(RawPassword::parse("A2345678901234567890").is_ok()); // 20 chars
    }

    #[test]
    fn test_parse_too_short() {
        assert!(matches!(
            RawPassword::parse("abc1234"),
            Err(PasswordError::InvalidFormat)
        ));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a1".repeat(11);
        assert!(RawPassword::parse(&long).is_err());
    }

    #[test]
    fn test_parse_rejects_symbols() {
        assert!(RawPassword::parse("abc123!@#").is_err());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(RawPassword::parse(""), Err(PasswordError::Empty)));
    }

    #[test]
    fn test_debug_is_redacted() {
        let pw = RawPassword::parse("abc12345").unwrap();
        let out = format!("{pw:?}");
        assert!(!out.contains("abc12345"));
        assert!(out.contains("REDACTED"));
    }
}
