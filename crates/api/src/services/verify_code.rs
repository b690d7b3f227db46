//! Short-lived verification-code store.
//!
//! Backs both kinds of verification entry - image codes keyed by a
//! client-supplied correlation id and SMS codes keyed by mobile number -
//! in an in-process cache with a fixed time-to-live. Writing a key
//! overwrites the previous value and resets its expiry.
//!
//! Image codes are single-use: lookup and invalidation are one atomic
//! `remove`, so two concurrent verifications sharing a correlation id cannot
//! both observe the value. SMS codes are read without removal and left to
//! expire, so a failed registration can be retried within the TTL.

use std::time::Duration;

use moka::future::Cache;
use rand::Rng;
use thiserror::Error;

/// How long issued codes stay valid.
const CODE_TTL: Duration = Duration::from_secs(300);

/// Minimum interval between SMS sends to one mobile number.
const SEND_COOLDOWN: Duration = Duration::from_secs(60);

/// Cache key distinguishing the two kinds of verification entry.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CodeKey {
    /// Image code, keyed by the client-supplied correlation id.
    Image(String),
    /// SMS code, keyed by the target mobile number.
    Sms(String),
}

/// Errors produced while issuing or checking verification codes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyCodeError {
    /// No live image code exists for the correlation id.
    #[error("image code expired or invalid")]
    ExpiredOrInvalid,
    /// The submitted answer does not match the stored image code.
    #[error("incorrect image code")]
    Mismatch,
    /// An SMS code was sent to this mobile too recently.
    #[error("sms code sent too frequently")]
    Throttled,
}

/// In-process store for image and SMS verification codes.
#[derive(Clone)]
pub struct VerifyCodeStore {
    codes: Cache<CodeKey, String>,
    send_flags: Cache<String, ()>,
}

impl VerifyCodeStore {
    /// Create a store with the standard 300-second code TTL and 60-second
    /// send cooldown.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttls(CODE_TTL, SEND_COOLDOWN)
    }

    /// Create a store with explicit TTLs.
    #[must_use]
    pub fn with_ttls(code_ttl: Duration, cooldown: Duration) -> Self {
        Self {
            codes: Cache::builder().time_to_live(code_ttl).build(),
            send_flags: Cache::builder().time_to_live(cooldown).build(),
        }
    }

    /// Store an image code under a correlation id, replacing any previous
    /// entry and resetting its expiry.
    pub async fn store_image_code(&self, correlation_id: &str, text: &str) {
        self.codes
            .insert(CodeKey::Image(correlation_id.to_owned()), text.to_owned())
            .await;
    }

    /// Check a submitted image-code answer, consuming the stored entry.
    ///
    /// The entry is removed whether or not the answer matches, so every
    /// correlation id gets exactly one verification attempt. Comparison is
    /// case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyCodeError::ExpiredOrInvalid`] if no live entry exists
    /// and [`VerifyCodeError::Mismatch`] if the answer is wrong.
    pub async fn verify_image_code(
        &self,
        correlation_id: &str,
        answer: &str,
    ) -> Result<(), VerifyCodeError> {
        let stored = self
            .codes
            .remove(&CodeKey::Image(correlation_id.to_owned()))
            .await
            .ok_or(VerifyCodeError::ExpiredOrInvalid)?;

        if !stored.eq_ignore_ascii_case(answer) {
            return Err(VerifyCodeError::Mismatch);
        }

        Ok(())
    }

    /// Check whether SMS issuance for a mobile is currently throttled.
    ///
    /// Called before the image code is verified so a throttled request does
    /// not burn its single-use image code.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyCodeError::Throttled`] if the cooldown flag is live.
    pub fn check_send_cooldown(&self, mobile: &str) -> Result<(), VerifyCodeError> {
        if self.send_flags.contains_key(mobile) {
            return Err(VerifyCodeError::Throttled);
        }
        Ok(())
    }

    /// Store an SMS code under a mobile number and start its cooldown.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyCodeError::Throttled`] if the cooldown flag is live.
    pub async fn issue_sms_code(&self, mobile: &str, code: &str) -> Result<(), VerifyCodeError> {
        self.check_send_cooldown(mobile)?;

        self.codes
            .insert(CodeKey::Sms(mobile.to_owned()), code.to_owned())
            .await;
        self.send_flags.insert(mobile.to_owned(), ()).await;

        Ok(())
    }

    /// Read the live SMS code for a mobile without consuming it.
    pub async fn sms_code(&self, mobile: &str) -> Option<String> {
        self.codes.get(&CodeKey::Sms(mobile.to_owned())).await
    }
}

impl Default for VerifyCodeStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a 6-digit, zero-padded SMS code, uniform over 0-999999.
#[must_use]
pub fn generate_sms_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:06}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_image_code_verifies_exactly_once() {
        let store = VerifyCodeStore::new();
        store.store_image_code("req-1", "AbCd").await;

        assert_eq!(store.verify_image_code("req-1", "abcd").await, Ok(()));
        // Entry was consumed by the first attempt.
        assert_eq!(
            store.verify_image_code("req-1", "abcd").await,
            Err(VerifyCodeError::ExpiredOrInvalid)
        );
    }

    #[tokio::test]
    async fn test_image_code_mismatch_consumes_entry() {
        let store = VerifyCodeStore::new();
        store.store_image_code("req-2", "WXYZ").await;

        assert_eq!(
            store.verify_image_code("req-2", "nope").await,
            Err(VerifyCodeError::Mismatch)
        );
        assert_eq!(
            store.verify_image_code("req-2", "wxyz").await,
            Err(VerifyCodeError::ExpiredOrInvalid)
        );
    }

    #[tokio::test]
    async fn test_unknown_correlation_id() {
        let store = VerifyCodeStore::new();
        assert_eq!(
            store.verify_image_code("never-issued", "abcd").await,
            Err(VerifyCodeError::ExpiredOrInvalid)
        );
    }

    #[tokio::test]
    async fn test_rewrite_resets_value() {
        let store = VerifyCodeStore::new();
        store.store_image_code("req-3", "AAAA").await;
        store.store_image_code("req-3", "BBBB").await;

        assert_eq!(
            store.verify_image_code("req-3", "aaaa").await,
            Err(VerifyCodeError::Mismatch)
        );
    }

    #[tokio::test]
    async fn test_codes_expire() {
        let store =
            VerifyCodeStore::with_ttls(Duration::from_millis(50), Duration::from_millis(50));
        store.store_image_code("req-4", "AAAA").await;
        store
            .issue_sms_code("13800138000", "123456")
            .await
            .expect("first send");

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(
            store.verify_image_code("req-4", "aaaa").await,
            Err(VerifyCodeError::ExpiredOrInvalid)
        );
        assert_eq!(store.sms_code("13800138000").await, None);
        // Cooldown has lapsed as well, so a new send is allowed.
        assert!(store.issue_sms_code("13800138000", "654321").await.is_ok());
    }

    #[tokio::test]
    async fn test_sms_send_cooldown() {
        let store = VerifyCodeStore::new();
        store
            .issue_sms_code("13800138000", "111111")
            .await
            .expect("first send");

        assert_eq!(
            store.issue_sms_code("13800138000", "222222").await,
            Err(VerifyCodeError::Throttled)
        );
        // The original code is still the live one.
        assert_eq!(
            store.sms_code("13800138000").await.as_deref(),
            Some("111111")
        );
        // A different mobile is unaffected.
        assert!(store.issue_sms_code("15912345678", "333333").await.is_ok());
    }

    #[tokio::test]
    async fn test_sms_code_peek_does_not_consume() {
        let store = VerifyCodeStore::new();
        store
            .issue_sms_code("13800138000", "424242")
            .await
            .expect("send");

        assert_eq!(
            store.sms_code("13800138000").await.as_deref(),
            Some("424242")
        );
        assert_eq!(
            store.sms_code("13800138000").await.as_deref(),
            Some("424242")
        );
    }

    #[tokio::test]
    async fn test_concurrent_verifications_single_winner() {
        let store = VerifyCodeStore::new();
        store.store_image_code("shared", "ZZZZ").await;

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.verify_image_code("shared", "zzzz").await
            }));
        }

        let mut successes = 0;
        for task in tasks {
            if task.await.expect("join").is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
    }

    #[test]
    fn test_generate_sms_code_format() {
        for _ in 0..100 {
            let code = generate_sms_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }
}
