//! SMS delivery.
//!
//! Actual delivery is out of scope for this service; the default sender just
//! logs the code. A gateway-backed implementation can be swapped in through
//! the trait without touching the handlers.

/// Delivers SMS verification codes.
pub trait SmsSender: Send + Sync {
    /// Hand a freshly issued code off for delivery to a mobile number.
    fn send_code(&self, mobile: &str, code: &str);
}

/// Sender that logs codes instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSmsSender;

impl SmsSender for LogSmsSender {
    fn send_code(&self, mobile: &str, code: &str) {
        tracing::info!(mobile, code, "sms code issued (delivery stubbed)");
    }
}
