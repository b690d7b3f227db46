//! Application services.

pub mod auth;
pub mod captcha;
pub mod sms;
pub mod verify_code;

pub use auth::{AuthError, AuthService};
pub use captcha::{CaptchaError, CaptchaGenerator};
pub use sms::{LogSmsSender, SmsSender};
pub use verify_code::{VerifyCodeError, VerifyCodeStore, generate_sms_code};
