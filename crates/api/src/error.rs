//! Unified error handling with Sentry integration.
//!
//! Responses follow a two-tier convention:
//!
//! - malformed-request errors are plain HTTP statuses: 403 for missing or
//!   invalid fields, 400 for expired/incorrect codes and failed
//!   authentication, 401 for missing sessions, 404 for unknown resources;
//! - application errors ride an HTTP 200 carrying a JSON envelope
//!   `{"code": 400, "errmsg": "..."}`.
//!
//! Server-side failures map to 500 with a generic body and are captured to
//! Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::captcha::CaptchaError;
use crate::services::verify_code::VerifyCodeError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required request field is absent or empty.
    #[error("missing required parameter")]
    MissingParameter,

    /// A request field fails its format check.
    #[error("{0}")]
    InvalidField(String),

    /// The two submitted passwords differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// The user-agreement flag is not the literal string "true".
    #[error("user agreement not accepted")]
    ConsentRequired,

    /// No live SMS code exists for the mobile being registered.
    #[error("sms code expired")]
    SmsCodeMissing,

    /// The submitted SMS code does not match the issued one.
    #[error("incorrect sms code")]
    SmsCodeMismatch,

    /// Username/password check failed.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// No authenticated session.
    #[error("authentication required")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Account creation hit a database integrity failure.
    #[error("registration failed")]
    IntegrityViolation,

    /// Application-tier failure, reported inside an HTTP 200 envelope.
    #[error("{0}")]
    Application(#[from] AppFailure),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(RepositoryError),

    /// Session store operation failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Image-code rendering failed.
    #[error("captcha error: {0}")]
    Captcha(#[from] CaptchaError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failures reported to the client as `{"code": 400, "errmsg": ...}` inside
/// an HTTP 200 response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppFailure {
    /// A query parameter required for SMS issuance is absent.
    #[error("missing required parameter")]
    MissingParameter,

    /// No live image code exists for the correlation id.
    #[error("image code expired or invalid")]
    ImageCodeExpired,

    /// The submitted image-code answer is wrong.
    #[error("incorrect image code")]
    ImageCodeMismatch,

    /// An SMS code was sent to this mobile too recently.
    #[error("sms code sent too frequently")]
    SmsThrottled,

    /// The user already has the maximum number of live addresses.
    #[error("address limit exceeded")]
    AddressLimitExceeded,
}

impl From<VerifyCodeError> for ApiError {
    fn from(err: VerifyCodeError) -> Self {
        match err {
            VerifyCodeError::ExpiredOrInvalid => Self::Application(AppFailure::ImageCodeExpired),
            VerifyCodeError::Mismatch => Self::Application(AppFailure::ImageCodeMismatch),
            VerifyCodeError::Throttled => Self::Application(AppFailure::SmsThrottled),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            // Duplicate username/mobile collapses to the generic 400; the
            // client can use the count endpoints to tell which field clashed.
            AuthError::AlreadyExists => Self::IntegrityViolation,
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_owned()),
            AuthError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::IntegrityViolation,
            other => Self::Database(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Session(_) | Self::Captcha(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Application-tier failures keep HTTP 200 and report through the
        // envelope's code field.
        if let Self::Application(failure) = &self {
            let body = Json(json!({
                "code": 400,
                "errmsg": failure.to_string(),
            }));
            return (StatusCode::OK, body).into_response();
        }

        let status = match &self {
            Self::MissingParameter
            | Self::InvalidField(_)
            | Self::PasswordMismatch
            | Self::ConsentRequired => StatusCode::FORBIDDEN,
            Self::SmsCodeMissing
            | Self::SmsCodeMismatch
            | Self::InvalidCredentials
            | Self::IntegrityViolation => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Application(_) => StatusCode::OK,
            Self::Database(_) | Self::Session(_) | Self::Captcha(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Session(_) | Self::Captcha(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
