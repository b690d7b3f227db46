//! Account route handlers.
//!
//! Handles existence checks, registration, login, logout, and the
//! session-backed account projection.
//!
//! Registration and login also set a non-authoritative `username` cookie so
//! the storefront can greet the user without an extra round trip; the cookie
//! carries no security weight.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tower_sessions::cookie::{Cookie, time::Duration as CookieDuration};

use pavilion_core::{Mobile, RawPassword, Username};

use crate::db::users::UserRepository;
use crate::error::ApiError;
use crate::middleware::auth::{RequireAuth, clear_current_user, set_current_user};
use crate::models::session::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Name of the display cookie.
const USERNAME_COOKIE: &str = "username";

/// Display cookie lifetime.
const USERNAME_COOKIE_DAYS: i64 = 7;

// =============================================================================
// Payload Types
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password2: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    /// Consent flag; must be exactly the JSON string "true".
    #[serde(default)]
    pub allow: Option<Value>,
    #[serde(default)]
    pub sms_code: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Only the JSON boolean `true` makes the session long-lived.
    #[serde(default)]
    pub remembered: Option<Value>,
}

/// A registration payload that passed every check.
struct ValidRegistration {
    username: Username,
    password: RawPassword,
    mobile: Mobile,
    sms_code: String,
}

/// A login payload that passed every check.
struct ValidLogin {
    username: Username,
    password: RawPassword,
    remembered: bool,
}

// =============================================================================
// Validation
// =============================================================================

/// Treat absent and empty-string fields the same.
fn require(field: Option<&str>) -> Result<&str, ApiError> {
    field
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::MissingParameter)
}

/// Validate a registration payload, first violation wins.
fn validate_register(payload: &RegisterPayload) -> Result<ValidRegistration, ApiError> {
    // Presence of every required field comes before any format check.
    let username = require(payload.username.as_deref())?;
    let password = require(payload.password.as_deref())?;
    let password2 = require(payload.password2.as_deref())?;
    let mobile = require(payload.mobile.as_deref())?;
    let sms_code = require(payload.sms_code.as_deref())?;

    let username =
        Username::parse(username).map_err(|e| ApiError::InvalidField(e.to_string()))?;
    let password =
        RawPassword::parse(password).map_err(|e| ApiError::InvalidField(e.to_string()))?;

    if password.expose() != password2 {
        return Err(ApiError::PasswordMismatch);
    }

    let mobile = Mobile::parse(mobile).map_err(|e| ApiError::InvalidField(e.to_string()))?;

    // The consent flag must be the literal string "true"; a JSON boolean
    // does not count.
    match payload.allow.as_ref().and_then(Value::as_str) {
        Some("true") => {}
        _ => return Err(ApiError::ConsentRequired),
    }

    Ok(ValidRegistration {
        username,
        password,
        mobile,
        sms_code: sms_code.to_owned(),
    })
}

/// Validate a login payload.
fn validate_login(payload: &LoginPayload) -> Result<ValidLogin, ApiError> {
    let username = require(payload.username.as_deref())?;
    let password = require(payload.password.as_deref())?;

    let username =
        Username::parse(username).map_err(|e| ApiError::InvalidField(e.to_string()))?;
    let password =
        RawPassword::parse(password).map_err(|e| ApiError::InvalidField(e.to_string()))?;

    Ok(ValidLogin {
        username,
        password,
        remembered: payload.remembered == Some(Value::Bool(true)),
    })
}

// =============================================================================
// Display Cookie
// =============================================================================

/// Build the `Set-Cookie` header carrying the display username.
fn display_cookie(username: &str) -> Result<HeaderValue, ApiError> {
    let cookie = Cookie::build((USERNAME_COOKIE, username))
        .path("/")
        .max_age(CookieDuration::days(USERNAME_COOKIE_DAYS))
        .build();

    HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| ApiError::Internal(format!("invalid cookie header: {e}")))
}

/// Build the `Set-Cookie` header that expires the display username.
fn expired_display_cookie() -> Result<HeaderValue, ApiError> {
    let cookie = Cookie::build((USERNAME_COOKIE, ""))
        .path("/")
        .max_age(CookieDuration::ZERO)
        .build();

    HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| ApiError::Internal(format!("invalid cookie header: {e}")))
}

/// `{code: 0, errmsg: "ok"}` with a `Set-Cookie` header attached.
fn ok_with_cookie(cookie: HeaderValue) -> Response {
    let mut response = Json(json!({"code": 0, "errmsg": "ok"})).into_response();
    response.headers_mut().append(header::SET_COOKIE, cookie);
    response
}

// =============================================================================
// Handlers
// =============================================================================

/// Check whether a username is taken.
pub async fn username_count(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    // The path segment is constrained like a route pattern: anything that
    // could never name an account is not a known resource.
    let username =
        Username::parse(&username).map_err(|_| ApiError::NotFound("username".to_owned()))?;

    let count = UserRepository::new(state.pool())
        .count_by_username(&username)
        .await?;

    Ok(Json(json!({"code": 0, "errmsg": "OK", "count": count})))
}

/// Check whether a mobile number is taken.
pub async fn mobile_count(
    State(state): State<AppState>,
    Path(mobile): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mobile = Mobile::parse(&mobile).map_err(|_| ApiError::NotFound("mobile".to_owned()))?;

    let count = UserRepository::new(state.pool())
        .count_by_mobile(&mobile)
        .await?;

    Ok(Json(json!({"code": 0, "errmsg": "OK", "count": count})))
}

/// Create an account and establish a session.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<RegisterPayload>,
) -> Result<Response, ApiError> {
    let valid = validate_register(&payload)?;

    // The SMS code must still be live for this mobile. It is read without
    // being consumed so a failed attempt can be retried within the TTL.
    let issued = state
        .verify_codes()
        .sms_code(valid.mobile.as_str())
        .await
        .ok_or(ApiError::SmsCodeMissing)?;

    if issued != valid.sms_code {
        return Err(ApiError::SmsCodeMismatch);
    }

    let user = AuthService::new(state.pool())
        .register(&valid.username, &valid.password, &valid.mobile)
        .await?;

    let current = CurrentUser {
        id: user.id,
        username: user.username.to_string(),
    };
    set_current_user(&session, &current, true).await?;

    Ok(ok_with_cookie(display_cookie(user.username.as_str())?))
}

/// Authenticate and establish a session.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginPayload>,
) -> Result<Response, ApiError> {
    let valid = validate_login(&payload)?;

    let user = AuthService::new(state.pool())
        .login(&valid.username, &valid.password)
        .await?;

    let current = CurrentUser {
        id: user.id,
        username: user.username.to_string(),
    };
    set_current_user(&session, &current, valid.remembered).await?;

    Ok(ok_with_cookie(display_cookie(user.username.as_str())?))
}

/// Clear the session and the display cookie.
pub async fn logout(session: Session) -> Result<Response, ApiError> {
    clear_current_user(&session).await?;

    Ok(ok_with_cookie(expired_display_cookie()?))
}

/// Return the account projection for the logged-in user.
pub async fn info(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Value>, ApiError> {
    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        // A session referencing a vanished account is treated as stale.
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(json!({
        "code": 0,
        "errmsg": "ok",
        "info_data": {
            "username": user.username,
            "mobile": user.mobile,
            "email": user.email,
            "email_active": user.email_active,
        },
    })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn register_payload(overrides: Value) -> RegisterPayload {
        let mut base = json!({
            "username": "newuser1",
            "password": "abc12345",
            "password2": "abc12345",
            "mobile": "13800138000",
            "allow": "true",
            "sms_code": "123456",
        });
        for (key, value) in overrides.as_object().unwrap() {
            base[key] = value.clone();
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn test_register_valid_payload() {
        let valid = validate_register(&register_payload(json!({}))).unwrap();
        assert_eq!(valid.username.as_str(), "newuser1");
        assert_eq!(valid.mobile.as_str(), "13800138000");
        assert_eq!(valid.sms_code, "123456");
    }

    #[test]
    fn test_register_missing_field() {
        let payload = register_payload(json!({"sms_code": null}));
        assert!(matches!(
            validate_register(&payload),
            Err(ApiError::MissingParameter)
        ));
    }

    #[test]
    fn test_register_empty_field_counts_as_missing() {
        let payload = register_payload(json!({"password": ""}));
        assert!(matches!(
            validate_register(&payload),
            Err(ApiError::MissingParameter)
        ));
    }

    #[test]
    fn test_register_short_username() {
        let payload = register_payload(json!({"username": "ab12"}));
        assert!(matches!(
            validate_register(&payload),
            Err(ApiError::InvalidField(_))
        ));
    }

    #[test]
    fn test_register_short_password() {
        let payload = register_payload(json!({"password": "abc1234", "password2": "abc1234"}));
        assert!(matches!(
            validate_register(&payload),
            Err(ApiError::InvalidField(_))
        ));
    }

    #[test]
    fn test_register_password_mismatch() {
        let payload = register_payload(json!({"password2": "abc12346"}));
        assert!(matches!(
            validate_register(&payload),
            Err(ApiError::PasswordMismatch)
        ));
    }

    #[test]
    fn test_register_bad_mobile() {
        let payload = register_payload(json!({"mobile": "12800138000"}));
        assert!(matches!(
            validate_register(&payload),
            Err(ApiError::InvalidField(_))
        ));
    }

    #[test]
    fn test_register_consent_must_be_string_true() {
        // A JSON boolean does not satisfy the consent check.
        let payload = register_payload(json!({"allow": true}));
        assert!(matches!(
            validate_register(&payload),
            Err(ApiError::ConsentRequired)
        ));

        let payload = register_payload(json!({"allow": "false"}));
        assert!(matches!(
            validate_register(&payload),
            Err(ApiError::ConsentRequired)
        ));

        let payload = register_payload(json!({"allow": null}));
        assert!(matches!(
            validate_register(&payload),
            Err(ApiError::ConsentRequired)
        ));
    }

    #[test]
    fn test_register_presence_checked_before_format() {
        // Invalid username but missing password: presence wins.
        let payload = register_payload(json!({"username": "ab", "password": null}));
        assert!(matches!(
            validate_register(&payload),
            Err(ApiError::MissingParameter)
        ));
    }

    #[test]
    fn test_login_valid_payload() {
        let payload: LoginPayload = serde_json::from_value(json!({
            "username": "newuser1",
            "password": "abc12345",
            "remembered": true,
        }))
        .unwrap();

        let valid = validate_login(&payload).unwrap();
        assert!(valid.remembered);
    }

    #[test]
    fn test_login_remembered_defaults_to_session_only() {
        let payload: LoginPayload = serde_json::from_value(json!({
            "username": "newuser1",
            "password": "abc12345",
        }))
        .unwrap();
        assert!(!validate_login(&payload).unwrap().remembered);

        // The string "true" is not the boolean true.
        let payload: LoginPayload = serde_json::from_value(json!({
            "username": "newuser1",
            "password": "abc12345",
            "remembered": "true",
        }))
        .unwrap();
        assert!(!validate_login(&payload).unwrap().remembered);
    }

    #[test]
    fn test_login_missing_password() {
        let payload: LoginPayload =
            serde_json::from_value(json!({"username": "newuser1"})).unwrap();
        assert!(matches!(
            validate_login(&payload),
            Err(ApiError::MissingParameter)
        ));
    }

    #[test]
    fn test_display_cookie_shape() {
        let header = display_cookie("newuser1").unwrap();
        let value = header.to_str().unwrap();
        assert!(value.starts_with("username=newuser1"));
        assert!(value.contains("Max-Age=604800"));
        assert!(value.contains("Path=/"));
    }

    #[test]
    fn test_expired_display_cookie_shape() {
        let header = expired_display_cookie().unwrap();
        let value = header.to_str().unwrap();
        assert!(value.starts_with("username="));
        assert!(value.contains("Max-Age=0"));
    }
}
