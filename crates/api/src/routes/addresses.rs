//! Address route handlers.
//!
//! These routes require authentication.

use std::sync::LazyLock;

use axum::{
    Json,
    extract::State,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};

use pavilion_core::{AreaId, Mobile};

use crate::db::addresses::AddressRepository;
use crate::error::{ApiError, AppFailure};
use crate::middleware::auth::RequireAuth;
use crate::models::address::NewAddress;
use crate::state::AppState;

/// Cap on live (not soft-deleted) addresses per user.
const MAX_LIVE_ADDRESSES: i64 = 20;

// Landline with optional area code, e.g. 010-12345678.
static TEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // pattern is a compile-time constant
    Regex::new(r"^(0[0-9]{2,3}-)?([2-9][0-9]{6,7})$").unwrap()
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // pattern is a compile-time constant
    Regex::new(r"^[a-z0-9][\w.\-]*@[a-z0-9\-]+(\.[a-z]{2,5}){1,2}$").unwrap()
});

/// Address creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateAddressPayload {
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub province_id: Option<i32>,
    #[serde(default)]
    pub city_id: Option<i32>,
    #[serde(default)]
    pub district_id: Option<i32>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub tel: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Optional label; defaults to the receiver name.
    #[serde(default)]
    pub title: Option<String>,
}

/// Validate an address payload, first violation wins.
fn validate_address(payload: &CreateAddressPayload) -> Result<NewAddress, ApiError> {
    let receiver = payload
        .receiver
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::MissingParameter)?;
    let province_id = payload.province_id.ok_or(ApiError::MissingParameter)?;
    let city_id = payload.city_id.ok_or(ApiError::MissingParameter)?;
    let district_id = payload.district_id.ok_or(ApiError::MissingParameter)?;
    let place = payload
        .place
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::MissingParameter)?;
    let mobile = payload
        .mobile
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::MissingParameter)?;

    let mobile = Mobile::parse(mobile).map_err(|e| ApiError::InvalidField(e.to_string()))?;

    let tel = payload.tel.as_deref().filter(|s| !s.is_empty());
    if let Some(tel) = tel
        && !TEL_RE.is_match(tel)
    {
        return Err(ApiError::InvalidField("tel format is invalid".to_owned()));
    }

    let email = payload.email.as_deref().filter(|s| !s.is_empty());
    if let Some(email) = email
        && !EMAIL_RE.is_match(email)
    {
        return Err(ApiError::InvalidField("email format is invalid".to_owned()));
    }

    let title = payload
        .title
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(receiver);

    Ok(NewAddress {
        title: title.to_owned(),
        receiver: receiver.to_owned(),
        province_id: AreaId::new(province_id),
        city_id: AreaId::new(city_id),
        district_id: AreaId::new(district_id),
        place: place.to_owned(),
        mobile,
        tel: tel.map(ToOwned::to_owned),
        email: email.map(ToOwned::to_owned),
    })
}

/// Create a new address for the logged-in user.
///
/// Users are capped at 20 live addresses; soft-deleted rows do not count.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(payload): Json<CreateAddressPayload>,
) -> Result<Json<Value>, ApiError> {
    let repo = AddressRepository::new(state.pool());

    let count = repo.live_count(current.id).await?;
    if count >= MAX_LIVE_ADDRESSES {
        return Err(AppFailure::AddressLimitExceeded.into());
    }

    let new_address = validate_address(&payload)?;
    let detail = repo.create(current.id, &new_address).await?;

    let address = serde_json::to_value(&detail)
        .map_err(|e| ApiError::Internal(format!("failed to serialize address: {e}")))?;

    Ok(Json(json!({"code": 0, "errmsg": "ok", "address": address})))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn payload(overrides: Value) -> CreateAddressPayload {
        let mut base = json!({
            "receiver": "Wang Wei",
            "province_id": 110_000,
            "city_id": 110_100,
            "district_id": 110_101,
            "place": "1 Main Street, Building 4",
            "mobile": "13800138000",
        });
        for (key, value) in overrides.as_object().unwrap() {
            base[key] = value.clone();
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn test_valid_address() {
        let address = validate_address(&payload(json!({}))).unwrap();
        assert_eq!(address.receiver, "Wang Wei");
        // Title falls back to the receiver name.
        assert_eq!(address.title, "Wang Wei");
        assert!(address.tel.is_none());
    }

    #[test]
    fn test_explicit_title_kept() {
        let address = validate_address(&payload(json!({"title": "Home"}))).unwrap();
        assert_eq!(address.title, "Home");
    }

    #[test]
    fn test_missing_receiver() {
        assert!(matches!(
            validate_address(&payload(json!({"receiver": null}))),
            Err(ApiError::MissingParameter)
        ));
    }

    #[test]
    fn test_missing_area() {
        assert!(matches!(
            validate_address(&payload(json!({"city_id": null}))),
            Err(ApiError::MissingParameter)
        ));
    }

    #[test]
    fn test_bad_mobile() {
        assert!(matches!(
            validate_address(&payload(json!({"mobile": "12800138000"}))),
            Err(ApiError::InvalidField(_))
        ));
    }

    #[test]
    fn test_tel_validation() {
        assert!(validate_address(&payload(json!({"tel": "010-12345678"}))).is_ok());
        assert!(validate_address(&payload(json!({"tel": "23456789"}))).is_ok());
        assert!(matches!(
            validate_address(&payload(json!({"tel": "not-a-phone"}))),
            Err(ApiError::InvalidField(_))
        ));
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_address(&payload(json!({"email": "wang@example.com"}))).is_ok());
        assert!(matches!(
            validate_address(&payload(json!({"email": "not-an-email"}))),
            Err(ApiError::InvalidField(_))
        ));
    }

    #[test]
    fn test_empty_optional_fields_ignored() {
        let address = validate_address(&payload(json!({"tel": "", "email": ""}))).unwrap();
        assert!(address.tel.is_none());
        assert!(address.email.is_none());
    }
}
