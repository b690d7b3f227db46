//! Verification-code route handlers.
//!
//! Image codes are issued under a client-chosen correlation id and consumed
//! on their first verification attempt; SMS codes are issued per mobile
//! number once the image code checks out.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

use pavilion_core::Mobile;

use crate::error::{ApiError, AppFailure};
use crate::services::verify_code::generate_sms_code;
use crate::state::AppState;

/// Query parameters for SMS-code issuance.
#[derive(Debug, Deserialize)]
pub struct SmsCodeParams {
    /// The client's typed answer to the image code.
    #[serde(default)]
    pub image_code: Option<String>,
    /// The correlation id the image code was issued under.
    #[serde(default)]
    pub image_code_id: Option<String>,
}

/// Render a fresh image code and store its text under the correlation id.
///
/// Re-requesting with the same id simply overwrites the previous entry and
/// resets its expiry.
pub async fn image_code(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Response, ApiError> {
    let (text, png) = state.captcha().generate()?;

    state.verify_codes().store_image_code(&uuid, &text).await;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Issue an SMS code for a mobile number.
///
/// Requires a correct image-code answer. The image entry is consumed by the
/// check whatever its outcome, so each correlation id gets one attempt.
pub async fn sms_code(
    State(state): State<AppState>,
    Path(mobile): Path<String>,
    Query(params): Query<SmsCodeParams>,
) -> Result<Json<Value>, ApiError> {
    let mobile = Mobile::parse(&mobile).map_err(|_| ApiError::NotFound("mobile".to_owned()))?;

    let answer = params.image_code.as_deref().filter(|s| !s.is_empty());
    let correlation_id = params.image_code_id.as_deref().filter(|s| !s.is_empty());
    let (Some(answer), Some(correlation_id)) = (answer, correlation_id) else {
        return Err(AppFailure::MissingParameter.into());
    };

    let store = state.verify_codes();

    // Throttled requests bail out before the image code is consumed, so the
    // client does not burn its single verification attempt.
    store.check_send_cooldown(mobile.as_str())?;
    store.verify_image_code(correlation_id, answer).await?;

    let code = generate_sms_code();
    store.issue_sms_code(mobile.as_str(), &code).await?;
    state.sms().send_code(mobile.as_str(), &code);

    Ok(Json(json!({"code": 0, "errmsg": "ok"})))
}
