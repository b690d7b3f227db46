//! Authentication middleware and extractors.
//!
//! Provides an extractor for requiring a logged-in session in route
//! handlers, plus helpers for establishing and clearing the session state.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::{Expiry, Session};

use crate::error::ApiError;
use crate::models::session::{CurrentUser, keys};

/// How long a "remembered" login stays valid without activity.
const REMEMBERED_SESSION_DAYS: i64 = 14;

/// Extractor that requires an authenticated session.
///
/// Rejects with 401 if no user is logged in.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(ApiError::Unauthorized)?;

        // Get the current user from the session
        let user: CurrentUser = session
            .get(keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(ApiError::Unauthorized)?;

        Ok(Self(user))
    }
}

/// Establish the session for a logged-in user.
///
/// A remembered session survives browser restarts for two weeks; otherwise
/// the cookie dies with the browser session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
    remembered: bool,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENT_USER, user).await?;

    if remembered {
        session.set_expiry(Some(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::days(REMEMBERED_SESSION_DAYS),
        )));
    } else {
        session.set_expiry(Some(Expiry::OnSessionEnd));
    }

    Ok(())
}

/// Clear the session entirely (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot be reached.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
