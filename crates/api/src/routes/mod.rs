//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                         - Liveness check
//! GET    /health/ready                   - Readiness check (probes database)
//!
//! # Areas
//! GET    /areas/                         - Province list
//! GET    /areas/{id}/                    - Sub-areas of a region
//!
//! # Accounts
//! GET    /usernames/{username}/count/    - Username existence check
//! GET    /mobiles/{mobile}/count/        - Mobile existence check
//! POST   /register/                      - Create account, establish session
//! POST   /login/                         - Authenticate, establish session
//! DELETE /logout/                        - Clear session
//! GET    /info/                          - Account projection (requires session)
//!
//! # Addresses
//! POST   /addresses/create/              - Create address (requires session)
//!
//! # Verification codes
//! GET    /image_code/{uuid}/             - Render image code (PNG)
//! GET    /sms_code/{mobile}/             - Issue SMS code
//! ```

pub mod addresses;
pub mod areas;
pub mod users;
pub mod verifications;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Area lookups
        .route("/areas/", get(areas::provinces))
        .route("/areas/{id}/", get(areas::sub_areas))
        // Accounts
        .route("/usernames/{username}/count/", get(users::username_count))
        .route("/mobiles/{mobile}/count/", get(users::mobile_count))
        .route("/register/", post(users::register))
        .route("/login/", post(users::login))
        .route("/logout/", delete(users::logout))
        .route("/info/", get(users::info))
        // Addresses
        .route("/addresses/create/", post(addresses::create))
        // Verification codes
        .route("/image_code/{uuid}/", get(verifications::image_code))
        .route("/sms_code/{mobile}/", get(verifications::sms_code))
}
