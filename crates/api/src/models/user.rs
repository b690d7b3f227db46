//! User domain types.
//!
//! These types represent validated domain objects separate from request
//! payload types.

use chrono::{DateTime, Utc};

use pavilion_core::{Mobile, UserId, Username};

/// An account (domain type).
///
/// The password hash is deliberately not part of this type; repositories
/// return it separately where credential checks need it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique account username.
    pub username: Username,
    /// Unique mobile number.
    pub mobile: Mobile,
    /// Email address; empty until the user sets one.
    pub email: String,
    /// Whether the email has been verified.
    pub email_active: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}
