//! User repository for database operations.
//!
//! Queries use the runtime sqlx API so the crate builds without a live
//! database connection.

use sqlx::PgPool;

use pavilion_core::{Mobile, UserId, Username};

use super::RepositoryError;
use crate::models::user::User;

const USER_COLUMNS: &str = "id, username, mobile, email, email_active, created_at, updated_at";

/// Row type for credential checks: the user plus their password hash.
#[derive(sqlx::FromRow)]
struct UserAuthRow {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count accounts registered under a username (0 or 1 given uniqueness).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_username(&self, username: &Username) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Count accounts registered under a mobile number (0 or 1 given uniqueness).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_mobile(&self, mobile: &Mobile) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE mobile = $1")
            .bind(mobile)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Create a new account with a hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or mobile already
    /// exists. Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        username: &Username,
        password_hash: &str,
        mobile: &Mobile,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users (username, password_hash, mobile) \
             VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(password_hash)
            .bind(mobile)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict(
                        "username or mobile already exists".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        Ok(user)
    }

    /// Get a user and their password hash by username.
    ///
    /// Returns `None` if no such account exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = $1");
        let row = sqlx::query_as::<_, UserAuthRow>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }
}
