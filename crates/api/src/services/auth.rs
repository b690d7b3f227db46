//! Authentication service.
//!
//! Handles account creation and credential checks over Argon2id hashes.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use thiserror::Error;

use pavilion_core::{Mobile, RawPassword, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;

/// Errors produced by authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username/password combination is wrong.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The username or mobile is already registered.
    #[error("account already exists")]
    AlreadyExists,

    /// Password hashing failed.
    #[error("failed to hash password")]
    PasswordHash,

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new account.
    ///
    /// The caller has already validated field formats; this hashes the
    /// password and creates the row.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyExists` if the username or mobile is taken.
    pub async fn register(
        &self,
        username: &Username,
        password: &RawPassword,
        mobile: &Mobile,
    ) -> Result<User, AuthError> {
        let password_hash = hash_password(password.expose())?;

        let user = self
            .users
            .create_with_password(username, &password_hash, mobile)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Check a username/password pair and return the account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no such account exists or
    /// the password is wrong.
    pub async fn login(
        &self,
        username: &Username,
        password: &RawPassword,
    ) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .get_with_password_hash(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password.expose(), &password_hash)?;

        Ok(user)
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
