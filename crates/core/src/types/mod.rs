//! Core types for Pavilion.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod mobile;
pub mod password;
pub mod username;

pub use id::*;
pub use mobile::{Mobile, MobileError};
pub use password::{PasswordError, RawPassword};
pub use username::{Username, UsernameError};
