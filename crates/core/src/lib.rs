//! Pavilion Core - Shared types library.
//!
//! This crate provides common types used across all Pavilion components:
//! - `api` - HTTP service for accounts, addresses, and verification codes
//! - `integration-tests` - End-to-end HTTP tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and validated account fields

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
