//! Integration tests for Pavilion.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! sqlx migrate run --source crates/api/migrations
//!
//! # Start the API
//! cargo run -p pavilion-api
//!
//! # Run integration tests
//! cargo test -p pavilion-integration-tests -- --ignored
//! ```
//!
//! The tests live in `tests/` and talk to a running server over HTTP; they
//! are `#[ignore]`d so plain `cargo test` stays self-contained.
