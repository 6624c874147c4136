//! # Untangle Shared Library
//!
//! This crate contains the types, persistence layer, and business logic used
//! across the Untangle API server and its connectors.
//!
//! ## Module Organization
//!
//! - `models`: Database models and CRUD operations (one module per entity)
//! - `auth`: Password hashing, JWT tokens, and the request auth context
//! - `db`: Connection pool and migration runner
//! - `nutrition`: The pure meal-scoring core (totals, badges, score, effects)

pub mod auth;
pub mod db;
pub mod models;
pub mod nutrition;

/// Current version of the Untangle shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
