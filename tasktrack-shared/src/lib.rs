//! # Tasktrack Shared Library
//!
//! Domain types and business rules shared by the tasktrack API server.
//!
//! ## Module Organization
//!
//! - `models`: Users, tasks, and their wire projections
//! - `auth`: Password hashing, credential store, session tokens, authorization policy
//! - `store`: Repository traits with in-memory and PostgreSQL implementations
//! - `db`: PostgreSQL connection pool and migrations
//! - `seed`: Demo data for fresh installations

pub mod auth;
pub mod db;
pub mod models;
pub mod seed;
pub mod store;

/// Current version of the tasktrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
