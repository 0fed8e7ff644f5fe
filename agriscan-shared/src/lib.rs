//! # AgriScan Shared Library
//!
//! This crate contains the types and business logic shared by the AgriScan
//! web server and the alert worker.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, session claims and the credential store
//! - `db`: SQLite connection pool and embedded migrations
//! - `models`: Database models
//! - `classifier`: Leaf image classification
//! - `clients`: Hosted chat, SMS and weather services

pub mod auth;
pub mod classifier;
pub mod clients;
pub mod db;
pub mod models;

/// Current version of the AgriScan shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
