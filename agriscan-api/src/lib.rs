//! # AgriScan Web Server Library
//!
//! Signup and login, leaf image classification, and the farming assistant,
//! served as plain HTML pages.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers and the session guard
//! - `routes`: Route handlers
//! - `views`: HTML rendering

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod views;
