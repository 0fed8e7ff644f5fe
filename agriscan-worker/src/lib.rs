//! # AgriScan Alert Worker Library
//!
//! Sends a daily SMS weather alert to every user who signed up with a phone
//! number.
//!
//! ## Modules
//!
//! - `config`: Configuration management
//! - `scheduler`: Daily schedule and alert dispatch
//!
//! ## Example
//!
//! ```no_run
//! use agriscan_worker::scheduler::next_run_after;
//! use chrono::Utc;
//!
//! let next = next_run_after(Utc::now(), 6);
//! println!("Next alert run at {}", next);
//! ```

pub mod config;
pub mod scheduler;
