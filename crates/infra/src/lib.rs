//! # Verity Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The SQLite-backed profile store
//! - The HTTP identity lookup client
//! - The configuration loader
//!
//! ## Architecture
//! - Implements traits defined in `verity-core`
//! - Depends on `verity-domain` and `verity-core`
//! - Contains all "impure" code (I/O, network)

pub mod config;
pub mod database;
pub mod http;

// Re-export commonly used items
pub use database::{DbManager, SqliteProfileStore};
pub use http::HttpUserClient;
