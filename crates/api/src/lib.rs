//! # Verity API
//!
//! HTTP surface of the profile service.
//!
//! This crate wires the infrastructure adapters into the core orchestrator
//! and exposes it over axum:
//! - `POST /profiles` creates a profile for a verified user
//! - `GET /profiles/{id}` returns a profile enriched with its live identity
//! - `GET /health` reports process and database liveness

pub mod error;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
