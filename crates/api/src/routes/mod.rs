//! Route registration.

pub mod health;
pub mod profiles;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/profiles", post(profiles::create_profile))
        .route("/profiles/{id}", get(profiles::get_profile))
        .with_state(state)
}
