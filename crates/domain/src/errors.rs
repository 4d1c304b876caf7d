//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Verity profile operations.
///
/// Remote-call failures are classified before they reach this type: the
/// verification gate translates transport faults into
/// [`UserServiceUnavailable`](ProfileError::UserServiceUnavailable) and a
/// definitive remote "no such user" into
/// [`UserNotFound`](ProfileError::UserNotFound). Callers can rely on the
/// variant to pick a response (the HTTP layer maps them to distinct status
/// codes) without ever inspecting an underlying transport error.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ProfileError {
    /// No profile row exists for the requested id.
    #[error("Profile with id {profile_id} not found")]
    ProfileNotFound { profile_id: i64 },

    /// The user service definitively reported that the referenced user does
    /// not exist. Terminal; never produced by a transport fault.
    #[error("User with id {user_id} not found")]
    UserNotFound { user_id: i64 },

    /// The user service could not be reached after the retry/breaker policy
    /// ran its course. The referenced user may well exist; the wording must
    /// not claim otherwise.
    #[error("User {user_id} cannot currently be verified: user service is not available right now ({cause})")]
    UserServiceUnavailable { user_id: i64, cause: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Verity operations
pub type Result<T> = std::result::Result<T, ProfileError>;
