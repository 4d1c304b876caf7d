//! Port interfaces for profile management
//!
//! These traits define the boundaries between core business logic and
//! infrastructure implementations: the remote identity authority on one
//! side, the local profile store on the other.

use async_trait::async_trait;
use thiserror::Error;
use verity_domain::{Identity, NewProfile, Profile, Result};

/// Outcome of a single identity lookup round trip.
///
/// `NotFound` is a distinguished, non-retriable answer: the remote authority
/// definitively reports no such user. `Transport` covers timeouts,
/// connection failures and server-side errors, and is the only retriable
/// variant. Adapters must classify every failure into one of these; no raw
/// transport error crosses this boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("user does not exist")]
    NotFound,

    #[error("user service transport failure: {cause}")]
    Transport { cause: String },
}

impl LookupError {
    /// Build a transport error from any displayable cause
    pub fn transport(cause: impl ToString) -> Self {
        Self::Transport { cause: cause.to_string() }
    }
}

/// Trait for looking up a user in the remote identity authority
///
/// One bounded round trip per invocation, no side effects. Retry and
/// circuit-breaking are layered on top by the verification gate, not by
/// implementations.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// Fetch the identity record for `user_id`
    async fn find_user(&self, user_id: i64) -> std::result::Result<Identity, LookupError>;
}

/// Trait for profile persistence and retrieval
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Persist a new profile row; the store assigns the id and audit fields
    async fn insert(&self, profile: NewProfile) -> Result<Profile>;

    /// Get a profile by id
    async fn find_by_id(&self, profile_id: i64) -> Result<Option<Profile>>;
}
