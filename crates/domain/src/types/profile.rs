//! Locally-owned profile types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::Identity;

/// A profile row as persisted by the local store.
///
/// The id and audit columns are assigned by the store on insert. `user_id`
/// references an [`Identity`] owned by the external user service; there is no
/// foreign-key constraint across the service boundary, so the referenced user
/// can disappear after creation without cascading here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub age: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

/// The validated payload for a profile creation.
///
/// Field constraints (bio length, non-negative age) are enforced by the API
/// layer before a `NewProfile` is constructed; the orchestrator and store
/// take them as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub user_id: i64,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub age: Option<u32>,
}

/// Read-time composite of a stored profile and its live identity.
///
/// Never persisted; exists only as the response of a read operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedProfile {
    pub profile_id: i64,
    pub user_id: i64,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub age: Option<u32>,
    pub user: Identity,
}

impl EnrichedProfile {
    /// Combine a stored profile with the identity fetched for it.
    pub fn from_parts(profile: Profile, user: Identity) -> Self {
        Self {
            profile_id: profile.id,
            user_id: profile.user_id,
            bio: profile.bio,
            location: profile.location,
            age: profile.age,
            user,
        }
    }
}
