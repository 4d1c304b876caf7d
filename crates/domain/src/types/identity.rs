//! Remote identity snapshot types

use serde::{Deserialize, Serialize};

/// A user record as reported by the external user service.
///
/// Identities are owned by the remote authority. They are never persisted
/// locally; an `Identity` value is an immutable snapshot, valid only for the
/// request that fetched it. The identity attached to a profile read reflects
/// the remote state *at read time*, not at profile-creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: i64,
    pub name: String,
    pub email: String,
}
