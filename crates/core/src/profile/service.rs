//! Profile orchestrator - core business logic
//!
//! Coordinates the verification gate with the local store so that a
//! mutation never happens without a successful verification and a read
//! always attaches live identity data. The remote call and the store access
//! are strictly sequential per operation; no lock is ever held across the
//! remote call.

use std::sync::Arc;

use tracing::{info, instrument};
use verity_common::resilience::circuit_breaker::{Clock, SystemClock};
use verity_domain::{EnrichedProfile, NewProfile, Profile, ProfileError, Result};

use super::ports::ProfileStore;
use super::verification::{Verification, VerificationGate};

/// Profile orchestration service
pub struct ProfileService<C: Clock = SystemClock> {
    store: Arc<dyn ProfileStore>,
    gate: VerificationGate<C>,
}

impl<C: Clock> ProfileService<C> {
    /// Create a new profile service
    pub fn new(store: Arc<dyn ProfileStore>, gate: VerificationGate<C>) -> Self {
        Self { store, gate }
    }

    /// Create a profile after verifying its referenced user exists.
    ///
    /// The write path is unreachable unless the gate returned Verified:
    /// a rejected or unavailable verification fails the operation before
    /// any store access. Field constraints (bio length, age range) are the
    /// API collaborator's contract and are not re-checked here.
    #[instrument(skip(self, request), fields(user_id = request.user_id))]
    pub async fn create(&self, request: NewProfile) -> Result<Profile> {
        match self.gate.verify(request.user_id).await {
            Verification::Verified(_) => {}
            Verification::Rejected => {
                return Err(ProfileError::UserNotFound { user_id: request.user_id });
            }
            Verification::Unavailable { cause } => {
                return Err(ProfileError::UserServiceUnavailable {
                    user_id: request.user_id,
                    cause,
                });
            }
        }

        let profile = self.store.insert(request).await?;
        info!(profile_id = profile.id, user_id = profile.user_id, "profile created");
        Ok(profile)
    }

    /// Read a profile and enrich it with the live identity of its user.
    ///
    /// Enrichment is mandatory, not best-effort: when the identity cannot
    /// currently be fetched the whole read fails with a typed error instead
    /// of returning a profile with a missing identity. A profile whose user
    /// was deleted upstream surfaces `UserNotFound`, distinct from
    /// `ProfileNotFound`.
    #[instrument(skip(self))]
    pub async fn get_with_user(&self, profile_id: i64) -> Result<EnrichedProfile> {
        let profile = self
            .store
            .find_by_id(profile_id)
            .await?
            .ok_or(ProfileError::ProfileNotFound { profile_id })?;

        match self.gate.verify(profile.user_id).await {
            Verification::Verified(identity) => Ok(EnrichedProfile::from_parts(profile, identity)),
            Verification::Rejected => {
                Err(ProfileError::UserNotFound { user_id: profile.user_id })
            }
            Verification::Unavailable { cause } => {
                Err(ProfileError::UserServiceUnavailable { user_id: profile.user_id, cause })
            }
        }
    }
}
