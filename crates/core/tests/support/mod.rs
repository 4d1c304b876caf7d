//! Mock port implementations for testing
//!
//! Provides in-memory fakes for the identity lookup and profile store
//! ports, enabling deterministic orchestrator tests without HTTP or
//! database dependencies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use verity_core::{IdentityLookup, LookupError, ProfileStore};
use verity_domain::constants::SYSTEM_AUDITOR;
use verity_domain::{Identity, NewProfile, Profile, ResilienceConfig, Result};

/// What the fake identity service should currently answer.
#[derive(Debug, Clone)]
pub enum RemoteUser {
    Found(Identity),
    NotFound,
    Transport(String),
}

/// Scriptable in-memory `IdentityLookup`.
///
/// The scripted answer can be swapped between calls, which lets tests model
/// a user changing or disappearing upstream after a profile was created.
/// Every invocation is counted so tests can assert the transport was (or
/// was not) contacted.
pub struct StubIdentityService {
    response: Mutex<RemoteUser>,
    calls: AtomicU32,
}

impl StubIdentityService {
    pub fn answering(response: RemoteUser) -> Self {
        Self { response: Mutex::new(response), calls: AtomicU32::new(0) }
    }

    /// Change the scripted answer for subsequent lookups.
    pub fn set_response(&self, response: RemoteUser) {
        *self.response.lock().expect("stub lock") = response;
    }

    /// Number of lookups that actually reached this fake.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityLookup for StubIdentityService {
    async fn find_user(&self, user_id: i64) -> std::result::Result<Identity, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.response.lock().expect("stub lock").clone() {
            RemoteUser::Found(identity) => Ok(Identity { id: user_id, ..identity }),
            RemoteUser::NotFound => Err(LookupError::NotFound),
            RemoteUser::Transport(cause) => Err(LookupError::Transport { cause }),
        }
    }
}

/// In-memory `ProfileStore` with auto-increment ids and audit stamping.
#[derive(Default)]
pub struct InMemoryProfileStore {
    rows: Mutex<HashMap<i64, Profile>>,
    next_id: AtomicI64,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self { rows: Mutex::new(HashMap::new()), next_id: AtomicI64::new(1) }
    }

    /// Number of persisted rows.
    pub fn len(&self) -> usize {
        self.rows.lock().expect("store lock").len()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn insert(&self, profile: NewProfile) -> Result<Profile> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let row = Profile {
            id,
            user_id: profile.user_id,
            bio: profile.bio,
            location: profile.location,
            age: profile.age,
            created_at: now,
            updated_at: now,
            created_by: Some(SYSTEM_AUDITOR.into()),
            updated_by: Some(SYSTEM_AUDITOR.into()),
        };
        self.rows.lock().expect("store lock").insert(id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, profile_id: i64) -> Result<Option<Profile>> {
        Ok(self.rows.lock().expect("store lock").get(&profile_id).cloned())
    }
}

/// Resilience tuning with millisecond backoffs so tests stay fast.
pub fn fast_resilience(retry_max_attempts: u32, breaker_failure_threshold: u64) -> ResilienceConfig {
    ResilienceConfig {
        retry_max_attempts,
        retry_initial_backoff_ms: 1,
        retry_max_backoff_ms: 1,
        breaker_failure_threshold,
        breaker_success_threshold: 1,
        breaker_cool_down_ms: 60_000,
        breaker_half_open_max_probes: 1,
    }
}

/// A remote identity answer for user 42.
pub fn ann() -> RemoteUser {
    RemoteUser::Found(Identity { id: 42, name: "Ann".into(), email: "a@x.com".into() })
}
