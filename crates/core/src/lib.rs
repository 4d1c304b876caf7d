//! # Verity Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the identity lookup and the
//!   profile store
//! - The verification gate translating remote-call outcomes into domain
//!   outcomes
//! - The profile orchestrator (create-with-verification,
//!   read-with-enrichment)
//!
//! ## Architecture Principles
//! - Only depends on `verity-common` and `verity-domain`
//! - No database or HTTP code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod profile;

// Re-export specific items to avoid ambiguity
pub use profile::ports::{IdentityLookup, LookupError, ProfileStore};
pub use profile::verification::{Verification, VerificationGate};
pub use profile::ProfileService;
