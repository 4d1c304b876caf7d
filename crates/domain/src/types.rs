//! Core domain types

pub mod identity;
pub mod profile;

pub use identity::Identity;
pub use profile::{EnrichedProfile, NewProfile, Profile};
