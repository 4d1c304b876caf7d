//! Domain constants

/// Maximum length of a profile bio, in characters.
pub const MAX_BIO_LEN: usize = 500;

/// Default timeout for a single user-service round trip, in milliseconds.
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 2_000;

/// Auditor name stamped into `created_by`/`updated_by` on writes performed
/// by the service itself.
pub const SYSTEM_AUDITOR: &str = "verity";
