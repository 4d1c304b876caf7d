//! User Service Client
//!
//! Fetches user identities from the remote user service over HTTP.
//!
//! This adapter is deliberately thin: it issues a single request per call
//! and reports the outcome. Retries and circuit breaking live in the
//! verification gate, which wraps this client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use verity_core::{IdentityLookup, LookupError};
use verity_domain::{Identity, ProfileError, Result, UserServiceConfig};

/// Client for fetching user identities from the remote user service
pub struct HttpUserClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserClient {
    /// Create a new client from the user-service configuration
    ///
    /// # Errors
    /// Returns `ProfileError::Config` if the base URL is malformed or the
    /// HTTP client cannot be constructed.
    pub fn new(config: &UserServiceConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        url::Url::parse(&base_url)
            .map_err(|_| ProfileError::Config(format!("invalid user service URL: {base_url}")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .no_proxy()
            .build()
            .map_err(|e| ProfileError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl IdentityLookup for HttpUserClient {
    async fn find_user(&self, user_id: i64) -> std::result::Result<Identity, LookupError> {
        let url = format!("{}/users/{user_id}", self.base_url);
        debug!(%url, user_id, "fetching user identity");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::transport(format!("request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(user_id, "user service reports no such user");
            return Err(LookupError::NotFound);
        }
        if !status.is_success() {
            return Err(LookupError::transport(format!("user service returned {status}")));
        }

        response
            .json::<Identity>()
            .await
            .map_err(|e| LookupError::transport(format!("invalid user payload: {e}")))
    }
}
