//! Profile endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use verity_domain::constants::MAX_BIO_LEN;
use verity_domain::{EnrichedProfile, NewProfile, Profile};

use crate::error::ApiError;
use crate::state::AppState;

/// Creation payload as received on the wire.
///
/// All fields are optional at the serde level so that validation can report
/// every problem at once instead of failing on the first missing field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub user_id: Option<i64>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub age: Option<i64>,
}

impl CreateProfileRequest {
    /// Check field constraints, producing either a validated payload or the
    /// full list of violations.
    fn validate(self) -> Result<NewProfile, Vec<String>> {
        let mut errors = Vec::new();

        if self.user_id.is_none() {
            errors.push("userId is required".to_string());
        }
        if let Some(bio) = &self.bio {
            if bio.chars().count() > MAX_BIO_LEN {
                errors.push(format!("bio must not exceed {MAX_BIO_LEN} characters"));
            }
        }
        let age = match self.age {
            None => None,
            Some(age) if age < 0 => {
                errors.push("age must not be negative".to_string());
                None
            }
            Some(age) => match u32::try_from(age) {
                Ok(age) => Some(age),
                Err(_) => {
                    errors.push("age is out of range".to_string());
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        // user_id presence was checked above
        let user_id = self.user_id.unwrap_or_default();
        Ok(NewProfile { user_id, bio: self.bio, location: self.location, age })
    }
}

pub async fn create_profile(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    req: Result<Json<CreateProfileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let path = uri.path().to_string();

    let Json(req) = req.map_err(|rejection| {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text(), path.clone())
    })?;

    let new_profile = req.validate().map_err(|errors| ApiError::validation(path.clone(), errors))?;

    let profile = state
        .service
        .create(new_profile)
        .await
        .map_err(|err| ApiError::from_domain(err, path.clone()))?;

    info!(profile_id = profile.id, user_id = profile.user_id, "profile created");
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_profile(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(profile_id): Path<i64>,
) -> Result<Json<EnrichedProfile>, ApiError> {
    let path = uri.path().to_string();

    let enriched = state
        .service
        .get_with_user(profile_id)
        .await
        .map_err(|err| ApiError::from_domain(err, path))?;

    Ok(Json(enriched))
}
