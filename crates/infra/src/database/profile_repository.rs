//! Profile repository implementation using SQLite
//!
//! Provides persistence for locally-owned profile rows. Timestamps are
//! stored as RFC 3339 text and audit columns are stamped on every write.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use tokio::task;
use verity_core::ProfileStore;
use verity_domain::constants::SYSTEM_AUDITOR;
use verity_domain::{NewProfile, Profile, ProfileError, Result as DomainResult};

use super::manager::DbManager;

/// SQLite-backed implementation of `ProfileStore`
pub struct SqliteProfileStore {
    db: Arc<DbManager>,
}

impl SqliteProfileStore {
    /// Create a new repository instance
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn insert(&self, profile: NewProfile) -> DomainResult<Profile> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Profile> {
            let conn = db.get_connection()?;
            let now = Utc::now();

            conn.execute(
                "INSERT INTO profiles (
                    user_id, bio, location, age,
                    created_at, updated_at, created_by, updated_by
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    profile.user_id,
                    profile.bio,
                    profile.location,
                    profile.age,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                    SYSTEM_AUDITOR,
                    SYSTEM_AUDITOR,
                ],
            )
            .map_err(map_sql_error)?;

            Ok(Profile {
                id: conn.last_insert_rowid(),
                user_id: profile.user_id,
                bio: profile.bio,
                location: profile.location,
                age: profile.age,
                created_at: now,
                updated_at: now,
                created_by: Some(SYSTEM_AUDITOR.into()),
                updated_by: Some(SYSTEM_AUDITOR.into()),
            })
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_id(&self, profile_id: i64) -> DomainResult<Option<Profile>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<Profile>> {
            let conn = db.get_connection()?;

            let result = conn.query_row(
                "SELECT id, user_id, bio, location, age,
                        created_at, updated_at, created_by, updated_by
                 FROM profiles WHERE id = ?1",
                params![profile_id],
                map_profile_row,
            );

            match result {
                Ok(profile) => Ok(Some(profile)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(err) => Err(map_sql_error(err)),
            }
        })
        .await
        .map_err(map_join_error)?
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Map a row to a Profile
fn map_profile_row(row: &Row) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        bio: row.get(2)?,
        location: row.get(3)?,
        age: row.get(4)?,
        created_at: parse_timestamp(row, 5)?,
        updated_at: parse_timestamp(row, 6)?,
        created_by: row.get(7)?,
        updated_by: row.get(8)?,
    })
}

fn parse_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw).map(|dt| dt.with_timezone(&Utc)).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

// =============================================================================
// Error Mapping
// =============================================================================

fn map_sql_error(err: rusqlite::Error) -> ProfileError {
    ProfileError::Database(format!("SQLite error: {err}"))
}

fn map_join_error(err: task::JoinError) -> ProfileError {
    ProfileError::Internal(format!("Task join error: {err}"))
}

// =============================================================================
// Tests
// =============================================================================
