//! Shared handler state.

use std::sync::Arc;

use verity_core::ProfileService;
use verity_infra::DbManager;

/// State handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ProfileService>,
    pub db: Arc<DbManager>,
}

impl AppState {
    pub fn new(service: Arc<ProfileService>, db: Arc<DbManager>) -> Self {
        Self { service, db }
    }
}
