//! Verity - Remote-Verified Profile Service
//!
//! Main entry point for the HTTP server.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use verity_api::{router, AppState};
use verity_core::{ProfileService, VerificationGate};
use verity_infra::config;
use verity_infra::{DbManager, HttpUserClient, SqliteProfileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging FIRST so we can see .env loading
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load environment variables from .env file
    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => warn!(error = %e, "could not load .env file"),
    }

    let config = config::load()?;

    let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
    db.run_migrations()?;

    let store = Arc::new(SqliteProfileStore::new(Arc::clone(&db)));
    let lookup = Arc::new(HttpUserClient::new(&config.user_service)?);
    let gate = VerificationGate::new(lookup, &config.resilience)?;
    let service = Arc::new(ProfileService::new(store, gate));

    let app = router(AppState::new(service, db));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!(addr = %config.server.bind_addr, "verity listening");
    axum::serve(listener, app).await?;

    Ok(())
}
