//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `VERITY_DB_PATH`: Database file path (required)
//! - `VERITY_DB_POOL_SIZE`: Connection pool size
//! - `VERITY_USER_SERVICE_URL`: Base URL of the user service (required)
//! - `VERITY_USER_SERVICE_TIMEOUT_MS`: Per-request timeout in milliseconds
//! - `VERITY_RETRY_MAX_ATTEMPTS`: Verification attempts per request
//! - `VERITY_RETRY_INITIAL_BACKOFF_MS`: First retry delay in milliseconds
//! - `VERITY_RETRY_MAX_BACKOFF_MS`: Backoff cap in milliseconds
//! - `VERITY_BREAKER_FAILURE_THRESHOLD`: Failures before the breaker opens
//! - `VERITY_BREAKER_SUCCESS_THRESHOLD`: Probe successes to close the breaker
//! - `VERITY_BREAKER_COOL_DOWN_MS`: Open-state duration in milliseconds
//! - `VERITY_BREAKER_HALF_OPEN_MAX_PROBES`: Concurrent half-open probes
//! - `VERITY_BIND_ADDR`: HTTP listen address
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./verity.json` or `./verity.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use verity_domain::{
    Config, DatabaseConfig, ProfileError, ResilienceConfig, Result, ServerConfig,
    UserServiceConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ProfileError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The database path and user-service URL must be present; everything else
/// falls back to its default when unset.
///
/// # Errors
/// Returns `ProfileError::Config` if required variables are missing or any
/// variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let defaults = Config::default();

    let db_path = env_var("VERITY_DB_PATH")?;
    let db_pool_size = env_parse("VERITY_DB_POOL_SIZE", defaults.database.pool_size)?;

    let user_service_url = env_var("VERITY_USER_SERVICE_URL")?;
    let user_service_timeout_ms =
        env_parse("VERITY_USER_SERVICE_TIMEOUT_MS", defaults.user_service.timeout_ms)?;

    let resilience = ResilienceConfig {
        retry_max_attempts: env_parse(
            "VERITY_RETRY_MAX_ATTEMPTS",
            defaults.resilience.retry_max_attempts,
        )?,
        retry_initial_backoff_ms: env_parse(
            "VERITY_RETRY_INITIAL_BACKOFF_MS",
            defaults.resilience.retry_initial_backoff_ms,
        )?,
        retry_max_backoff_ms: env_parse(
            "VERITY_RETRY_MAX_BACKOFF_MS",
            defaults.resilience.retry_max_backoff_ms,
        )?,
        breaker_failure_threshold: env_parse(
            "VERITY_BREAKER_FAILURE_THRESHOLD",
            defaults.resilience.breaker_failure_threshold,
        )?,
        breaker_success_threshold: env_parse(
            "VERITY_BREAKER_SUCCESS_THRESHOLD",
            defaults.resilience.breaker_success_threshold,
        )?,
        breaker_cool_down_ms: env_parse(
            "VERITY_BREAKER_COOL_DOWN_MS",
            defaults.resilience.breaker_cool_down_ms,
        )?,
        breaker_half_open_max_probes: env_parse(
            "VERITY_BREAKER_HALF_OPEN_MAX_PROBES",
            defaults.resilience.breaker_half_open_max_probes,
        )?,
    };

    let bind_addr =
        std::env::var("VERITY_BIND_ADDR").unwrap_or_else(|_| defaults.server.bind_addr.clone());

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        user_service: UserServiceConfig {
            base_url: user_service_url,
            timeout_ms: user_service_timeout_ms,
        },
        resilience,
        server: ServerConfig { bind_addr },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ProfileError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ProfileError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ProfileError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ProfileError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ProfileError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ProfileError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ProfileError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("verity.json"),
            cwd.join("verity.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("verity.json"),
                exe_dir.join("verity.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ProfileError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional environment variable, using `default` when unset
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ProfileError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}
