//! Global application configuration.
//!
//! `AppConfig` is a lazily initialized, process-wide singleton loaded from `.env` and the
//! environment. Free functions at the bottom of this module give read access to single
//! fields; the `set_*` associated functions override fields at runtime (mostly in tests).

use chrono::Duration;
use std::env;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock, RwLockReadGuard};

/// Complete runtime configuration for the attendance server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    /// How long an issued trainee token stays valid.
    pub token_validity_minutes: u64,
    /// Window applied when a tutor starts a lesson without an explicit duration.
    pub lesson_duration_minutes: u64,
}

/// Upper bound applied to every minute-valued setting (366 days).
pub const MAX_MINUTES: u64 = 366 * 24 * 60;

static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Missing keys fall back to development defaults; malformed numbers are ignored.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: var_or("APP_ENV", "development"),
            project_name: var_or("PROJECT_NAME", "mttc-attendance"),
            log_level: var_or("LOG_LEVEL", "api=info,services=info"),
            log_file: var_or("LOG_FILE", "api.log"),
            log_to_stdout: var_or("LOG_TO_STDOUT", "false") == "true",
            database_path: var_or("DATABASE_PATH", "data/mttc.db"),
            host: var_or("HOST", "127.0.0.1"),
            port: parsed_or("PORT", 5000),
            jwt_secret: var_or("JWT_SECRET", "dev-only-attendance-secret"),
            jwt_duration_minutes: parsed_or("JWT_DURATION_MINUTES", 60),
            token_validity_minutes: parsed_or("TOKEN_VALIDITY_MINUTES", 30),
            lesson_duration_minutes: parsed_or("LESSON_DURATION_MINUTES", 60),
        }
    }

    /// Returns a read guard over the global configuration, loading it on first use.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn global() -> RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Reloads the configuration from the environment, dropping any overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_port(value: u16) {
        AppConfig::set_field(|cfg| cfg.port = value);
    }

    pub fn set_jwt_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.jwt_secret = value.into());
    }

    pub fn set_jwt_duration_minutes(value: u64) {
        AppConfig::set_field(|cfg| cfg.jwt_duration_minutes = value);
    }

    pub fn set_token_validity_minutes(value: u64) {
        AppConfig::set_field(|cfg| cfg.token_validity_minutes = value);
    }

    pub fn set_lesson_duration_minutes(value: u64) {
        AppConfig::set_field(|cfg| cfg.lesson_duration_minutes = value);
    }
}

// --- Field accessors ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn jwt_secret() -> String {
    AppConfig::global().jwt_secret.clone()
}

pub fn jwt_duration_minutes() -> u64 {
    AppConfig::global().jwt_duration_minutes
}

pub fn token_validity_minutes() -> u64 {
    AppConfig::global().token_validity_minutes
}

pub fn lesson_duration_minutes() -> u64 {
    AppConfig::global().lesson_duration_minutes
}

// --- Durations, capped at `MAX_MINUTES` ---

fn capped_minutes(key: &str, minutes: u64) -> Duration {
    if minutes > MAX_MINUTES {
        tracing::warn!(key, minutes, max = MAX_MINUTES, "Configured duration capped");
    }
    Duration::minutes(i64::try_from(minutes.min(MAX_MINUTES)).unwrap_or_default())
}

pub fn jwt_duration() -> Duration {
    capped_minutes("JWT_DURATION_MINUTES", jwt_duration_minutes())
}

pub fn token_validity() -> Duration {
    capped_minutes("TOKEN_VALIDITY_MINUTES", token_validity_minutes())
}

pub fn lesson_duration() -> Duration {
    capped_minutes("LESSON_DURATION_MINUTES", lesson_duration_minutes())
}
