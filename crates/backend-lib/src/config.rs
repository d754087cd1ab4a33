// ============================
// authcore-lib/src/config.rs
// ============================
//! Configuration management.
//!
//! Tunables are layered with figment: compiled defaults, then an optional
//! `authcore.toml`, then `AUTHCORE_*` environment variables (nested keys
//! use `__`, e.g. `AUTHCORE_SESSION__TIMEOUT_SECS=1800`).
use std::path::Path;

use chrono::Duration;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::auth::attempts::{DEFAULT_LOCKOUT_SECS, DEFAULT_MAX_ATTEMPTS};
use crate::auth::session::DEFAULT_SESSION_TIMEOUT_SECS;
use crate::auth::LockoutPolicy;
use crate::error::AppError;
use crate::pool::DEFAULT_POOL_SIZE;

/// Default config file looked up by [`Settings::load`]
pub const DEFAULT_CONFIG_FILE: &str = "authcore.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "AUTHCORE_";

/// Upper bound for any configured time window (30 days)
const MAX_WINDOW_SECS: u64 = 30 * 24 * 60 * 60;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level
    pub log_level: String,
    /// Session lifetime
    pub session: SessionSettings,
    /// Failed-login lockout policy
    pub lockout: LockoutSettings,
    /// Connection pool sizing
    pub pool: PoolSettings,
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Seconds a session stays valid after creation or refresh
    pub timeout_secs: u64,
}

/// Lockout settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockoutSettings {
    /// Failed attempts before the account locks
    pub max_attempts: u32,
    /// Lockout window in seconds, measured from the last failed attempt
    pub window_secs: u64,
}

/// Connection pool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Pooled connections, not counting the main connection
    pub size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            session: SessionSettings::default(),
            lockout: LockoutSettings::default(),
            pool: PoolSettings::default(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS.unsigned_abs(),
        }
    }
}

impl Default for LockoutSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window_secs: DEFAULT_LOCKOUT_SECS.unsigned_abs(),
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            size: DEFAULT_POOL_SIZE,
        }
    }
}

impl Settings {
    /// Load settings from `authcore.toml` (if present) and the environment
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from an explicit TOML file and the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let settings: Settings = Self::figment(path.as_ref()).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// The provider stack used by the loaders
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Start building settings from defaults
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Check that every tunable is usable
    pub fn validate(&self) -> Result<(), AppError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "invalid log level '{}'",
                self.log_level
            )));
        }
        if self.session.timeout_secs == 0 || self.session.timeout_secs > MAX_WINDOW_SECS {
            return Err(AppError::Config(format!(
                "session.timeout_secs must be within 1..={MAX_WINDOW_SECS}"
            )));
        }
        if self.lockout.max_attempts == 0 {
            return Err(AppError::Config(
                "lockout.max_attempts must be greater than zero".to_string(),
            ));
        }
        if self.lockout.window_secs == 0 || self.lockout.window_secs > MAX_WINDOW_SECS {
            return Err(AppError::Config(format!(
                "lockout.window_secs must be within 1..={MAX_WINDOW_SECS}"
            )));
        }
        if self.pool.size == 0 {
            return Err(AppError::Config(
                "pool.size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Session lifetime as a duration
    pub fn session_timeout(&self) -> Duration {
        seconds(self.session.timeout_secs)
    }

    /// Lockout policy derived from these settings
    pub fn lockout_policy(&self) -> LockoutPolicy {
        LockoutPolicy::new(self.lockout.max_attempts, seconds(self.lockout.window_secs))
    }
}

// Values are bounded by `validate`; saturate for anything that slipped past.
fn seconds(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or_else(|| Duration::seconds(i64::MAX / 1_000))
}

/// Builder for [`Settings`]
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.settings.log_level = level.into();
        self
    }

    pub fn session_timeout_secs(mut self, secs: u64) -> Self {
        self.settings.session.timeout_secs = secs;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.settings.lockout.max_attempts = attempts;
        self
    }

    pub fn lockout_window_secs(mut self, secs: u64) -> Self {
        self.settings.lockout.window_secs = secs;
        self
    }

    pub fn pool_size(mut self, size: usize) -> Self {
        self.settings.pool.size = size;
        self
    }

    /// Validate and return the settings
    pub fn build(self) -> Result<Settings, AppError> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}
