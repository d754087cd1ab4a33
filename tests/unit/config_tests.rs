// ==========================
// tests/unit/config_tests.rs
// ==========================
//! Unit tests for the configuration module
use std::sync::Arc;

use authcore_lib::clock::ManualClock;
use authcore_lib::config::{LockoutSettings, PoolSettings, SessionSettings, Settings};
use authcore_lib::error::AppError;
use authcore_lib::users::InMemoryUserStore;
use authcore_lib::AppState;
use chrono::Duration;
use figment::Jail;

use crate::test_utils::{fixture_users, CountingConnector};

#[test]
fn test_settings_default() {
    let settings = Settings::default();

    assert_eq!(settings.log_level, "info");
    assert_eq!(settings.session.timeout_secs, 3600);
    assert_eq!(settings.lockout.max_attempts, 5);
    assert_eq!(settings.lockout.window_secs, 900);
    assert_eq!(settings.pool.size, 3);
}

#[test]
fn test_settings_custom() {
    let settings = Settings {
        log_level: "warn".to_string(),
        session: SessionSettings { timeout_secs: 60 },
        lockout: LockoutSettings {
            max_attempts: 3,
            window_secs: 120,
        },
        pool: PoolSettings { size: 8 },
    };

    assert!(settings.validate().is_ok());
    assert_eq!(settings.session_timeout(), Duration::seconds(60));
    assert_eq!(settings.lockout_policy().window, Duration::seconds(120));
}

// Loading reads the process environment, so every loader test runs in a
// figment jail.

#[test]
fn test_missing_file_uses_defaults() {
    Jail::expect_with(|_jail| {
        let settings = Settings::load_from("absent.toml").map_err(|e| e.to_string())?;
        assert_eq!(settings, Settings::default());
        Ok(())
    });
}

#[test]
fn test_malformed_file_is_a_config_error() {
    Jail::expect_with(|jail| {
        jail.create_file("authcore.toml", "[session]\ntimeout_secs = \"soon\"\n")?;

        let err = Settings::load_from("authcore.toml").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(err.error_code(), "CFG_001");
        Ok(())
    });
}

#[test]
fn test_env_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "authcore.toml",
            r#"
            log_level = "warn"

            [session]
            timeout_secs = 600

            [pool]
            size = 4
            "#,
        )?;
        jail.set_env("AUTHCORE_SESSION__TIMEOUT_SECS", "1800");
        jail.set_env("AUTHCORE_LOG_LEVEL", "debug");

        let settings = Settings::load().map_err(|e| e.to_string())?;

        assert_eq!(settings.session.timeout_secs, 1800);
        assert_eq!(settings.log_level, "debug");
        // keys only set in the file survive
        assert_eq!(settings.pool.size, 4);
        assert_eq!(settings.lockout.max_attempts, 5);
        Ok(())
    });
}

#[test]
fn test_env_values_are_validated() {
    Jail::expect_with(|jail| {
        jail.set_env("AUTHCORE_LOCKOUT__MAX_ATTEMPTS", "0");

        let err = Settings::load_from("absent.toml").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        Ok(())
    });
}

#[test]
fn test_log_level_is_case_insensitive() {
    let settings = Settings::builder().log_level("DEBUG").build().unwrap();
    assert_eq!(settings.log_level, "DEBUG");
}

#[test]
fn test_app_state_wires_settings() {
    let settings = Settings::builder()
        .session_timeout_secs(30)
        .max_attempts(2)
        .pool_size(2)
        .build()
        .unwrap();
    let clock = Arc::new(ManualClock::starting_now());
    let state = AppState::new(InMemoryUserStore::new(fixture_users()), settings, clock).unwrap();

    assert_eq!(state.auth.sessions().timeout(), Duration::seconds(30));
    assert_eq!(state.auth.attempts().policy().max_attempts, 2);

    let pool = state.open_pool(&CountingConnector::default()).unwrap();
    assert_eq!(pool.capacity(), 2);
}

#[test]
fn test_app_state_rejects_invalid_settings() {
    let mut settings = Settings::default();
    settings.session.timeout_secs = 0;
    let clock = Arc::new(ManualClock::starting_now());

    let result = AppState::new(InMemoryUserStore::default(), settings, clock);
    assert!(matches!(result, Err(AppError::Config(_))));
}
