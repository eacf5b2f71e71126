//! Configuration loading tests
//!
//! These tests change process environment variables and run serially.

use std::io::Write;
use std::time::Duration;

use serial_test::serial;
use tempfile::NamedTempFile;

use bbbgate::backend::server::config::{load_config, CONFIG_PATH_VAR};
use bbbgate::shared::ConfigError;

const VARS: [&str; 7] = [
    CONFIG_PATH_VAR,
    "DATABASE_URL",
    "BBBGATE_LISTEN",
    "BBBGATE_LIVENESS_SECS",
    "BBBGATE_REQUEST_TIMEOUT_SECS",
    "BBBGATE_RECONCILE_INTERVAL_SECS",
    "BBBGATE_ENABLE_ON_REGISTER",
];

/// Clears the configuration variables and restores them on drop
struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn clear() -> Self {
        let saved = VARS.iter().map(|var| (*var, std::env::var(var).ok())).collect();
        for var in VARS {
            std::env::remove_var(var);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (var, value) in &self.saved {
            match value {
                Some(value) => std::env::set_var(var, value),
                None => std::env::remove_var(var),
            }
        }
    }
}

#[test]
#[serial]
fn test_file_and_environment_layers() {
    let _env = EnvGuard::clear();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "listen = \"127.0.0.1:4100\"\nliveness_secs = 25\nreconcile_interval_secs = 60"
    )
    .unwrap();

    std::env::set_var(CONFIG_PATH_VAR, file.path());
    std::env::set_var("BBBGATE_LIVENESS_SECS", "12");

    let config = assert_ok!(load_config());

    assert_eq!(config.listen, "127.0.0.1:4100");
    assert_eq!(config.liveness_threshold, Duration::from_secs(12));
    assert_eq!(config.reconcile_interval, Duration::from_secs(60));
    assert!(config.database_url.is_none());
}

#[test]
#[serial]
fn test_missing_file() {
    let _env = EnvGuard::clear();
    std::env::set_var(CONFIG_PATH_VAR, "/nonexistent/bbbgate.toml");

    let result = load_config();
    assert_err!(result, ConfigError::Read { .. });
}

#[test]
#[serial]
fn test_unknown_file_key() {
    let _env = EnvGuard::clear();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "listen_port = 3000").unwrap();
    std::env::set_var(CONFIG_PATH_VAR, file.path());

    let result = load_config();
    assert_err!(result, ConfigError::Parse(_));
}

#[test]
#[serial]
fn test_invalid_database_url() {
    let _env = EnvGuard::clear();
    std::env::set_var("DATABASE_URL", "mysql://localhost/bbbgate");

    let result = load_config();
    assert_err!(result, ConfigError::InvalidUrl(_));
}
