/**
 * Server Configuration
 *
 * This module loads the gateway configuration and opens the backend store.
 *
 * # Configuration Sources
 *
 * Later sources override earlier ones:
 *
 * 1. Built-in defaults
 * 2. TOML file named by `BBBGATE_CONFIG`
 * 3. Environment variables (`.env` is read by the binary beforehand)
 *
 * | Variable | Field |
 * |----------|-------|
 * | `DATABASE_URL` | `database_url` |
 * | `BBBGATE_LISTEN` | `listen` |
 * | `BBBGATE_LIVENESS_SECS` | `liveness_threshold` |
 * | `BBBGATE_REQUEST_TIMEOUT_SECS` | `request_timeout` |
 * | `BBBGATE_RECONCILE_INTERVAL_SECS` | `reconcile_interval` |
 * | `BBBGATE_ENABLE_ON_REGISTER` | `enable_on_register` |
 *
 * # Store Selection
 *
 * With a database URL the PostgreSQL store is used and migrated at
 * startup. Without one the gateway runs on the in-memory store and
 * forgets all backends on restart.
 */

use std::sync::Arc;
use std::time::Duration;

use crate::backend::store::{MemoryStore, PgStore, Store, StoreError};
use crate::shared::config::{ConfigError, ConfigFile, GatewayConfig, GatewayConfigBuilder};

/// Environment variable naming the TOML configuration file
pub const CONFIG_PATH_VAR: &str = "BBBGATE_CONFIG";

/// Load the configuration from the file and the process environment
pub fn load_config() -> Result<GatewayConfig, ConfigError> {
    let mut builder = GatewayConfig::builder();

    if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        builder = builder.merge_file(ConfigFile::parse(&text)?);
        tracing::info!(path = %path, "Loaded configuration file");
    }

    apply_env(builder, |key| std::env::var(key).ok())?.build()
}

/// Layer environment values over `builder`
///
/// # Arguments
///
/// * `builder` - Builder holding defaults and file values
/// * `lookup` - Returns the value of an environment variable, if set
pub fn apply_env<F>(mut builder: GatewayConfigBuilder, lookup: F) -> Result<GatewayConfigBuilder, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL") {
        builder = builder.database_url(url);
    }
    if let Some(listen) = lookup("BBBGATE_LISTEN") {
        builder = builder.listen(listen);
    }
    if let Some(secs) = lookup("BBBGATE_LIVENESS_SECS") {
        builder = builder.liveness_threshold(parse_secs("BBBGATE_LIVENESS_SECS", &secs)?);
    }
    if let Some(secs) = lookup("BBBGATE_REQUEST_TIMEOUT_SECS") {
        builder = builder.request_timeout(parse_secs("BBBGATE_REQUEST_TIMEOUT_SECS", &secs)?);
    }
    if let Some(secs) = lookup("BBBGATE_RECONCILE_INTERVAL_SECS") {
        builder = builder.reconcile_interval(parse_secs("BBBGATE_RECONCILE_INTERVAL_SECS", &secs)?);
    }
    if let Some(flag) = lookup("BBBGATE_ENABLE_ON_REGISTER") {
        builder = builder.enable_on_register(parse_flag("BBBGATE_ENABLE_ON_REGISTER", &flag)?);
    }
    Ok(builder)
}

fn parse_secs(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidValue {
            key,
            message: format!("`{}` is not a number of seconds: {}", value, e),
        })
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            message: format!("`{}` is not a boolean", value),
        }),
    }
}

/// Open the store selected by the configuration
///
/// # Errors
///
/// Connecting to or migrating the database fails. There is no silent
/// fallback to the in-memory store once a database URL is configured.
pub async fn load_store(config: &GatewayConfig) -> Result<Arc<dyn Store>, StoreError> {
    match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let store = PgStore::connect(url).await?;
            tracing::info!("Running database migrations...");
            store.migrate().await?;
            tracing::info!("Database ready");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set. Backend state is kept in memory only.");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
