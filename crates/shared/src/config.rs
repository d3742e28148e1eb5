//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger rules configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// How long a request may wait for a pooled connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    /// How long a unit of work may wait for a row lock.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_ms: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_lock_timeout() -> u64 {
    5000
}

/// Ledger rules configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Prefix for generated account numbers (`ACC` gives `ACC-000123456`).
    #[serde(default = "default_account_prefix")]
    pub account_prefix: String,
    /// Opening balance when the caller does not supply one.
    #[serde(default = "default_initial_balance")]
    pub default_initial_balance: Decimal,
    /// How many fresh account numbers to try before giving up on a collision.
    #[serde(default = "default_max_account_number_attempts")]
    pub max_account_number_attempts: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            account_prefix: default_account_prefix(),
            default_initial_balance: default_initial_balance(),
            max_account_number_attempts: default_max_account_number_attempts(),
        }
    }
}

fn default_account_prefix() -> String {
    "ACC".to_string()
}

fn default_initial_balance() -> Decimal {
    Decimal::new(1000, 0)
}

fn default_max_account_number_attempts() -> u32 {
    5
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BURSAR").separator("__"))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would silently disable a safety bound.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` naming the offending setting.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        // Postgres reads a zero lock_timeout as "wait forever"
        if self.database.lock_timeout_ms == 0 {
            return Err(config::ConfigError::Message(
                "database.lock_timeout_ms must be at least 1".to_string(),
            ));
        }
        if self.ledger.max_account_number_attempts == 0 {
            return Err(config::ConfigError::Message(
                "ledger.max_account_number_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
