//! ABOUTME: Configuration loading from environment variables with defaults
//! ABOUTME: Resolves database connection and load loop settings

use config::Config as ConfigBuilder;
use pm_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_DB_HOST: &str = "127.0.0.1";
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_DB_USERNAME: &str = "username";
pub const DEFAULT_DB_PASSWORD: &str = "password";
pub const DEFAULT_DB_NAME: &str = "test_db";
pub const DEFAULT_SLEEP_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8080";

/// How an environment value is parsed before it overrides a default
#[derive(Debug, Clone, Copy)]
enum ValueKind {
    Text,
    Port,
    Millis,
}

/// Environment variable name, config key, and value kind
const ENV_BINDINGS: &[(&str, &str, ValueKind)] = &[
    ("MYSQL_HOST", "database.host", ValueKind::Text),
    ("MYSQL_PORT", "database.port", ValueKind::Port),
    ("MYSQL_USERNAME", "database.username", ValueKind::Text),
    ("MYSQL_PASSWORD", "database.password", ValueKind::Text),
    ("MYSQL_DB_NAME", "database.name", ValueKind::Text),
    ("SLEEP_INTERVAL_MILLISECOND", "load.sleep_interval_ms", ValueKind::Millis),
];

/// Main configuration struct
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub load: LoadConfig,
    pub server: ServerConfig,
}

/// MySQL connection settings with password redaction
#[derive(Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            username: DEFAULT_DB_USERNAME.to_string(),
            password: DEFAULT_DB_PASSWORD.to_string(),
            name: DEFAULT_DB_NAME.to_string(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

/// Load loop settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoadConfig {
    /// Pause between iterations in milliseconds
    pub sleep_interval_ms: u64,
}

impl LoadConfig {
    pub fn sleep_interval(&self) -> Duration {
        Duration::from_millis(self.sleep_interval_ms)
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            sleep_interval_ms: DEFAULT_SLEEP_INTERVAL_MS,
        }
    }
}

/// Metrics server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Bind address for the metrics endpoint; not read from the environment
    pub metrics_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            metrics_addr: DEFAULT_METRICS_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Build configuration from an explicit variable map
    ///
    /// Missing variables keep their defaults. Numeric variables that do not
    /// parse are logged and ignored rather than rejected.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder()
            .set_default("database.host", DEFAULT_DB_HOST)?
            .set_default("database.port", i64::from(DEFAULT_DB_PORT))?
            .set_default("database.username", DEFAULT_DB_USERNAME)?
            .set_default("database.password", DEFAULT_DB_PASSWORD)?
            .set_default("database.name", DEFAULT_DB_NAME)?
            .set_default("load.sleep_interval_ms", DEFAULT_SLEEP_INTERVAL_MS as i64)?
            .set_default("server.metrics_addr", DEFAULT_METRICS_ADDR)?;

        for &(var, key, kind) in ENV_BINDINGS {
            let Some(raw) = vars.get(var) else {
                continue;
            };

            builder = match kind {
                ValueKind::Text => builder.set_override(key, raw.as_str())?,
                ValueKind::Port => match raw.trim().parse::<u16>() {
                    Ok(port) => builder.set_override(key, i64::from(port))?,
                    Err(e) => {
                        tracing::warn!(var, value = %raw, error = %e, "Ignoring unparsable port, using default");
                        builder
                    }
                },
                ValueKind::Millis => match raw.trim().parse::<u64>().map(i64::try_from) {
                    Ok(Ok(ms)) => builder.set_override(key, ms)?,
                    _ => {
                        tracing::warn!(var, value = %raw, "Ignoring unparsable interval, using default");
                        builder
                    }
                },
            };
        }

        let config = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build config: {}", e)))?;

        config
            .try_deserialize()
            .map_err(|e| Error::Config(format!("Failed to deserialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Use a mutex to serialize tests that modify environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn env_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_vars(&HashMap::new()).expect("Should load with defaults");

        assert_eq!(config.database.host, "127.0.0.1");
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.username, "username");
        assert_eq!(config.database.password, "password");
        assert_eq!(config.database.name, "test_db");
        assert_eq!(config.load.sleep_interval_ms, 1000);
        assert_eq!(config.load.sleep_interval(), Duration::from_secs(1));
        assert_eq!(config.server.metrics_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_config_from_vars() {
        let vars = env_map(&[
            ("MYSQL_HOST", "db.internal"),
            ("MYSQL_PORT", "3307"),
            ("MYSQL_USERNAME", "loader"),
            ("MYSQL_PASSWORD", "s3cret"),
            ("MYSQL_DB_NAME", "load_db"),
            ("SLEEP_INTERVAL_MILLISECOND", "250"),
        ]);

        let config = Config::from_vars(&vars).expect("Should load from vars");

        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 3307);
        assert_eq!(config.database.username, "loader");
        assert_eq!(config.database.password, "s3cret");
        assert_eq!(config.database.name, "load_db");
        assert_eq!(config.load.sleep_interval_ms, 250);
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let vars = env_map(&[
            ("MYSQL_PORT", "not-a-port"),
            ("SLEEP_INTERVAL_MILLISECOND", "soon"),
        ]);

        let config = Config::from_vars(&vars).expect("Invalid numbers must not fail loading");

        assert_eq!(config.database.port, DEFAULT_DB_PORT);
        assert_eq!(config.load.sleep_interval_ms, DEFAULT_SLEEP_INTERVAL_MS);
    }

    #[test]
    fn test_out_of_range_numbers_fall_back_to_defaults() {
        let vars = env_map(&[
            ("MYSQL_PORT", "70000"),
            ("SLEEP_INTERVAL_MILLISECOND", "-5"),
        ]);

        let config = Config::from_vars(&vars).expect("Should load");

        assert_eq!(config.database.port, DEFAULT_DB_PORT);
        assert_eq!(config.load.sleep_interval_ms, DEFAULT_SLEEP_INTERVAL_MS);
    }

    #[test]
    fn test_numbers_with_whitespace_are_accepted() {
        let vars = env_map(&[("MYSQL_PORT", " 3310 "), ("SLEEP_INTERVAL_MILLISECOND", "5\n")]);

        let config = Config::from_vars(&vars).expect("Should load");

        assert_eq!(config.database.port, 3310);
        assert_eq!(config.load.sleep_interval_ms, 5);
    }

    #[test]
    fn test_unrelated_vars_are_ignored() {
        let vars = env_map(&[("MYSQL_DATABASE", "other"), ("PORT", "1")]);

        let config = Config::from_vars(&vars).expect("Should load");

        assert_eq!(config.database.name, DEFAULT_DB_NAME);
        assert_eq!(config.database.port, DEFAULT_DB_PORT);
    }

    #[test]
    fn test_load_reads_process_environment() {
        let _lock = ENV_MUTEX.lock().unwrap();

        let original = env::var("MYSQL_DB_NAME").ok();
        env::set_var("MYSQL_DB_NAME", "env_db");

        let config = Config::load().expect("Should load from env");
        assert_eq!(config.database.name, "env_db");

        match original {
            Some(val) => env::set_var("MYSQL_DB_NAME", val),
            None => env::remove_var("MYSQL_DB_NAME"),
        }
    }

    #[test]
    fn test_password_redaction() {
        let vars = env_map(&[("MYSQL_PASSWORD", "hunter2-do-not-log")]);
        let config = Config::from_vars(&vars).expect("Should load");
        let debug_output = format!("{:?}", config);

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2-do-not-log"));
    }
}
