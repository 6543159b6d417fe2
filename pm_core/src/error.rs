/// Core error type for promysql
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Database("connection refused".to_string());
        assert_eq!(err.to_string(), "Database error: connection refused");

        let err = Error::Metrics("duplicate metric name: mysql_throughput".to_string());
        assert!(err.to_string().starts_with("Metrics error:"));
    }

    #[test]
    fn test_every_variant_is_reported_by_category() {
        let category = |err: &Error| match err {
            Error::Config(_) => "config",
            Error::Database(_) => "database",
            Error::Metrics(_) => "metrics",
            Error::Server(_) => "server",
        };

        assert_eq!(category(&Error::Server("bind".to_string())), "server");
        assert_eq!(category(&Error::Metrics("dup".to_string())), "metrics");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: Error = config::ConfigError::Message("bad key".to_string()).into();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("bad key")));
    }
}
