//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ORDERVIEW_DATABASE_URL` - `PostgreSQL` connection string (falls
//!   back to the generic `DATABASE_URL`)
//!
//! ## Optional
//! - `ORDERVIEW_HOST` - Bind address (default: 127.0.0.1)
//! - `ORDERVIEW_PORT` - Listen port (default: 3000)
//! - `ORDERVIEW_INGEST_BUFFER` - Ingestion channel capacity in messages
//!   (default: 1024)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Orderview server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Capacity of the ingestion message channel
    pub ingest_buffer: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or
    /// invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ORDERVIEW_DATABASE_URL")?;
        let host = get_env_or_default("ORDERVIEW_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ORDERVIEW_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("ORDERVIEW_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ORDERVIEW_PORT".to_owned(), e.to_string()))?;
        let ingest_buffer = get_env_or_default("ORDERVIEW_INGEST_BUFFER", "1024")
            .parse::<usize>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ORDERVIEW_INGEST_BUFFER".to_owned(), e.to_string())
            })?;

        Ok(Self {
            database_url,
            host,
            port,
            ingest_buffer,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::testutil::test_config;

    #[test]
    fn socket_addr_combines_host_and_port() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn debug_does_not_leak_the_database_url() {
        let config = test_config();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("orderview_test"));
    }
}
