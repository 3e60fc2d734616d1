//! Application configuration loaded from environment variables.
//!
//! `.env` loading happens in `main` via `dotenvy` before this runs, so the
//! variables can come from a local file or the real environment. The webhook
//! secret is required: without it no payment event can be trusted.

use crate::errors::{Error, Result};

/// Runtime configuration for the server process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SeaORM connection URL (e.g. `sqlite://data/problem2profit.sqlite`)
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// Shared secret for verifying payment webhook signatures
    pub webhook_secret: String,
}

impl AppConfig {
    /// Read configuration from the environment, applying defaults where a
    /// value is optional.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when `PAYMENT_WEBHOOK_SECRET` is missing or
    /// `API_PORT` is not a valid port number.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://data/problem2profit.sqlite?mode=rwc".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| Error::Config {
                    message: "Invalid API_PORT".to_string(),
                })?,
            webhook_secret: std::env::var("PAYMENT_WEBHOOK_SECRET").map_err(|_| Error::Config {
                message: "PAYMENT_WEBHOOK_SECRET environment variable is required".to_string(),
            })?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var driven construction is covered indirectly; mutating process
    // environment in parallel tests is racy, so only the parse paths that
    // don't touch the environment are exercised here.
    #[test]
    fn test_config_is_cloneable_and_debuggable() {
        let config = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            api_port: 3001,
            webhook_secret: "s3cret".to_string(),
        };
        let copy = config.clone();
        assert_eq!(copy.api_port, 3001);
        assert!(format!("{copy:?}").contains("3001"));
    }
}
