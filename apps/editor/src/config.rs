use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub document_service_url: String,
    pub document_service_timeout: Duration,
    /// Container width to assume before the first viewport report.
    pub initial_container_width: Option<f64>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs = std::env::var("DOCUMENT_SERVICE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .context("DOCUMENT_SERVICE_TIMEOUT_SECS must be a whole number of seconds")?;

        let initial_container_width = match std::env::var("INITIAL_CONTAINER_WIDTH") {
            Ok(raw) => Some(
                raw.parse::<f64>()
                    .context("INITIAL_CONTAINER_WIDTH must be a number")?,
            ),
            Err(_) => None,
        };

        Ok(Config {
            document_service_url: require_env("DOCUMENT_SERVICE_URL")?,
            document_service_timeout: Duration::from_secs(timeout_secs),
            initial_container_width,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
