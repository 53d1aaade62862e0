use std::str::FromStr;

use axum::http::HeaderValue;
use collab_core::file_types::MAX_UPLOAD_BYTES;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Largest accepted multipart upload in bytes (default: 5 MiB).
    pub max_upload_bytes: usize,
    /// Enroll non-members who write files as editors (default: `true`).
    pub auto_enroll_editors: bool,
    /// PostgreSQL URL. Without it projects live in process memory.
    pub database_url: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `MAX_UPLOAD_BYTES`     | `5242880`                  |
    /// | `AUTO_ENROLL_EDITORS`  | `true`                     |
    /// | `DATABASE_URL`         | unset (in-memory store)    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_var("PORT", "3000", "u16")?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            if origin.parse::<HeaderValue>().is_err() {
                return Err(ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    expected: "origin",
                    value: origin.clone(),
                });
            }
        }

        let request_timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", "30", "u64")?;
        let max_upload_bytes =
            parse_var("MAX_UPLOAD_BYTES", &MAX_UPLOAD_BYTES.to_string(), "byte count")?;

        let auto_enroll_raw =
            std::env::var("AUTO_ENROLL_EDITORS").unwrap_or_else(|_| "true".into());
        let auto_enroll_editors =
            parse_bool(&auto_enroll_raw).ok_or_else(|| ConfigError::Invalid {
                var: "AUTO_ENROLL_EDITORS",
                expected: "boolean",
                value: auto_enroll_raw.clone(),
            })?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            auto_enroll_editors,
            database_url,
        })
    }
}

fn parse_var<T: FromStr>(
    var: &'static str,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value = std::env::var(var).unwrap_or_else(|_| default.to_string());
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        expected,
        value,
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
