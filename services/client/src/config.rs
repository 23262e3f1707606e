//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// The scheme put in front of the token in the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Token,
    Bearer,
}

impl AuthScheme {
    pub fn header_value(self, token: &str) -> String {
        match self {
            AuthScheme::Token => format!("Token {}", token),
            AuthScheme::Bearer => format!("Bearer {}", token),
        }
    }
}

impl FromStr for AuthScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "token" => Ok(AuthScheme::Token),
            "bearer" => Ok(AuthScheme::Bearer),
            other => Err(format!("'{}' is not Token or Bearer", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base of every endpoint path, without a trailing slash.
    pub api_base_url: String,
    pub session_path: PathBuf,
    pub auth_scheme: AuthScheme,
    /// `None` leaves the transport's default in place.
    pub http_timeout: Option<Duration>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("TREK_API_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("TREK_API_BASE_URL".to_string()))?;
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "TREK_API_BASE_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_base_url),
            ));
        }
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let session_path = lookup("TREK_SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_session_path);

        let auth_scheme = match lookup("TREK_AUTH_SCHEME") {
            Some(raw) => raw
                .parse::<AuthScheme>()
                .map_err(|e| ConfigError::InvalidValue("TREK_AUTH_SCHEME".to_string(), e))?,
            None => AuthScheme::Token,
        };

        let http_timeout = match lookup("TREK_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidValue("TREK_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_base_url,
            session_path,
            auth_scheme,
            http_timeout,
            log_level,
        })
    }
}

fn default_session_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("trek").join("session.json"))
        .unwrap_or_else(|| PathBuf::from("./session.json"))
}
