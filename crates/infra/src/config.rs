//! Process configuration loaded from the environment (and `.env`).

use chrono::Duration;
use thiserror::Error;

use stockroom_observability::LogFormat;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: `{value}`")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key} must be set when {because} is set")]
    Missing { key: &'static str, because: &'static str },
}

/// Runtime configuration.
///
/// | Env var | Default |
/// |---|---|
/// | `BIND_ADDR` | `0.0.0.0:8080` |
/// | `JWT_SECRET` | insecure dev secret (warns); required with `DATABASE_URL` |
/// | `DATABASE_URL` | unset: in-memory storage |
/// | `TOKEN_TTL_MINUTES` | `60` |
/// | `LOG_FORMAT` | `json` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub token_ttl: Duration,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let database_url = get("DATABASE_URL");

        let jwt_secret = match (get("JWT_SECRET"), &database_url) {
            (Some(secret), _) => secret,
            (None, None) => DEV_JWT_SECRET.to_string(),
            (None, Some(_)) => {
                return Err(ConfigError::Missing {
                    key: "JWT_SECRET",
                    because: "DATABASE_URL",
                });
            }
        };

        let token_ttl = match get("TOKEN_TTL_MINUTES") {
            None => Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            Some(raw) => match raw.parse::<i64>() {
                Ok(minutes) if minutes > 0 => Duration::minutes(minutes),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "TOKEN_TTL_MINUTES",
                        value: raw,
                    });
                }
            },
        };

        let log_format = match get("LOG_FORMAT") {
            None => LogFormat::default(),
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "LOG_FORMAT",
                value: raw,
            })?,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            database_url,
            token_ttl,
            log_format,
        })
    }

    /// True when no `JWT_SECRET` was provided.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// In-memory storage, ephemeral settings. Used by tests and local runs.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: jwt_secret.into(),
            database_url: None,
            token_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            log_format: LogFormat::Pretty,
        }
    }
}
