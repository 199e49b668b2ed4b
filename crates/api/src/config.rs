use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Error raised when an environment variable is missing or unparsable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
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
    pub jwt: JwtConfig,
    /// JSON data file (default: `data/db.json`).
    pub data_path: PathBuf,
    /// Where uploaded files are written (default: `uploads`).
    pub upload_dir: PathBuf,
    /// Static front-end served for non-API paths (default: `public`).
    pub public_dir: PathBuf,
    /// Request body limit in megabytes (default: `50`).
    pub max_upload_mb: usize,
    /// Free trial length stamped on new brand accounts (default: `14`).
    pub trial_days: i64,
    /// Flat monthly plan price used by the revenue estimate (default: `200`).
    pub plan_monthly_price_usd: u64,
    /// Front-end base URL used in emailed links (default: `http://localhost:5173`).
    pub frontend_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `HOST`                   | `0.0.0.0`               |
    /// | `PORT`                   | `3000`                  |
    /// | `CORS_ORIGINS`           | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                    |
    /// | `DATA_PATH`              | `data/db.json`          |
    /// | `UPLOAD_DIR`             | `uploads`               |
    /// | `PUBLIC_DIR`             | `public`                |
    /// | `MAX_UPLOAD_MB`          | `50`                    |
    /// | `TRIAL_DAYS`             | `14`                    |
    /// | `PLAN_MONTHLY_PRICE_USD` | `200`                   |
    /// | `FRONTEND_URL`           | `http://localhost:5173` |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000)?,
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30)?,
            jwt: JwtConfig::from_env()?,
            data_path: env_or("DATA_PATH", PathBuf::from("data/db.json"))?,
            upload_dir: env_or("UPLOAD_DIR", PathBuf::from("uploads"))?,
            public_dir: env_or("PUBLIC_DIR", PathBuf::from("public"))?,
            max_upload_mb: env_or("MAX_UPLOAD_MB", 50)?,
            trial_days: env_or("TRIAL_DAYS", 14)?,
            plan_monthly_price_usd: env_or("PLAN_MONTHLY_PRICE_USD", 200)?,
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        })
    }
}

/// Read and parse `name`, falling back to `default` when it is unset.
pub(crate) fn env_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
