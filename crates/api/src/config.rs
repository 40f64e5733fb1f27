use std::path::PathBuf;

use sanjesh_core::steps::DEFAULT_STEP_COUNT;

use crate::auth::jwt::JwtConfig;

/// Default request body limit for submissions with attachments (25 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Number of steps a progress-bar form is divided into (default: `3`).
    pub form_step_count: usize,
    /// Directory of the local attachment store.
    pub attachment_dir: PathBuf,
    /// Maximum request body size in bytes.
    pub max_upload_bytes: usize,
    /// JWT validation configuration.
    pub jwt: JwtConfig,
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
    /// | `FORM_STEP_COUNT`      | `3` (minimum `1`)          |
    /// | `ATTACHMENT_DIR`       | `storage/attachments`      |
    /// | `MAX_UPLOAD_BYTES`     | `26214400` (25 MiB)        |
    ///
    /// `JWT_SECRET` is read by [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let form_step_count: usize = std::env::var("FORM_STEP_COUNT")
            .unwrap_or_else(|_| DEFAULT_STEP_COUNT.to_string())
            .parse::<usize>()
            .expect("FORM_STEP_COUNT must be a valid usize")
            .max(1);

        let attachment_dir = std::env::var("ATTACHMENT_DIR")
            .unwrap_or_else(|_| "storage/attachments".into())
            .into();

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            form_step_count,
            attachment_dir,
            max_upload_bytes,
            jwt,
        }
    }
}
