//! API configuration

use std::time::Duration;

use infra_db::DatabaseConfig;
use serde::Deserialize;

/// API configuration
///
/// Read from `API_*` environment variables; every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Largest number of pooled database connections
    pub db_max_connections: u32,
    /// Seconds a request waits for a pooled connection
    pub db_connect_timeout_secs: u64,
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub access_token_ttl_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_secs: u64,
    /// Supabase project URL; empty keeps images in memory
    pub storage_url: String,
    /// Supabase service key
    pub storage_key: String,
    /// Bucket claim images are written to
    pub storage_bucket: String,
    /// Comma separated allowed origins, `*` for any
    pub cors_origins: String,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
    /// Log level
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5328,
            database_url: "postgres://localhost/claims".to_string(),
            db_max_connections: 10,
            db_connect_timeout_secs: 10,
            jwt_secret: "change-me-in-production".to_string(),
            access_token_ttl_secs: 15 * 60,
            refresh_token_ttl_secs: 30 * 24 * 60 * 60,
            storage_url: String::new(),
            storage_key: String::new(),
            storage_bucket: "images".to_string(),
            cors_origins: "http://localhost:3000".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    ///
    /// `API_DATABASE_URL` wins over a plain `DATABASE_URL`.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_default("database_url", url)?;
        }

        builder
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Pool settings for the configured database
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone())
            .max_connections(self.db_max_connections)
            .connect_timeout(Duration::from_secs(self.db_connect_timeout_secs))
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parsed CORS origins; `None` means any origin
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.iter().any(|o| o == "*") {
            None
        } else {
            Some(origins)
        }
    }

    /// True when uploads should go to Supabase rather than memory
    pub fn uses_remote_storage(&self) -> bool {
        !self.storage_url.trim().is_empty()
    }
}
