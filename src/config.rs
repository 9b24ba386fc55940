//! Configuration module for DevEvent
//!
//! This module handles loading and validating configuration from environment
//! variables, providing strongly-typed configuration structures for the HTTP
//! server, the database connection and the local image store.

use envconfig::Envconfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure for DevEvent
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct Config {
    /// Server configuration
    #[serde(flatten)]
    #[envconfig(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(flatten)]
    #[envconfig(nested)]
    pub database: DatabaseConfig,

    /// Image upload configuration
    #[serde(flatten)]
    #[envconfig(nested)]
    pub upload: UploadConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct ServerConfig {
    /// Host to bind to
    #[envconfig(from = "HOST", default = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[envconfig(from = "PORT", default = "3000")]
    pub port: u16,

    /// Log level
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,

    /// Environment (development, staging, production); error details are
    /// only exposed in development
    #[envconfig(from = "ENVIRONMENT", default = "production")]
    pub environment: String,

    /// Request timeout in seconds
    #[envconfig(from = "REQUEST_TIMEOUT_SECS", default = "30")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Get the server address as a string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[envconfig(from = "DATABASE_URL")]
    pub url: String,

    /// Maximum pool size
    #[envconfig(from = "DATABASE_POOL_MAX_SIZE", default = "10")]
    pub pool_max_size: u32,

    /// Minimum idle connections
    #[envconfig(from = "DATABASE_POOL_MIN_IDLE", default = "1")]
    pub pool_min_idle: u32,

    /// Pool timeout in seconds
    #[envconfig(from = "DATABASE_POOL_TIMEOUT_SECONDS", default = "30")]
    pub pool_timeout_seconds: u64,

    /// Idle timeout in seconds
    #[envconfig(from = "DATABASE_POOL_IDLE_TIMEOUT_SECONDS", default = "600")]
    pub pool_idle_timeout_seconds: u64,

    /// Apply embedded migrations on first connect
    #[envconfig(from = "DATABASE_RUN_MIGRATIONS", default = "true")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Get pool timeout as Duration
    pub fn pool_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_timeout_seconds)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_seconds)
    }

    /// Mask password in URL for logging
    pub fn masked_url(&self) -> String {
        if let Some(at_pos) = self.url.rfind('@') {
            if let Some(scheme_end) = self.url.find("://") {
                if scheme_end < at_pos {
                    let start = &self.url[..scheme_end + 3];
                    let end = &self.url[at_pos..];
                    return format!("{}***{}", start, end);
                }
            }
        }
        "***".to_string()
    }
}

/// Local image store configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct UploadConfig {
    /// Directory uploaded images are written to
    #[envconfig(from = "UPLOAD_DIR", default = "./data/uploads")]
    pub dir: String,

    /// Public URL prefix the directory is served under
    #[envconfig(from = "UPLOAD_URL_PREFIX", default = "/uploads")]
    pub url_prefix: String,

    /// Largest accepted request body for event creation, in bytes
    #[envconfig(from = "UPLOAD_MAX_BYTES", default = "10485760")]
    pub max_bytes: usize,
}

impl UploadConfig {
    /// Upload directory as a path
    pub fn dir_path(&self) -> PathBuf {
        PathBuf::from(&self.dir)
    }

    /// URL prefix without a trailing slash
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.url_prefix.trim_end_matches('/');
        if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenv::dotenv().ok();

        Config::init_from_env().map_err(Error::from)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::config("Server port cannot be 0"));
        }

        if self.database.url.trim().is_empty() {
            return Err(Error::config("Database URL cannot be empty"));
        }

        if self.upload.max_bytes == 0 {
            return Err(Error::config("Upload size limit must be at least 1 byte"));
        }

        // Uploads are nested under their prefix; the root would shadow every route
        if self.upload.normalized_prefix() == "/" {
            return Err(Error::config(format!(
                "Upload URL prefix must name a path below the root, got {:?}",
                self.upload.url_prefix
            )));
        }

        Ok(())
    }

    /// Log configuration (with sensitive data masked)
    pub fn log_config(&self) {
        tracing::info!(
            server_address = %self.server.address(),
            environment = %self.server.environment,
            log_level = %self.server.log_level,
            "Server configuration"
        );

        tracing::info!(
            url = %self.database.masked_url(),
            pool_size = %self.database.pool_max_size,
            run_migrations = %self.database.run_migrations,
            "Database configuration"
        );

        tracing::info!(
            dir = %self.upload.dir,
            url_prefix = %self.upload.normalized_prefix(),
            max_bytes = %self.upload.max_bytes,
            "Upload configuration"
        );
    }
}
