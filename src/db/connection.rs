//! Database connection management for DevEvent
//!
//! The connection pool is opened lazily on first use and then shared by every
//! repository for the lifetime of the process. Concurrent first callers wait
//! on the same connection attempt; a failed attempt leaves nothing cached, so
//! the next call tries again.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::logging::Timer;

/// Type alias for the database connection pool
pub type DbPool = PgPool;

/// Production connection manager
pub type Database = ConnectionManager<PgConnector>;

/// Something that can open a connection handle
#[async_trait]
pub trait Connector: Send + Sync {
    /// Cheap-to-clone handle shared by all callers
    type Handle: Clone + Send + Sync + 'static;

    /// Open a new connection
    async fn connect(&self) -> Result<Self::Handle>;
}

/// Init-once, memoized connection handle
pub struct ConnectionManager<C: Connector> {
    connector: C,
    handle: OnceCell<C::Handle>,
}

impl<C: Connector> ConnectionManager<C> {
    /// Create a manager; nothing is opened until [`Self::ensure_connection`]
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            handle: OnceCell::new(),
        }
    }

    /// Return the shared handle, opening it on first use.
    ///
    /// Safe to call concurrently: callers that arrive while a connection
    /// attempt is in flight wait for it instead of opening their own. If the
    /// attempt fails the error is returned and nothing is cached.
    pub async fn ensure_connection(&self) -> Result<C::Handle> {
        if let Some(handle) = self.handle.get() {
            return Ok(handle.clone());
        }

        let handle = self
            .handle
            .get_or_try_init(|| async {
                let timer = Timer::start("database_connect");
                match self.connector.connect().await {
                    Ok(handle) => {
                        let elapsed = timer.finish();
                        tracing::info!(
                            duration_ms = elapsed.as_millis() as u64,
                            "Database connection established"
                        );
                        Ok(handle)
                    },
                    Err(e) => {
                        crate::log_error!(e, "Database connection failed");
                        Err(e)
                    },
                }
            })
            .await?;

        Ok(handle.clone())
    }

    /// Whether a connection has been established
    pub fn is_connected(&self) -> bool {
        self.handle.initialized()
    }
}

impl Database {
    /// Manager for the configured PostgreSQL database
    pub fn from_config(config: DatabaseConfig) -> Self {
        Self::new(PgConnector::new(config))
    }
}

/// Opens the PostgreSQL pool and applies the schema migrations
pub struct PgConnector {
    config: DatabaseConfig,
}

impl PgConnector {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Handle = DbPool;

    async fn connect(&self) -> Result<DbPool> {
        let pool = create_pool(&self.config).await?;

        if self.config.run_migrations {
            super::run_migrations(&pool)
                .await
                .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;
            tracing::info!("Database migrations applied");
        }

        Ok(pool)
    }
}

/// Create a new database connection pool
///
/// # Arguments
/// * `config` - Database configuration
///
/// # Returns
/// A configured connection pool ready for use
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let connect_options = PgConnectOptions::from_str(&config.url)
        .map_err(|e| Error::config(format!("Invalid database URL: {}", e)))?
        .application_name("devevent")
        .log_statements(tracing::log::LevelFilter::Debug)
        .statement_cache_capacity(100);

    let pool = PgPoolOptions::new()
        .max_connections(config.pool_max_size)
        .min_connections(config.pool_min_idle)
        .acquire_timeout(config.pool_timeout())
        .idle_timeout(Some(config.idle_timeout()))
        .test_before_acquire(true)
        .max_lifetime(Some(Duration::from_secs(3600))) // 1 hour
        .connect_with(connect_options)
        .await
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    // Verify connectivity
    sqlx::query("SELECT 1")
        .fetch_one(&pool)
        .await
        .map_err(|e| Error::database(format!("Failed to verify database connection: {}", e)))?;

    tracing::info!(
        max_connections = config.pool_max_size,
        min_idle = config.pool_min_idle,
        url = %config.masked_url(),
        "Database connection pool created"
    );

    Ok(pool)
}
