//! Core Pageforge functionality
//!
//! This module contains the main PageForge struct, which owns the database
//! pool and a pagination helper configured from [`AppConfig`].

use sqlx::PgPool;
use std::time::Duration;

use crate::errors::PageForgeError;
use config::{AppConfig, DatabaseConfig};
use page_query::{PaginationHelper, PgPageExecutor};

/// Main PageForge coordinator that manages the database connection and paging
pub struct PageForge {
    pool: PgPool,
    helper: PaginationHelper<PgPageExecutor>,
}

impl PageForge {
    /// Create new PageForge with database connection
    pub async fn new(config: &AppConfig) -> Result<Self, PageForgeError> {
        config.validate()?;

        let pool = Self::connect(&config.database).await?;
        let helper = PaginationHelper::for_pool(pool.clone())
            .with_query_timeout(config.pagination.query_timeout());

        crate::debug_log!(
            host = %config.database.host,
            database = %config.database.database,
            query_timeout = ?config.pagination.query_timeout(),
            "PageForge connected"
        );

        Ok(Self { pool, helper })
    }

    /// Load configuration with [`AppConfig::load`] and connect
    pub async fn from_env() -> Result<Self, PageForgeError> {
        let config = AppConfig::load()?;
        Self::new(&config).await
    }

    /// Wrap an existing pool, without a query timeout
    pub fn from_pool(pool: PgPool) -> Self {
        let helper = PaginationHelper::for_pool(pool.clone());
        Self { pool, helper }
    }

    async fn connect(config: &DatabaseConfig) -> Result<PgPool, PageForgeError> {
        let connection_string = config.connection_string();

        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        Ok(pool_options.connect(&connection_string).await?)
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the pagination helper bound to this pool
    pub fn helper(&self) -> &PaginationHelper<PgPageExecutor> {
        &self.helper
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), PageForgeError> {
        crate::trace_log!("Running health check");
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
