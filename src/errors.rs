//! Error types for the Pageforge crate
//!
//! This module contains the errors returned while setting up Pageforge.
//! Pagination failures use [`page_query::PaginationError`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageForgeError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
