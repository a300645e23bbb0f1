//! # Pageforge
//!
//! A generic pagination engine for PostgreSQL: declarative filters, free-text
//! search and sorting compiled into parameterized SELECT/COUNT queries, with
//! typed pages of results.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pageforge::prelude::*;
//!
//! #[derive(Debug, FromRow, Serialize)]
//! pub struct Hotel {
//!     pub id: i32,
//!     pub name: String,
//!     pub city: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let pageforge = PageForge::new(&config).await?;
//!
//!     let hotels = TableQuery::new("hotels")
//!         .columns("id, name, city")
//!         .searchable(["name", "city"])
//!         .filterable(FilterableColumns::new().column("city", "city"))
//!         .base_condition("entity_status_id = 1")
//!         .default_sort("id", SortOrder::Asc);
//!
//!     let request = PaginationRequest::new(1, 20)
//!         .with_search("grand")
//!         .with_filter("city__in", "Paris,Rome");
//!
//!     let page: PaginatedResult<Hotel> = pageforge
//!         .helper()
//!         .get_paginated_result(&request, &hotels, &CancellationToken::new())
//!         .await?;
//!
//!     println!("{} of {} hotels", page.items().len(), page.total_count());
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::PageForge;
pub use errors::PageForgeError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, PaginationConfig};

// Re-export the engine crate
pub use page_query;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
pub use tokio_util;
