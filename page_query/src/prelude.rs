//! Convenience re-exports for common page-query usage

// Request and result
pub use crate::request::PaginationRequest;
pub use crate::result::PaginatedResult;

// Query building
pub use crate::query_builder::{FilterableColumns, QueryBuilder, SortOrder, ValueType};

// Orchestration and execution
pub use crate::executor::{PageExecutor, PgPageExecutor};
pub use crate::helper::{PaginationHelper, TableQuery};

// Error types
pub use crate::errors::PaginationError;

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use sqlx::{FromRow, PgPool};
pub use tokio_util::sync::CancellationToken;
