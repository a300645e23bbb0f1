//! Convenience re-exports for common Pageforge usage
//!
//! # Example
//!
//! ```rust
//! use pageforge::prelude::*;
//!
//! let request = PaginationRequest::new(1, 20).with_search("grand");
//! assert!(request.has_search());
//! ```

// Core Pageforge components
pub use crate::core::PageForge;
pub use crate::errors::PageForgeError;

// Centralized config
pub use config::{AppConfig, DatabaseConfig, PaginationConfig};

// Pagination engine
pub use page_query::prelude::*;

// Common external dependencies
pub use sqlx;
pub use tokio;
