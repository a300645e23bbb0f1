//! Page Query - Pagination engine for Pageforge
//!
//! This crate turns a declarative pagination request into a parameterized
//! SELECT/COUNT pair, executes it and returns a typed page with metadata.

pub mod errors;
pub mod executor;
pub mod helper;
pub mod prelude;
pub mod query_builder;
pub mod request;
pub mod result;
pub mod validation;

pub use errors::{ErrorContext, PaginationError, QueryBuildError};
pub use executor::{ExecutorError, PageBatch, PageExecutor, PageRows, PgPageExecutor};
pub use helper::{PaginationHelper, TableQuery};
pub use query_builder::{
    FilterColumn, FilterOperator, FilterableColumns, JoinType, ParameterBag, QueryBuilder, SortOrder,
    SqlValue, ValueType,
};
pub use request::{PaginationRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use result::PaginatedResult;
pub use validation::{ValidatedColumnRef, ValidatedTableName, ValidationError};

use sqlx::PgPool;

pub type DbPool = PgPool;
