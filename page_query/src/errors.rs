//! Error types for pagination
//!
//! Every pagination failure carries an [`ErrorContext`] naming the component,
//! the operation and the table involved, plus the details of its category.

use std::fmt;
use thiserror::Error;

/// Where a pagination error was raised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    pub component: &'static str,
    pub function: &'static str,
    pub table: String,
}

impl ErrorContext {
    pub fn new(component: &'static str, function: &'static str, table: impl Into<String>) -> Self {
        Self {
            component,
            function,
            table: table.into(),
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{} on '{}'", self.component, self.function, self.table)
    }
}

#[derive(Error, Debug)]
pub enum PaginationError {
    #[error("Invalid pagination parameter '{parameter}' ({context}): {message}")]
    InvalidParameters {
        context: ErrorContext,
        parameter: String,
        message: String,
    },

    #[error("Filter error for '{key}' with operator '{operator}' ({context}): {message}")]
    Filter {
        context: ErrorContext,
        key: String,
        value: String,
        operator: String,
        message: String,
    },

    #[error("Search error for term '{term}' ({context}): {message}")]
    Search {
        context: ErrorContext,
        term: String,
        columns: Vec<String>,
        message: String,
    },

    #[error("Sort error for column '{column}' ({context}): {message}")]
    Sort {
        context: ErrorContext,
        column: String,
        direction: String,
        message: String,
    },

    #[error("Database error ({context}): {message}")]
    Database {
        context: ErrorContext,
        message: String,
        /// Statement text, kept in debug builds only
        sql: Option<String>,
        #[source]
        source: Option<sqlx::Error>,
    },

    #[error("Pagination cancelled ({context})")]
    Cancelled { context: ErrorContext },

    #[error("Pagination error ({context}): {message}")]
    Unexpected {
        context: ErrorContext,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PaginationError {
    pub fn invalid_parameters(
        context: ErrorContext,
        parameter: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameters {
            context,
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Database failure; `sql` is attached only when built with debug assertions
    pub fn database(
        context: ErrorContext,
        message: impl Into<String>,
        sql: &str,
        source: Option<sqlx::Error>,
    ) -> Self {
        let sql = if cfg!(debug_assertions) {
            Some(sql.to_string())
        } else {
            None
        };
        Self::Database {
            context,
            message: message.into(),
            sql,
            source,
        }
    }

    pub fn unexpected<E>(context: ErrorContext, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unexpected {
            context,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Stable machine-readable code for the error category
    pub fn error_code(&self) -> &'static str {
        match self {
            PaginationError::InvalidParameters { .. } => "INVALID_PAGINATION_PARAMETERS",
            PaginationError::Filter { .. } => "FILTER_ERROR",
            PaginationError::Search { .. } => "SEARCH_ERROR",
            PaginationError::Sort { .. } => "SORT_ERROR",
            PaginationError::Database { .. } => "PAGINATION_DATABASE_ERROR",
            PaginationError::Cancelled { .. } => "PAGINATION_CANCELLED",
            PaginationError::Unexpected { .. } => "PAGINATION_ERROR",
        }
    }

    /// Whether the caller's input caused the failure
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PaginationError::InvalidParameters { .. }
                | PaginationError::Filter { .. }
                | PaginationError::Search { .. }
                | PaginationError::Sort { .. }
        )
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            PaginationError::InvalidParameters { context, .. }
            | PaginationError::Filter { context, .. }
            | PaginationError::Search { context, .. }
            | PaginationError::Sort { context, .. }
            | PaginationError::Database { context, .. }
            | PaginationError::Cancelled { context }
            | PaginationError::Unexpected { context, .. } => context,
        }
    }

    pub fn sql_statement(&self) -> Option<&str> {
        match self {
            PaginationError::Database { sql, .. } => sql.as_deref(),
            _ => None,
        }
    }
}

/// Errors raised while assembling a query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryBuildError {
    #[error("Table name cannot be empty")]
    EmptyTable,

    #[error("Join table cannot be empty")]
    EmptyJoinTable,

    #[error("Join alias for table '{table}' cannot be empty")]
    EmptyJoinAlias { table: String },

    #[error("Join condition for table '{table}' cannot be empty")]
    EmptyJoinCondition { table: String },
}
