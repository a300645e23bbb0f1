//! Page execution
//!
//! [`PageExecutor`] is the seam between SQL assembly and the database. The
//! PostgreSQL implementation runs the data and count statements inside one
//! read-only snapshot so the rows and the total agree.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use thiserror::Error;

use crate::query_builder::{bind_positional, ParameterBag, PlaceholderError, SqlValue};

/// Data and count statements for one page, sharing a parameter bag
#[derive(Debug, Clone, PartialEq)]
pub struct PageBatch {
    pub select_sql: String,
    pub count_sql: String,
    pub parameters: ParameterBag,
}

impl PageBatch {
    /// Both statements as one script, for diagnostics
    pub fn statement_text(&self) -> String {
        format!("{};\n{};", self.select_sql, self.count_sql)
    }
}

/// Rows of one page plus the total number of matching rows
#[derive(Debug, Clone, PartialEq)]
pub struct PageRows<T> {
    pub items: Vec<T>,
    pub total_count: i64,
}

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Placeholder(#[from] PlaceholderError),

    #[error("Executor error: {0}")]
    Other(String),
}

/// Runs a [`PageBatch`] and decodes its rows
#[async_trait]
pub trait PageExecutor<T: Send>: Send + Sync {
    async fn fetch_page(&self, batch: &PageBatch) -> Result<PageRows<T>, ExecutorError>;
}

// Shared parameter binding for data and count queries
macro_rules! bind_sql_value {
    ($query:expr, $value:expr) => {
        match $value {
            SqlValue::Null => $query.bind(Option::<String>::None),
            SqlValue::Bool(b) => $query.bind(b),
            SqlValue::Int(i) => {
                if i >= i32::MIN as i64 && i <= i32::MAX as i64 {
                    $query.bind(i as i32)
                } else {
                    $query.bind(i)
                }
            }
            SqlValue::Float(f) => $query.bind(f),
            SqlValue::Text(s) => $query.bind(s),
            SqlValue::Date(d) => $query.bind(d),
            SqlValue::Timestamp(t) => $query.bind(t),
        }
    };
}

/// [`PageExecutor`] backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgPageExecutor {
    pool: PgPool,
}

impl PgPageExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl<T> PageExecutor<T> for PgPageExecutor
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static,
{
    async fn fetch_page(&self, batch: &PageBatch) -> Result<PageRows<T>, ExecutorError> {
        let select = bind_positional(&batch.select_sql, &batch.parameters)?;
        let count = bind_positional(&batch.count_sql, &batch.parameters)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let mut select_query = sqlx::query_as::<_, T>(&select.sql);
        for value in select.values {
            select_query = bind_sql_value!(select_query, value);
        }
        let items = select_query.fetch_all(&mut *tx).await?;

        let mut count_query = sqlx::query_scalar::<_, i64>(&count.sql);
        for value in count.values {
            count_query = bind_sql_value!(count_query, value);
        }
        let total_count = count_query.fetch_one(&mut *tx).await?;

        tx.commit().await?;

        Ok(PageRows { items, total_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_text() {
        let batch = PageBatch {
            select_sql: "SELECT h.* FROM Hotels AS h ORDER BY 1".to_string(),
            count_sql: "SELECT COUNT(1) FROM Hotels AS h".to_string(),
            parameters: ParameterBag::new(),
        };

        assert_eq!(
            batch.statement_text(),
            "SELECT h.* FROM Hotels AS h ORDER BY 1;\nSELECT COUNT(1) FROM Hotels AS h;"
        );
    }

    #[test]
    fn test_placeholder_error_converts() {
        let err: ExecutorError = PlaceholderError::Unbound("Offset".to_string()).into();
        assert!(matches!(err, ExecutorError::Placeholder(_)));
        assert_eq!(err.to_string(), "Placeholder @Offset has no bound parameter");
    }
}
