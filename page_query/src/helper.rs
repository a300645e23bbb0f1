//! Pagination orchestration
//!
//! [`PaginationHelper`] layers search, filters, sorting and the paging window
//! onto a [`QueryBuilder`], runs the resulting statements through a
//! [`PageExecutor`] and wraps the rows into a [`PaginatedResult`].

use std::future::Future;
use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::errors::{ErrorContext, PaginationError};
use crate::executor::{ExecutorError, PageBatch, PageExecutor, PageRows, PgPageExecutor};
use crate::query_builder::filter::split_filter_key;
use crate::query_builder::sql_generation::SqlGenerator;
use crate::query_builder::{FilterResolver, FilterableColumns, QueryBuilder, SortOrder};
use crate::request::PaginationRequest;
use crate::result::PaginatedResult;
use crate::validation::{ValidatedColumnRef, ValidatedTableName};

const COMPONENT: &str = "PaginationHelper";

/// Parameter holding the number of skipped rows
pub const OFFSET_PARAMETER: &str = "Offset";
/// Parameter holding the page size
pub const PAGE_SIZE_PARAMETER: &str = "PageSize";

/// Metadata for paging over a single table
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    table: String,
    columns: Option<String>,
    searchable: Vec<String>,
    filterable: Option<FilterableColumns>,
    base_condition: Option<String>,
    default_sort: Option<(String, SortOrder)>,
}

impl TableQuery {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.trim().to_string(),
            columns: None,
            searchable: Vec::new(),
            filterable: None,
            base_condition: None,
            default_sort: None,
        }
    }

    /// Projection list such as `Id, Name, City`; defaults to every column
    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    pub fn searchable<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn filterable(mut self, columns: FilterableColumns) -> Self {
        self.filterable = Some(columns);
        self
    }

    /// Condition applied to every page, e.g. `EntityStatusId = 1`
    pub fn base_condition(mut self, condition: &str) -> Self {
        self.base_condition = Some(condition.to_string());
        self
    }

    /// Ordering used when the request does not ask for one
    pub fn default_sort(mut self, column: &str, order: SortOrder) -> Self {
        self.default_sort = Some((column.to_string(), order));
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

/// Runs paginated queries through a [`PageExecutor`]
#[derive(Debug, Clone)]
pub struct PaginationHelper<E> {
    executor: E,
    query_timeout: Option<Duration>,
}

impl PaginationHelper<PgPageExecutor> {
    pub fn for_pool(pool: PgPool) -> Self {
        Self::new(PgPageExecutor::new(pool))
    }
}

impl<E> PaginationHelper<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            query_timeout: None,
        }
    }

    /// Abort executions running longer than `timeout`; `None` waits forever
    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout
    }

    /// Page over one table described by `query`
    pub async fn get_paginated_result<T>(
        &self,
        request: &PaginationRequest,
        query: &TableQuery,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResult<T>, PaginationError>
    where
        E: PageExecutor<T>,
        T: Send,
    {
        let context = ErrorContext::new(COMPONENT, "get_paginated_result", query.table());
        self.run_table_query(&context, request, query, cancel)
            .await
            .inspect_err(log_failure)
    }

    /// Page over a caller-built query, typically one with joins
    ///
    /// The builder keeps its joins, base conditions and ordering; request
    /// search, filters and sorting are layered on top.
    pub async fn get_paginated_data_with_joins<T>(
        &self,
        request: &PaginationRequest,
        builder: QueryBuilder,
        main_table: &str,
        filterable: Option<&FilterableColumns>,
        searchable: &[&str],
        cancel: &CancellationToken,
    ) -> Result<PaginatedResult<T>, PaginationError>
    where
        E: PageExecutor<T>,
        T: Send,
    {
        let context = ErrorContext::new(COMPONENT, "get_paginated_data_with_joins", main_table);
        self.run_join_query(&context, request, builder, main_table, filterable, searchable, cancel)
            .await
            .inspect_err(log_failure)
    }

    async fn run_table_query<T>(
        &self,
        context: &ErrorContext,
        request: &PaginationRequest,
        query: &TableQuery,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResult<T>, PaginationError>
    where
        E: PageExecutor<T>,
        T: Send,
    {
        validate_table(context, "table_name", query.table())?;

        // Schema-qualified tables are aliased by their bare name
        let alias = query.table().rsplit('.').next().unwrap_or_default();
        let mut builder = QueryBuilder::new(query.table(), alias)
            .map_err(|e| PaginationError::invalid_parameters(context.clone(), "table_name", e.to_string()))?;
        if let Some(columns) = query.columns.as_deref() {
            builder = builder.select(columns);
        }
        if let Some(condition) = query.base_condition.as_deref() {
            builder = builder.where_clause(condition);
        }

        apply_search(context, request, &mut builder, &query.searchable)?;
        apply_filters(context, request, &mut builder, query.filterable.as_ref())?;

        if !apply_request_sort(context, request, &mut builder)? {
            if let Some((column, order)) = &query.default_sort {
                let column = validate_sort_column(context, column, order.to_sql())?;
                builder.set_ordering([column], *order);
            }
        }

        self.execute(context, request, builder, cancel).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_join_query<T>(
        &self,
        context: &ErrorContext,
        request: &PaginationRequest,
        mut builder: QueryBuilder,
        main_table: &str,
        filterable: Option<&FilterableColumns>,
        searchable: &[&str],
        cancel: &CancellationToken,
    ) -> Result<PaginatedResult<T>, PaginationError>
    where
        E: PageExecutor<T>,
        T: Send,
    {
        validate_table(context, "main_table", main_table)?;

        apply_search(context, request, &mut builder, searchable)?;
        apply_filters(context, request, &mut builder, filterable)?;
        apply_request_sort(context, request, &mut builder)?;

        self.execute(context, request, builder, cancel).await
    }

    async fn execute<T>(
        &self,
        context: &ErrorContext,
        request: &PaginationRequest,
        mut builder: QueryBuilder,
        cancel: &CancellationToken,
    ) -> Result<PaginatedResult<T>, PaginationError>
    where
        E: PageExecutor<T>,
        T: Send,
    {
        let offset = i64::try_from(request.skip()).map_err(|_| {
            PaginationError::invalid_parameters(context.clone(), "page", "Page offset is out of range")
        })?;
        builder.bind(OFFSET_PARAMETER, offset);
        builder.bind(PAGE_SIZE_PARAMETER, request.page_size());

        let batch = PageBatch {
            select_sql: SqlGenerator::build_page_window(
                &builder.build_select_query(),
                OFFSET_PARAMETER,
                PAGE_SIZE_PARAMETER,
            ),
            count_sql: builder.build_count_query(),
            parameters: builder.into_parameters(),
        };

        #[cfg(feature = "debug-logging")]
        debug!(table = %context.table, sql = %batch.statement_text(), "Executing page query");

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(PaginationError::Cancelled { context: context.clone() });
            }
            fetched = with_timeout(self.query_timeout, self.executor.fetch_page(&batch)) => fetched,
        };

        let rows = match fetched {
            Some(Ok(rows)) => rows,
            Some(Err(e)) => return Err(map_executor_error(context, &batch, e)),
            None => {
                let seconds = self.query_timeout.map(|t| t.as_secs_f64()).unwrap_or_default();
                return Err(PaginationError::database(
                    context.clone(),
                    format!("Query timed out after {:.1}s", seconds),
                    &batch.statement_text(),
                    None,
                ));
            }
        };

        let PageRows { items, total_count } = rows;
        let total_count = u64::try_from(total_count).unwrap_or(0);

        if items.len() > request.page_size() as usize {
            return Err(PaginationError::Unexpected {
                context: context.clone(),
                message: format!(
                    "Executor returned {} rows for a page of {}",
                    items.len(),
                    request.page_size()
                ),
                source: None,
            });
        }

        debug!(
            table = %context.table,
            page = request.page(),
            page_size = request.page_size(),
            items = items.len(),
            total_count,
            "Fetched page"
        );

        Ok(PaginatedResult::new(
            items,
            total_count,
            request.page(),
            request.page_size(),
        ))
    }
}

async fn with_timeout<F: Future>(limit: Option<Duration>, future: F) -> Option<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, future).await.ok(),
        None => Some(future.await),
    }
}

fn validate_table(context: &ErrorContext, parameter: &str, table: &str) -> Result<(), PaginationError> {
    if table.trim().is_empty() {
        return Err(PaginationError::invalid_parameters(
            context.clone(),
            parameter,
            "Table name is required",
        ));
    }
    ValidatedTableName::new(table)
        .map(|_| ())
        .map_err(|e| PaginationError::invalid_parameters(context.clone(), parameter, e.to_string()))
}

fn apply_search<S: AsRef<str>>(
    context: &ErrorContext,
    request: &PaginationRequest,
    builder: &mut QueryBuilder,
    searchable: &[S],
) -> Result<(), PaginationError> {
    let Some(term) = request.search_term() else {
        return Ok(());
    };
    if searchable.is_empty() {
        return Ok(());
    }

    for column in searchable {
        if let Err(e) = ValidatedColumnRef::new(column.as_ref()) {
            return Err(PaginationError::Search {
                context: context.clone(),
                term: term.to_string(),
                columns: searchable.iter().map(|c| c.as_ref().to_string()).collect(),
                message: format!("Error applying search criteria: {}", e),
            });
        }
    }

    builder.apply_search(term, searchable.iter().map(AsRef::as_ref));
    Ok(())
}

fn apply_filters(
    context: &ErrorContext,
    request: &PaginationRequest,
    builder: &mut QueryBuilder,
    filterable: Option<&FilterableColumns>,
) -> Result<(), PaginationError> {
    let Some(columns) = filterable else {
        return Ok(());
    };
    if !request.has_filters() {
        return Ok(());
    }

    let resolver = FilterResolver::new(columns);
    for (raw_key, value) in request.filters() {
        resolver.apply(builder, raw_key, value).map_err(|e| {
            let (key, operator) = split_filter_key(raw_key);
            PaginationError::Filter {
                context: context.clone(),
                key: key.to_string(),
                value: value.clone(),
                operator: operator.to_ascii_lowercase(),
                message: format!("Error applying filter with operator '{}': {}", operator, e),
            }
        })?;
    }
    Ok(())
}

/// Apply the request's sort, returning whether one was requested
fn apply_request_sort(
    context: &ErrorContext,
    request: &PaginationRequest,
    builder: &mut QueryBuilder,
) -> Result<bool, PaginationError> {
    let Some(column) = request.sort_column() else {
        return Ok(false);
    };

    let direction = request.sort_direction().unwrap_or("asc");
    let order = SortOrder::parse(direction).ok_or_else(|| PaginationError::Sort {
        context: context.clone(),
        column: column.to_string(),
        direction: direction.to_string(),
        message: "Sort direction must be 'asc' or 'desc'".to_string(),
    })?;

    let column = validate_sort_column(context, column, order.to_sql())?;
    builder.set_ordering([column], order);
    Ok(true)
}

fn validate_sort_column(context: &ErrorContext, column: &str, direction: &str) -> Result<String, PaginationError> {
    ValidatedColumnRef::new(column)
        .map(ValidatedColumnRef::into_string)
        .map_err(|e| PaginationError::Sort {
            context: context.clone(),
            column: column.to_string(),
            direction: direction.to_string(),
            message: format!("Error applying sort criteria: {}", e),
        })
}

fn map_executor_error(context: &ErrorContext, batch: &PageBatch, err: ExecutorError) -> PaginationError {
    match err {
        ExecutorError::Sqlx(e) => PaginationError::database(
            context.clone(),
            "A database error occurred while retrieving paged data",
            &batch.statement_text(),
            Some(e),
        ),
        ExecutorError::Other(message) => {
            PaginationError::database(context.clone(), message, &batch.statement_text(), None)
        }
        ExecutorError::Placeholder(e) => {
            PaginationError::unexpected(context.clone(), "An unexpected error occurred during pagination", e)
        }
    }
}

fn log_failure(err: &PaginationError) {
    let context = err.context();
    match err {
        PaginationError::Cancelled { .. } => {
            warn!(
                component = context.component,
                function = context.function,
                table = %context.table,
                "Pagination cancelled"
            );
        }
        _ => {
            error!(
                error_code = err.error_code(),
                component = context.component,
                function = context.function,
                table = %context.table,
                error = %err,
                "Pagination failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::{SqlValue, ValueType};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Room {
        id: i64,
        number: String,
    }

    fn rooms(n: i64) -> Vec<Room> {
        (1..=n)
            .map(|id| Room {
                id,
                number: format!("{:03}", id),
            })
            .collect()
    }

    /// Returns canned rows and records every batch it receives
    struct RecordingExecutor {
        items: Vec<Room>,
        total_count: i64,
        batches: Mutex<Vec<PageBatch>>,
    }

    impl RecordingExecutor {
        fn new(items: Vec<Room>, total_count: i64) -> Self {
            Self {
                items,
                total_count,
                batches: Mutex::new(Vec::new()),
            }
        }

        fn last_batch(&self) -> PageBatch {
            self.batches.lock().unwrap().last().cloned().unwrap()
        }

        fn calls(&self) -> usize {
            self.batches.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PageExecutor<Room> for RecordingExecutor {
        async fn fetch_page(&self, batch: &PageBatch) -> Result<PageRows<Room>, ExecutorError> {
            self.batches.lock().unwrap().push(batch.clone());
            Ok(PageRows {
                items: self.items.clone(),
                total_count: self.total_count,
            })
        }
    }

    /// Never completes
    struct PendingExecutor;

    #[async_trait]
    impl PageExecutor<Room> for PendingExecutor {
        async fn fetch_page(&self, _batch: &PageBatch) -> Result<PageRows<Room>, ExecutorError> {
            std::future::pending().await
        }
    }

    /// Ignores the page window
    struct OverfullExecutor;

    #[async_trait]
    impl PageExecutor<Room> for OverfullExecutor {
        async fn fetch_page(&self, _batch: &PageBatch) -> Result<PageRows<Room>, ExecutorError> {
            Ok(PageRows {
                items: rooms(5),
                total_count: 5,
            })
        }
    }

    struct FailingExecutor;

    #[async_trait]
    impl PageExecutor<Room> for FailingExecutor {
        async fn fetch_page(&self, _batch: &PageBatch) -> Result<PageRows<Room>, ExecutorError> {
            Err(ExecutorError::Sqlx(sqlx::Error::PoolTimedOut))
        }
    }

    fn hotels_query() -> TableQuery {
        TableQuery::new("Hotels")
            .columns("Id, Name, City")
            .searchable(["Name", "City"])
            .filterable(FilterableColumns::new().column("city", "City"))
            .base_condition("EntityStatusId = 1")
            .default_sort("Id", SortOrder::Asc)
    }

    fn rooms_builder() -> QueryBuilder {
        QueryBuilder::new("Rooms", "r")
            .unwrap()
            .select("r.Id, r.RoomNumber")
            .inner_join("Hotels", "h", "r.HotelId = h.Id")
            .unwrap()
            .where_clause("r.EntityStatusId = 1")
    }

    fn room_filters() -> FilterableColumns {
        FilterableColumns::new()
            .typed_column("isAvailable", "r.IsAvailable", ValueType::Boolean)
            .typed_column("priceMin", "r.PricePerNight", ValueType::Float)
    }

    #[tokio::test]
    async fn test_single_table_page() {
        let helper = PaginationHelper::new(RecordingExecutor::new(rooms(2), 12));
        let request = PaginationRequest::new(2, 10).with_search("Grand");

        let result = helper
            .get_paginated_result::<Room>(&request, &hotels_query(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.items().len(), 2);
        assert_eq!(result.total_count(), 12);
        assert_eq!(result.total_pages(), 2);
        assert_eq!(result.page(), 2);

        let batch = helper.executor().last_batch();
        assert_eq!(
            batch.select_sql,
            "SELECT Id, Name, City FROM Hotels AS Hotels \
             WHERE (EntityStatusId = 1) AND (LOWER(Name) LIKE @search_0 OR LOWER(City) LIKE @search_0) \
             ORDER BY Id ASC OFFSET @Offset ROWS FETCH NEXT @PageSize ROWS ONLY"
        );
        assert_eq!(
            batch.count_sql,
            "SELECT COUNT(1) FROM Hotels AS Hotels \
             WHERE (EntityStatusId = 1) AND (LOWER(Name) LIKE @search_0 OR LOWER(City) LIKE @search_0)"
        );
        assert_eq!(batch.parameters.get("Offset"), Some(&SqlValue::Int(10)));
        assert_eq!(batch.parameters.get("PageSize"), Some(&SqlValue::Int(10)));
        assert_eq!(batch.parameters.get("search_0"), Some(&SqlValue::from("%grand%")));
    }

    #[tokio::test]
    async fn test_request_sort_overrides_default() {
        let helper = PaginationHelper::new(RecordingExecutor::new(rooms(1), 1));
        let request = PaginationRequest::default().with_sort("Name", "DESC");

        helper
            .get_paginated_result::<Room>(&request, &hotels_query(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(helper
            .executor()
            .last_batch()
            .select_sql
            .contains("ORDER BY Name DESC OFFSET"));
    }

    #[tokio::test]
    async fn test_without_any_sort_orders_by_first_column() {
        let helper = PaginationHelper::new(RecordingExecutor::new(vec![], 0));
        let query = TableQuery::new("Hotels");

        let result = helper
            .get_paginated_result::<Room>(&PaginationRequest::default(), &query, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.total_pages(), 0);
        assert_eq!(
            helper.executor().last_batch().select_sql,
            "SELECT Hotels.* FROM Hotels AS Hotels ORDER BY 1 OFFSET @Offset ROWS FETCH NEXT @PageSize ROWS ONLY"
        );
    }

    #[tokio::test]
    async fn test_schema_qualified_table_alias() {
        let helper = PaginationHelper::new(RecordingExecutor::new(vec![], 0));
        let query = TableQuery::new("booking.Hotels");

        helper
            .get_paginated_result::<Room>(&PaginationRequest::default(), &query, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            helper.executor().last_batch().count_sql,
            "SELECT COUNT(1) FROM booking.Hotels AS Hotels"
        );
    }

    #[tokio::test]
    async fn test_join_page_with_filters_and_sort() {
        let helper = PaginationHelper::new(RecordingExecutor::new(rooms(2), 12));
        let request = PaginationRequest::new(2, 10)
            .with_filter("isAvailable", "true")
            .with_filter("priceMin__gte", "100")
            .with_filter("notFilterable", "x")
            .with_sort("r.PricePerNight", "desc");
        let filters = room_filters();

        let result = helper
            .get_paginated_data_with_joins::<Room>(
                &request,
                rooms_builder().order_by(["r.Id"]),
                "Rooms",
                Some(&filters),
                &["r.RoomNumber", "h.Name"],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.items().len(), 2);
        assert_eq!(result.total_count(), 12);
        assert_eq!(result.total_pages(), 2);

        let batch = helper.executor().last_batch();
        assert!(batch.count_sql.ends_with(
            "WHERE (r.EntityStatusId = 1) AND (r.IsAvailable = @filter_0) AND (r.PricePerNight >= @filter_1)"
        ));
        assert!(batch.select_sql.contains("ORDER BY r.PricePerNight DESC OFFSET"));
        assert!(!batch.select_sql.contains("notFilterable"));
        assert_eq!(batch.parameters.get("filter_0"), Some(&SqlValue::Bool(true)));
        assert_eq!(batch.parameters.get("filter_1"), Some(&SqlValue::Float(100.0)));
    }

    #[tokio::test]
    async fn test_join_page_keeps_caller_ordering() {
        let helper = PaginationHelper::new(RecordingExecutor::new(vec![], 0));

        helper
            .get_paginated_data_with_joins::<Room>(
                &PaginationRequest::default(),
                rooms_builder().order_by_descending(["h.Name", "r.RoomNumber"]),
                "Rooms",
                None,
                &[],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(helper
            .executor()
            .last_batch()
            .select_sql
            .contains("ORDER BY h.Name DESC, r.RoomNumber DESC OFFSET"));
    }

    #[tokio::test]
    async fn test_invalid_table_name() {
        let helper = PaginationHelper::new(RecordingExecutor::new(vec![], 0));

        let err = helper
            .get_paginated_result::<Room>(
                &PaginationRequest::default(),
                &TableQuery::new(""),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        match err {
            PaginationError::InvalidParameters { parameter, .. } => assert_eq!(parameter, "table_name"),
            other => panic!("expected InvalidParameters, got {:?}", other),
        }
        assert_eq!(helper.executor().calls(), 0);
    }

    #[tokio::test]
    async fn test_filter_error_names_key_value_operator() {
        let helper = PaginationHelper::new(RecordingExecutor::new(vec![], 0));
        let request = PaginationRequest::default().with_filter("priceMin__between", "100");
        let filters = room_filters();

        let err = helper
            .get_paginated_data_with_joins::<Room>(
                &request,
                rooms_builder(),
                "Rooms",
                Some(&filters),
                &[],
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "FILTER_ERROR");
        match err {
            PaginationError::Filter {
                key, value, operator, ..
            } => {
                assert_eq!(key, "priceMin");
                assert_eq!(value, "100");
                assert_eq!(operator, "between");
            }
            other => panic!("expected Filter, got {:?}", other),
        }
        assert_eq!(helper.executor().calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_search_column() {
        let helper = PaginationHelper::new(RecordingExecutor::new(vec![], 0));
        let query = TableQuery::new("Hotels").searchable(["Name", "1=1 OR Name"]);
        let request = PaginationRequest::default().with_search("grand");

        let err = helper
            .get_paginated_result::<Room>(&request, &query, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "SEARCH_ERROR");
    }

    #[tokio::test]
    async fn test_invalid_sort_is_rejected() {
        let helper = PaginationHelper::new(RecordingExecutor::new(vec![], 0));

        for (column, direction) in [("Name; DROP TABLE Hotels", "asc"), ("Name", "sideways")] {
            let request = PaginationRequest::default().with_sort(column, direction);
            let err = helper
                .get_paginated_result::<Room>(&request, &hotels_query(), &CancellationToken::new())
                .await
                .unwrap_err();

            match err {
                PaginationError::Sort { column: c, .. } => assert_eq!(c, column),
                other => panic!("expected Sort, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_execution() {
        let helper = PaginationHelper::new(RecordingExecutor::new(rooms(3), 3));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = helper
            .get_paginated_result::<Room>(&PaginationRequest::default(), &hotels_query(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PaginationError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_while_in_flight() {
        let helper = PaginationHelper::new(PendingExecutor);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = helper
            .get_paginated_result::<Room>(&PaginationRequest::default(), &hotels_query(), &cancel)
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "PAGINATION_CANCELLED");
    }

    #[tokio::test]
    async fn test_query_timeout_is_database_error() {
        let helper = PaginationHelper::new(PendingExecutor).with_query_timeout(Some(Duration::from_millis(20)));

        let err = helper
            .get_paginated_result::<Room>(
                &PaginationRequest::default(),
                &hotels_query(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "PAGINATION_DATABASE_ERROR");
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_more_rows_than_page_size_is_unexpected() {
        let helper = PaginationHelper::new(OverfullExecutor);

        let err = helper
            .get_paginated_result::<Room>(
                &PaginationRequest::new(1, 2),
                &hotels_query(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PaginationError::Unexpected { .. }));
        assert_eq!(err.error_code(), "PAGINATION_ERROR");
        assert!(err.to_string().contains("5 rows for a page of 2"));
    }

    #[tokio::test]
    async fn test_driver_failure_is_database_error() {
        let helper = PaginationHelper::new(FailingExecutor);

        let err = helper
            .get_paginated_result::<Room>(
                &PaginationRequest::default(),
                &hotels_query(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        match &err {
            PaginationError::Database { source, .. } => assert!(source.is_some()),
            other => panic!("expected Database, got {:?}", other),
        }
        if cfg!(debug_assertions) {
            assert!(err.sql_statement().unwrap().contains("SELECT COUNT(1) FROM Hotels"));
        }
    }
}
