//! Fluent SELECT/COUNT builder
//!
//! A builder is created per logical query, configured through chained calls,
//! and consumed once. Select and count statements share the same FROM, JOIN
//! and WHERE text along with one named parameter bag.

use crate::errors::QueryBuildError;
use crate::query_builder::join::{JoinClause, JoinType};
use crate::query_builder::ordering::SortOrder;
use crate::query_builder::params::{ParameterBag, SqlValue};
use crate::query_builder::sql_generation::SqlGenerator;

/// Query builder for paginated SELECT and COUNT statements
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    pub(crate) table: String,
    pub(crate) alias: String,
    pub(crate) select: Vec<String>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) predicates: Vec<String>,
    pub(crate) order_columns: Vec<String>,
    pub(crate) order: SortOrder,
    pub(crate) parameters: ParameterBag,
    param_counter: usize,
}

impl QueryBuilder {
    /// Start a query over `table`; an empty alias falls back to the table name
    pub fn new(table: &str, alias: &str) -> Result<Self, QueryBuildError> {
        let table = table.trim();
        if table.is_empty() {
            return Err(QueryBuildError::EmptyTable);
        }

        let alias = alias.trim();
        let alias = if alias.is_empty() { table } else { alias };

        Ok(Self {
            table: table.to_string(),
            alias: alias.to_string(),
            select: Vec::new(),
            joins: Vec::new(),
            predicates: Vec::new(),
            order_columns: Vec::new(),
            order: SortOrder::Asc,
            parameters: ParameterBag::new(),
            param_counter: 0,
        })
    }

    /// Append a raw projection fragment such as `h.Name AS HotelName`
    pub fn select(mut self, fragment: &str) -> Self {
        if !fragment.trim().is_empty() {
            self.select.push(fragment.to_string());
        }
        self
    }

    /// Append a join; clauses are emitted in the order they are added
    pub fn join(
        mut self,
        join_type: JoinType,
        table: &str,
        alias: &str,
        condition: &str,
    ) -> Result<Self, QueryBuildError> {
        self.joins.push(JoinClause::new(join_type, table, alias, condition)?);
        Ok(self)
    }

    pub fn inner_join(self, table: &str, alias: &str, condition: &str) -> Result<Self, QueryBuildError> {
        self.join(JoinType::Inner, table, alias, condition)
    }

    pub fn left_join(self, table: &str, alias: &str, condition: &str) -> Result<Self, QueryBuildError> {
        self.join(JoinType::Left, table, alias, condition)
    }

    pub fn right_join(self, table: &str, alias: &str, condition: &str) -> Result<Self, QueryBuildError> {
        self.join(JoinType::Right, table, alias, condition)
    }

    /// Add a predicate; multiple predicates are combined with AND
    pub fn where_clause(mut self, condition: &str) -> Self {
        self.push_predicate(condition);
        self
    }

    /// Match `term` case-insensitively against any of `columns`
    ///
    /// A blank term or an empty column list leaves the builder unchanged.
    pub fn with_search<I, S>(mut self, term: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.apply_search(term, columns);
        self
    }

    /// Replace the ordering with ascending `columns`
    pub fn order_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_ordering(columns, SortOrder::Asc);
        self
    }

    /// Replace the ordering with descending `columns`
    pub fn order_by_descending<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_ordering(columns, SortOrder::Desc);
        self
    }

    /// Bind a named value; a repeated name replaces the earlier value
    pub fn add_parameter(mut self, name: &str, value: impl Into<SqlValue>) -> Self {
        self.parameters.add(name, value);
        self
    }

    /// Reserve a unique parameter name `prefix_N` for this builder
    pub fn next_parameter_name(&mut self, prefix: &str) -> String {
        let name = format!("{}_{}", prefix, self.param_counter);
        self.param_counter += 1;
        name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn parameters(&self) -> &ParameterBag {
        &self.parameters
    }

    pub fn into_parameters(self) -> ParameterBag {
        self.parameters
    }

    pub fn has_ordering(&self) -> bool {
        !self.order_columns.is_empty()
    }

    /// Build the SELECT statement without any paging window
    pub fn build_select_query(&self) -> String {
        format!(
            "SELECT {} {} {}",
            SqlGenerator::build_select_list(&self.select, &self.alias),
            SqlGenerator::build_body(&self.table, &self.alias, &self.joins, &self.predicates),
            SqlGenerator::build_order_clause(&self.order_columns, self.order)
        )
    }

    /// Build the COUNT statement over the same row set as the select
    pub fn build_count_query(&self) -> String {
        format!(
            "SELECT COUNT(1) {}",
            SqlGenerator::build_body(&self.table, &self.alias, &self.joins, &self.predicates)
        )
    }

    pub(crate) fn push_predicate(&mut self, condition: &str) {
        let condition = condition.trim();
        if !condition.is_empty() {
            self.predicates.push(format!("({})", condition));
        }
    }

    pub(crate) fn bind(&mut self, name: &str, value: impl Into<SqlValue>) {
        self.parameters.add(name, value);
    }

    pub(crate) fn apply_search<I, S>(&mut self, term: &str, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let term = term.trim();
        if term.is_empty() {
            return;
        }

        let columns: Vec<String> = columns
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if columns.is_empty() {
            return;
        }

        let param = self.next_parameter_name("search");
        let predicate = columns
            .iter()
            .map(|column| format!("LOWER({}) LIKE @{}", column, param))
            .collect::<Vec<_>>()
            .join(" OR ");

        self.bind(&param, format!("%{}%", term.to_lowercase()));
        self.push_predicate(&predicate);
    }

    pub(crate) fn set_ordering<I, S>(&mut self, columns: I, order: SortOrder)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_columns = columns
            .into_iter()
            .map(Into::into)
            .filter(|c: &String| !c.trim().is_empty())
            .collect();
        self.order = order;
    }
}
