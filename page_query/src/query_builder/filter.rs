//! Filter operator resolution
//!
//! Request filters arrive as `key` or `key__operator` entries with string
//! values. Keys are mapped through a caller-supplied whitelist of filterable
//! columns; every value reaches SQL through a uniquely named parameter.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::query_builder::builder::QueryBuilder;
use crate::query_builder::params::{SqlValue, ValueType};

/// Separator between a filter key and its operator
pub const OPERATOR_SEPARATOR: &str = "__";

/// Filter operators understood by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,         // =
    Neq,        // <>
    Gt,         // >
    Gte,        // >=
    Lt,         // <
    Lte,        // <=
    Contains,   // LIKE %v%
    StartsWith, // LIKE v%
    EndsWith,   // LIKE %v
    In,         // IN (...)
    NotIn,      // NOT IN (...)
    IsNull,     // IS NULL
    IsNotNull,  // IS NOT NULL
    Between,    // BETWEEN a AND b
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "startswith",
            FilterOperator::EndsWith => "endswith",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "notin",
            FilterOperator::IsNull => "isnull",
            FilterOperator::IsNotNull => "isnotnull",
            FilterOperator::Between => "between",
        }
    }
}

impl FromStr for FilterOperator {
    type Err = FilterResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let operator = match s.trim().to_ascii_lowercase().as_str() {
            "eq" => FilterOperator::Eq,
            "neq" => FilterOperator::Neq,
            "gt" => FilterOperator::Gt,
            "gte" => FilterOperator::Gte,
            "lt" => FilterOperator::Lt,
            "lte" => FilterOperator::Lte,
            "contains" => FilterOperator::Contains,
            "startswith" => FilterOperator::StartsWith,
            "endswith" => FilterOperator::EndsWith,
            "in" => FilterOperator::In,
            "notin" => FilterOperator::NotIn,
            "isnull" => FilterOperator::IsNull,
            "isnotnull" => FilterOperator::IsNotNull,
            "between" => FilterOperator::Between,
            _ => return Err(FilterResolveError::UnsupportedOperator(s.to_string())),
        };
        Ok(operator)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised while turning one filter entry into a predicate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterResolveError {
    #[error("Unsupported filter operator: {0}")]
    UnsupportedOperator(String),

    #[error("Operator '{operator}' requires at least one value")]
    EmptyValueList { operator: FilterOperator },

    #[error("Between operator requires two comma-separated values")]
    InvalidRange,

    #[error("Value '{value}' is not a valid {expected}")]
    InvalidValue { value: String, expected: ValueType },
}

/// Split a raw key on the first `__` into (column key, operator token)
pub fn split_filter_key(raw_key: &str) -> (&str, &str) {
    match raw_key.split_once(OPERATOR_SEPARATOR) {
        Some((key, operator)) => (key, operator),
        None => (raw_key, "eq"),
    }
}

/// Physical column behind a public filter key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterColumn {
    pub column: String,
    pub value_type: ValueType,
}

impl FilterColumn {
    pub fn new(column: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            column: column.into(),
            value_type,
        }
    }
}

impl From<&str> for FilterColumn {
    fn from(column: &str) -> Self {
        Self::new(column, ValueType::Text)
    }
}

impl From<String> for FilterColumn {
    fn from(column: String) -> Self {
        Self::new(column, ValueType::Text)
    }
}

impl From<(&str, ValueType)> for FilterColumn {
    fn from((column, value_type): (&str, ValueType)) -> Self {
        Self::new(column, value_type)
    }
}

/// Whitelist mapping public filter keys to columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterableColumns {
    columns: BTreeMap<String, FilterColumn>,
}

impl FilterableColumns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow filtering `key` on a text `column`; values are bound verbatim
    pub fn column(self, key: &str, column: &str) -> Self {
        self.typed_column(key, column, ValueType::Text)
    }

    /// Allow filtering `key` on `column` with an explicit value type
    pub fn typed_column(mut self, key: &str, column: &str, value_type: ValueType) -> Self {
        self.columns
            .insert(key.to_string(), FilterColumn::new(column, value_type));
        self
    }

    pub fn get(&self, key: &str) -> Option<&FilterColumn> {
        self.columns.get(key)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterColumn)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for FilterableColumns
where
    K: Into<String>,
    V: Into<FilterColumn>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// What happened to one filter entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    Applied,
    /// The key is not filterable; nothing was added to the query
    UnknownKey,
}

/// Applies request filters to a [`QueryBuilder`]
#[derive(Debug, Clone, Copy)]
pub struct FilterResolver<'a> {
    columns: &'a FilterableColumns,
}

impl<'a> FilterResolver<'a> {
    pub fn new(columns: &'a FilterableColumns) -> Self {
        Self { columns }
    }

    /// Resolve one `key[__operator]` entry and add its predicate to `builder`
    pub fn apply(
        &self,
        builder: &mut QueryBuilder,
        raw_key: &str,
        value: &str,
    ) -> Result<FilterOutcome, FilterResolveError> {
        let (key, operator_token) = split_filter_key(raw_key);

        let Some(target) = self.columns.get(key) else {
            tracing::warn!(filter_key = %key, "Ignoring filter on non-filterable column");
            return Ok(FilterOutcome::UnknownKey);
        };

        let operator: FilterOperator = operator_token.parse()?;
        Self::apply_operator(builder, target, operator, value)?;
        Ok(FilterOutcome::Applied)
    }

    fn apply_operator(
        builder: &mut QueryBuilder,
        target: &FilterColumn,
        operator: FilterOperator,
        value: &str,
    ) -> Result<(), FilterResolveError> {
        let column = &target.column;

        match operator {
            FilterOperator::Eq => Self::compare(builder, target, "=", value)?,
            FilterOperator::Neq => Self::compare(builder, target, "<>", value)?,
            FilterOperator::Gt => Self::compare(builder, target, ">", value)?,
            FilterOperator::Gte => Self::compare(builder, target, ">=", value)?,
            FilterOperator::Lt => Self::compare(builder, target, "<", value)?,
            FilterOperator::Lte => Self::compare(builder, target, "<=", value)?,
            FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
                let pattern = match operator {
                    FilterOperator::Contains => format!("%{}%", value),
                    FilterOperator::StartsWith => format!("{}%", value),
                    _ => format!("%{}", value),
                };
                let param = builder.next_parameter_name("filter");
                builder.bind(&param, SqlValue::Text(pattern));
                builder.push_predicate(&format!("{} LIKE @{}", column, param));
            }
            FilterOperator::In | FilterOperator::NotIn => {
                let values: Vec<&str> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .collect();
                if values.is_empty() {
                    return Err(FilterResolveError::EmptyValueList { operator });
                }

                let typed = values
                    .iter()
                    .map(|v| Self::convert(target.value_type, v))
                    .collect::<Result<Vec<_>, _>>()?;

                let base = builder.next_parameter_name("filter");
                let mut placeholders = Vec::with_capacity(typed.len());
                for (i, v) in typed.into_iter().enumerate() {
                    let param = format!("{}_{}", base, i);
                    placeholders.push(format!("@{}", param));
                    builder.bind(&param, v);
                }

                let keyword = if operator == FilterOperator::In { "IN" } else { "NOT IN" };
                builder.push_predicate(&format!("{} {} ({})", column, keyword, placeholders.join(", ")));
            }
            FilterOperator::IsNull => builder.push_predicate(&format!("{} IS NULL", column)),
            FilterOperator::IsNotNull => builder.push_predicate(&format!("{} IS NOT NULL", column)),
            FilterOperator::Between => {
                let parts: Vec<&str> = value.split(',').map(str::trim).collect();
                let [from, to] = parts.as_slice() else {
                    return Err(FilterResolveError::InvalidRange);
                };
                if from.is_empty() || to.is_empty() {
                    return Err(FilterResolveError::InvalidRange);
                }

                let from = Self::convert(target.value_type, from)?;
                let to = Self::convert(target.value_type, to)?;
                let base = builder.next_parameter_name("filter");
                builder.bind(&format!("{}_from", base), from);
                builder.bind(&format!("{}_to", base), to);
                builder.push_predicate(&format!("{} BETWEEN @{}_from AND @{}_to", column, base, base));
            }
        }

        Ok(())
    }

    fn compare(
        builder: &mut QueryBuilder,
        target: &FilterColumn,
        op_sql: &str,
        value: &str,
    ) -> Result<(), FilterResolveError> {
        let typed = Self::convert(target.value_type, value)?;
        let param = builder.next_parameter_name("filter");
        builder.bind(&param, typed);
        builder.push_predicate(&format!("{} {} @{}", target.column, op_sql, param));
        Ok(())
    }

    fn convert(value_type: ValueType, raw: &str) -> Result<SqlValue, FilterResolveError> {
        value_type
            .parse(raw)
            .ok_or_else(|| FilterResolveError::InvalidValue {
                value: raw.to_string(),
                expected: value_type,
            })
    }
}
