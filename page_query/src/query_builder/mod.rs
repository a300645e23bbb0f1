//! Query builder utilities
//!
//! SQL construction for paginated reads: the fluent builder, joins, ordering,
//! the filter operator resolver and named parameters.

pub mod builder;
pub mod filter;
pub mod join;
pub mod ordering;
pub mod params;
pub mod sql_generation;


pub use builder::QueryBuilder;
pub use filter::{
    FilterColumn, FilterOperator, FilterOutcome, FilterResolveError, FilterResolver, FilterableColumns,
};
pub use join::{JoinClause, JoinType};
pub use ordering::SortOrder;
pub use params::{bind_positional, ParameterBag, PlaceholderError, PositionalQuery, SqlValue, ValueType};
