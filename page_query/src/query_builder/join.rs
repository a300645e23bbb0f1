//! Join clauses
//!
//! Join metadata comes from trusted repository code, so the ON condition is
//! kept as raw SQL text.

use crate::errors::QueryBuildError;

/// Represents the type of SQL JOIN operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// INNER JOIN - rows with a match on both sides
    Inner,
    /// LEFT JOIN - every row of the left side, matched rows of the right side
    Left,
    /// RIGHT JOIN - every row of the right side, matched rows of the left side
    Right,
}

impl JoinType {
    /// Convert JoinType to SQL string
    pub fn to_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
        }
    }
}

/// Represents a complete JOIN clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: String,
    pub alias: String,
    /// Raw ON condition, e.g. `r.HotelId = h.Id`
    pub condition: String,
}

impl JoinClause {
    /// Create a join clause, rejecting empty table, alias or condition
    pub fn new(
        join_type: JoinType,
        table: impl Into<String>,
        alias: impl Into<String>,
        condition: impl Into<String>,
    ) -> Result<Self, QueryBuildError> {
        let table = table.into();
        let alias = alias.into();
        let condition = condition.into();

        if table.trim().is_empty() {
            return Err(QueryBuildError::EmptyJoinTable);
        }
        if alias.trim().is_empty() {
            return Err(QueryBuildError::EmptyJoinAlias {
                table: table.clone(),
            });
        }
        if condition.trim().is_empty() {
            return Err(QueryBuildError::EmptyJoinCondition {
                table: table.clone(),
            });
        }

        Ok(Self {
            join_type,
            table,
            alias,
            condition,
        })
    }

    /// Render as `<KIND> JOIN <table> AS <alias> ON <condition>`
    pub fn to_sql(&self) -> String {
        format!(
            "{} {} AS {} ON {}",
            self.join_type.to_sql(),
            self.table,
            self.alias,
            self.condition
        )
    }
}
