//! SQL text assembly
//!
//! The select and count statements are assembled from the same FROM/JOIN/WHERE
//! text so both always describe the same row set.

use crate::query_builder::join::JoinClause;
use crate::query_builder::ordering::SortOrder;

pub struct SqlGenerator;

impl SqlGenerator {
    /// Build the projection, falling back to `alias.*`
    pub fn build_select_list(fragments: &[String], alias: &str) -> String {
        if fragments.is_empty() {
            format!("{}.*", alias)
        } else {
            fragments.join(", ")
        }
    }

    /// Build `FROM <table> AS <alias>` followed by the joins in insertion order
    pub fn build_from_clause(table: &str, alias: &str, joins: &[JoinClause]) -> String {
        let mut sql = format!("FROM {} AS {}", table, alias);
        for join in joins {
            sql.push(' ');
            sql.push_str(&join.to_sql());
        }
        sql
    }

    /// Build WHERE clause from parenthesized predicates
    pub fn build_where_clause(predicates: &[String]) -> String {
        if predicates.is_empty() {
            return String::new();
        }
        format!("WHERE {}", predicates.join(" AND "))
    }

    /// Build ORDER BY clause; `ORDER BY 1` keeps offset paging deterministic
    /// when nothing else is known
    pub fn build_order_clause(columns: &[String], order: SortOrder) -> String {
        if columns.is_empty() {
            return "ORDER BY 1".to_string();
        }

        let columns_sql = columns
            .iter()
            .map(|column| format!("{} {}", column, order.to_sql()))
            .collect::<Vec<_>>()
            .join(", ");

        format!("ORDER BY {}", columns_sql)
    }

    /// Build the row-set part shared by select and count statements
    pub fn build_body(table: &str, alias: &str, joins: &[JoinClause], predicates: &[String]) -> String {
        let from_clause = Self::build_from_clause(table, alias, joins);
        let where_clause = Self::build_where_clause(predicates);

        if where_clause.is_empty() {
            from_clause
        } else {
            format!("{} {}", from_clause, where_clause)
        }
    }

    /// Append the offset/fetch window to a select statement
    pub fn build_page_window(select_sql: &str, offset_param: &str, page_size_param: &str) -> String {
        format!(
            "{} OFFSET @{} ROWS FETCH NEXT @{} ROWS ONLY",
            select_sql, offset_param, page_size_param
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::join::JoinType;

    #[test]
    fn test_build_select_list() {
        assert_eq!(SqlGenerator::build_select_list(&[], "h"), "h.*");
        assert_eq!(
            SqlGenerator::build_select_list(&["h.Id".to_string(), "h.Name".to_string()], "h"),
            "h.Id, h.Name"
        );
    }

    #[test]
    fn test_build_order_clause() {
        assert_eq!(SqlGenerator::build_order_clause(&[], SortOrder::Desc), "ORDER BY 1");
        assert_eq!(
            SqlGenerator::build_order_clause(
                &["h.Name".to_string(), "h.Id".to_string()],
                SortOrder::Desc
            ),
            "ORDER BY h.Name DESC, h.Id DESC"
        );
    }

    #[test]
    fn test_build_body_with_joins_and_predicates() {
        let joins = vec![
            JoinClause::new(JoinType::Inner, "Hotels", "h", "r.HotelId = h.Id").unwrap(),
            JoinClause::new(JoinType::Left, "RoomTypes", "rt", "r.RoomTypeId = rt.Id").unwrap(),
        ];
        let predicates = vec!["(r.EntityStatusId = 1)".to_string(), "(r.IsAvailable = @filter_0)".to_string()];

        assert_eq!(
            SqlGenerator::build_body("Rooms", "r", &joins, &predicates),
            "FROM Rooms AS r INNER JOIN Hotels AS h ON r.HotelId = h.Id \
             LEFT JOIN RoomTypes AS rt ON r.RoomTypeId = rt.Id \
             WHERE (r.EntityStatusId = 1) AND (r.IsAvailable = @filter_0)"
        );
    }

    #[test]
    fn test_build_page_window() {
        assert_eq!(
            SqlGenerator::build_page_window("SELECT h.* FROM Hotels AS h ORDER BY 1", "Offset", "PageSize"),
            "SELECT h.* FROM Hotels AS h ORDER BY 1 OFFSET @Offset ROWS FETCH NEXT @PageSize ROWS ONLY"
        );
    }
}
