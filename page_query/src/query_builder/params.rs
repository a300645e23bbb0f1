//! Named query parameters
//!
//! Builders reference values through `@name` placeholders. The bag keeps the
//! values by name until an executor turns the placeholders into positional
//! arguments for the target driver.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// A typed value bound to a query placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Guess the most specific type for a raw request value.
    ///
    /// `true`/`false` become booleans, integral strings integers, finite
    /// decimals floats. Anything else is kept verbatim as text.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Self::Int(n);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::Float(f),
            _ => Self::Text(raw.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Int(n) => write!(f, "{}", n),
            SqlValue::Float(x) => write!(f, "{}", x),
            SqlValue::Text(s) => write!(f, "'{}'", s),
            SqlValue::Date(d) => write!(f, "'{}'", d),
            SqlValue::Timestamp(t) => write!(f, "'{}'", t.to_rfc3339()),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for SqlValue {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<u32> for SqlValue {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for SqlValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Timestamp(t)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// How a raw filter value is converted before binding
///
/// PostgreSQL resolves operators from the parameter type, so the type must
/// match the column: a `text` parameter never compares with a number, a
/// boolean or a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueType {
    /// Bound verbatim as text
    #[default]
    Text,
    /// Decide per value with [`SqlValue::infer`]
    Inferred,
    Integer,
    Float,
    Boolean,
    /// `YYYY-MM-DD`
    Date,
    /// RFC 3339, `YYYY-MM-DD[ T]HH:MM:SS[.f]` (UTC) or a bare date at midnight UTC
    Timestamp,
}

impl ValueType {
    /// Convert a raw value, returning `None` when it does not fit the type
    pub fn parse(&self, raw: &str) -> Option<SqlValue> {
        match self {
            ValueType::Inferred => Some(SqlValue::infer(raw)),
            ValueType::Text => Some(SqlValue::Text(raw.to_string())),
            ValueType::Integer => raw.trim().parse::<i64>().ok().map(SqlValue::Int),
            ValueType::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(SqlValue::Float),
            ValueType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(SqlValue::Bool(true)),
                "false" | "0" => Some(SqlValue::Bool(false)),
                _ => None,
            },
            ValueType::Date => parse_date(raw).map(SqlValue::Date),
            ValueType::Timestamp => parse_timestamp(raw).map(SqlValue::Timestamp),
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0)))?;
    Some(Utc.from_utc_datetime(&naive))
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Inferred => "inferred",
            ValueType::Text => "text",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
            ValueType::Timestamp => "timestamp",
        };
        write!(f, "{}", name)
    }
}

/// Strip the optional `@` prefix from a parameter name
pub fn normalize_name(name: &str) -> &str {
    name.trim_start_matches('@')
}

/// Named values referenced by `@name` placeholders
///
/// Insertion order is kept. Adding a name that already exists replaces the
/// earlier value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    entries: Vec<(String, SqlValue)>,
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value; `name` may be given with or without the `@` prefix
    pub fn add(&mut self, name: &str, value: impl Into<SqlValue>) {
        let name = normalize_name(name);
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        let name = normalize_name(name);
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

/// Errors raised while resolving placeholders
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderError {
    #[error("Placeholder @{0} has no bound parameter")]
    Unbound(String),
}

/// SQL rewritten to `$n` placeholders with values in position order
#[derive(Debug, Clone, PartialEq)]
pub struct PositionalQuery {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Rewrite `@name` placeholders into PostgreSQL `$n` positions.
///
/// Quoted literals and quoted identifiers are copied untouched. A name used
/// several times maps to the same position. Parameters not referenced by the
/// statement are not bound.
pub fn bind_positional(sql: &str, params: &ParameterBag) -> Result<PositionalQuery, PlaceholderError> {
    let bytes = sql.as_bytes();
    let mut rewritten = String::with_capacity(sql.len() + 8);
    let mut values = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut quote: Option<u8> = None;
    let mut copied_up_to = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match b {
            b'\'' | b'"' => {
                quote = Some(b);
                i += 1;
            }
            b'@' if is_placeholder_start(bytes, i) => {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                    end += 1;
                }
                let name = &sql[start..end];
                let position = match positions.get(name) {
                    Some(position) => *position,
                    None => {
                        let value = params
                            .get(name)
                            .ok_or_else(|| PlaceholderError::Unbound(name.to_string()))?;
                        values.push(value.clone());
                        positions.insert(name, values.len());
                        values.len()
                    }
                };

                rewritten.push_str(&sql[copied_up_to..i]);
                rewritten.push('$');
                rewritten.push_str(&position.to_string());
                copied_up_to = end;
                i = end;
            }
            _ => i += 1,
        }
    }

    rewritten.push_str(&sql[copied_up_to..]);
    Ok(PositionalQuery { sql: rewritten, values })
}

fn is_placeholder_start(bytes: &[u8], at: usize) -> bool {
    let next_ok = bytes
        .get(at + 1)
        .is_some_and(|c| c.is_ascii_alphabetic() || *c == b'_');
    let prev_ok = at == 0 || {
        let prev = bytes[at - 1];
        !(prev.is_ascii_alphanumeric() || prev == b'_' || prev == b'@')
    };
    next_ok && prev_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_values() {
        assert_eq!(SqlValue::infer("true"), SqlValue::Bool(true));
        assert_eq!(SqlValue::infer("FALSE"), SqlValue::Bool(false));
        assert_eq!(SqlValue::infer("100"), SqlValue::Int(100));
        assert_eq!(SqlValue::infer("-3"), SqlValue::Int(-3));
        assert_eq!(SqlValue::infer("99.5"), SqlValue::Float(99.5));
        assert_eq!(SqlValue::infer("Grand"), SqlValue::Text("Grand".to_string()));
        assert_eq!(SqlValue::infer("NaN"), SqlValue::Text("NaN".to_string()));
        assert_eq!(SqlValue::infer("inf"), SqlValue::Text("inf".to_string()));
    }

    #[test]
    fn test_explicit_value_types() {
        assert_eq!(ValueType::Text.parse("0101"), Some(SqlValue::Text("0101".to_string())));
        assert_eq!(ValueType::Integer.parse(" 42 "), Some(SqlValue::Int(42)));
        assert_eq!(ValueType::Integer.parse("4.2"), None);
        assert_eq!(ValueType::Float.parse("4.2"), Some(SqlValue::Float(4.2)));
        assert_eq!(ValueType::Boolean.parse("1"), Some(SqlValue::Bool(true)));
        assert_eq!(ValueType::Boolean.parse("yes"), None);
    }

    #[test]
    fn test_text_is_the_default_value_type() {
        assert_eq!(ValueType::default(), ValueType::Text);
        assert_eq!(ValueType::default().parse("10115"), Some(SqlValue::Text("10115".to_string())));
        assert_eq!(ValueType::default().parse("true"), Some(SqlValue::Text("true".to_string())));
    }

    #[test]
    fn test_date_and_timestamp_value_types() {
        let new_year = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(ValueType::Date.parse(" 2024-01-01 "), Some(SqlValue::Date(new_year)));
        assert_eq!(ValueType::Date.parse("2024-13-01"), None);
        assert_eq!(ValueType::Date.parse("yesterday"), None);

        assert_eq!(ValueType::Timestamp.parse("2024-01-01"), Some(SqlValue::Timestamp(midnight)));
        assert_eq!(
            ValueType::Timestamp.parse("2024-01-01T02:00:00+02:00"),
            Some(SqlValue::Timestamp(midnight))
        );
        assert_eq!(
            ValueType::Timestamp.parse("2024-01-01 12:30:00"),
            Some(SqlValue::Timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap()))
        );
        assert_eq!(ValueType::Timestamp.parse("01/01/2024"), None);
    }

    #[test]
    fn test_bag_overwrites_duplicate_names() {
        let mut bag = ParameterBag::new();
        bag.add("@HotelId", 1);
        bag.add("HotelId", 2);

        assert_eq!(bag.len(), 1);
        assert_eq!(bag.get("@HotelId"), Some(&SqlValue::Int(2)));
    }

    #[test]
    fn test_bind_positional_reuses_positions() {
        let mut bag = ParameterBag::new();
        bag.add("search_0", "%grand%");
        bag.add("filter_1", 100);

        let query = bind_positional(
            "WHERE (LOWER(Name) LIKE @search_0 OR LOWER(City) LIKE @search_0) AND (price >= @filter_1)",
            &bag,
        )
        .unwrap();

        assert_eq!(
            query.sql,
            "WHERE (LOWER(Name) LIKE $1 OR LOWER(City) LIKE $1) AND (price >= $2)"
        );
        assert_eq!(
            query.values,
            vec![SqlValue::Text("%grand%".to_string()), SqlValue::Int(100)]
        );
    }

    #[test]
    fn test_bind_positional_distinguishes_prefixes() {
        let mut bag = ParameterBag::new();
        bag.add("filter_1", "a");
        bag.add("filter_10", "b");

        let query = bind_positional("x = @filter_10 AND y = @filter_1", &bag).unwrap();
        assert_eq!(query.sql, "x = $1 AND y = $2");
        assert_eq!(query.values, vec![SqlValue::from("b"), SqlValue::from("a")]);
    }

    #[test]
    fn test_bind_positional_skips_quoted_text() {
        let bag = ParameterBag::new();
        let query = bind_positional(
            "SELECT 'contact@hotel.com' AS email, \"odd@column\" FROM t WHERE x::text = 'it''s @fine'",
            &bag,
        )
        .unwrap();

        assert!(query.values.is_empty());
        assert!(query.sql.contains("'contact@hotel.com'"));
        assert!(query.sql.contains("'it''s @fine'"));
    }

    #[test]
    fn test_bind_positional_reports_unbound() {
        let bag = ParameterBag::new();
        let err = bind_positional("WHERE r.HotelId = @HotelId", &bag).unwrap_err();
        assert_eq!(err, PlaceholderError::Unbound("HotelId".to_string()));
    }

    #[test]
    fn test_bind_positional_keeps_unicode() {
        let mut bag = ParameterBag::new();
        bag.add("p", "x");
        let query = bind_positional("SELECT 'Zürich' AS city WHERE a = @p -- café", &bag).unwrap();
        assert_eq!(query.sql, "SELECT 'Zürich' AS city WHERE a = $1 -- café");
    }
}
