//! Identifier validation
//!
//! Table names, search columns and sort columns are interpolated into SQL
//! text, so they are checked against a strict identifier grammar first.

use std::fmt;

/// Validation errors for database identifiers
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name contains invalid characters (only alphanumeric and underscore allowed)
    InvalidCharacters(String),
    /// Name is too long (PostgreSQL limit is 63 characters per segment)
    TooLong {
        name: String,
        length: usize,
        max_length: usize,
    },
    /// Name is empty
    Empty,
    /// Name starts with invalid character (must start with letter or underscore)
    InvalidStartCharacter(String),
    /// Name is a reserved SQL keyword
    ReservedKeyword(String),
    /// Name has more dot-separated parts than allowed
    TooManySegments { name: String, max_segments: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidCharacters(name) => {
                write!(f, "Invalid characters in name '{}': only alphanumeric characters and underscores are allowed", name)
            }
            ValidationError::TooLong {
                name,
                length,
                max_length,
            } => {
                write!(
                    f,
                    "Name '{}' is too long: {} characters (max {})",
                    name, length, max_length
                )
            }
            ValidationError::Empty => {
                write!(f, "Name cannot be empty")
            }
            ValidationError::InvalidStartCharacter(name) => {
                write!(f, "Name '{}' must start with a letter or underscore", name)
            }
            ValidationError::ReservedKeyword(name) => {
                write!(f, "Name '{}' is a reserved SQL keyword", name)
            }
            ValidationError::TooManySegments { name, max_segments } => {
                write!(
                    f,
                    "Name '{}' has too many parts (at most {} dot-separated parts)",
                    name, max_segments
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// PostgreSQL identifier length limit
const MAX_SEGMENT_LENGTH: usize = 63;

/// Keywords that may never appear as a bare identifier
const RESERVED_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "MERGE", "FROM", "WHERE", "JOIN", "INNER", "LEFT",
    "RIGHT", "FULL", "OUTER", "CROSS", "ON", "AS", "AND", "OR", "NOT", "NULL", "TRUE", "FALSE",
    "CASE", "WHEN", "THEN", "ELSE", "END", "EXISTS", "IN", "IS", "LIKE", "ILIKE", "BETWEEN",
    "ORDER", "BY", "GROUP", "HAVING", "LIMIT", "OFFSET", "FETCH", "UNION", "INTERSECT", "EXCEPT",
    "ALL", "ANY", "DISTINCT", "CREATE", "DROP", "ALTER", "TRUNCATE", "GRANT", "REVOKE", "TABLE",
    "INTO", "VALUES", "SET", "WITH", "RETURNING", "ASC", "DESC",
];

fn is_reserved_keyword(name: &str) -> bool {
    RESERVED_KEYWORDS.contains(&name.to_ascii_uppercase().as_str())
}

/// Common validation logic for one identifier segment
fn validate_segment(segment: &str, full_name: &str) -> Result<(), ValidationError> {
    if segment.is_empty() {
        return Err(ValidationError::Empty);
    }

    if segment.len() > MAX_SEGMENT_LENGTH {
        return Err(ValidationError::TooLong {
            name: full_name.to_string(),
            length: segment.len(),
            max_length: MAX_SEGMENT_LENGTH,
        });
    }

    let first_char = segment.chars().next().ok_or(ValidationError::Empty)?;
    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(ValidationError::InvalidStartCharacter(full_name.to_string()));
    }

    if !segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidCharacters(full_name.to_string()));
    }

    if is_reserved_keyword(segment) {
        return Err(ValidationError::ReservedKeyword(full_name.to_string()));
    }

    Ok(())
}

/// Validate a dotted name with at most `max_segments` parts
fn validate_dotted(name: &str, max_segments: usize) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Empty);
    }

    let segments: Vec<&str> = name.split('.').collect();
    if segments.len() > max_segments {
        return Err(ValidationError::TooManySegments {
            name: name.to_string(),
            max_segments,
        });
    }

    for segment in segments {
        validate_segment(segment, name)?;
    }
    Ok(())
}

/// A validated table name (`table` or `schema.table`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedTableName(String);

impl ValidatedTableName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        validate_dotted(name, 2)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ValidatedTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated column reference (`column` or `alias.column`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedColumnRef(String);

impl ValidatedColumnRef {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        validate_dotted(name, 2)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ValidatedColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Utility functions for validation
pub mod utils {
    use super::*;

    pub fn validate_table_name(name: &str) -> Result<ValidatedTableName, ValidationError> {
        ValidatedTableName::new(name)
    }

    pub fn validate_column_ref(name: &str) -> Result<ValidatedColumnRef, ValidationError> {
        ValidatedColumnRef::new(name)
    }

    pub fn is_valid_table_name(name: &str) -> bool {
        ValidatedTableName::new(name).is_ok()
    }

    pub fn is_valid_column_ref(name: &str) -> bool {
        ValidatedColumnRef::new(name).is_ok()
    }
}
