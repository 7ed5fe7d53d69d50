//! Row-to-entity parsing helpers.
//!
//! Converts `libsql::Row` (column-indexed) values into typed task fields.
//! Bad data already in the table is reported as `DatabaseError::Query`, a
//! storage failure, not as a caller validation error.

use std::str::FromStr;

use chrono::NaiveDateTime;
use tw_core::errors::CoreError;
use tw_core::time::parse_timestamp;

use crate::error::DatabaseError;

/// Parse a required TEXT timestamp column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the text is not `"%Y-%m-%d %H:%M:%S"`.
pub fn parse_stored_timestamp(s: &str) -> Result<NaiveDateTime, DatabaseError> {
    parse_timestamp(s).map_err(|e| DatabaseError::Query(format!("Corrupt timestamp column: {e}")))
}

/// Parse an optional TEXT timestamp column. Empty text counts as NULL.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_timestamp(s: Option<&str>) -> Result<Option<NaiveDateTime>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_stored_timestamp(s)?)),
        _ => Ok(None),
    }
}

/// Parse a TEXT column into one of the tw-core enums.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any variant.
pub fn parse_enum<T: FromStr<Err = CoreError>>(s: &str) -> Result<T, DatabaseError> {
    s.parse()
        .map_err(|e: CoreError| DatabaseError::Query(format!("Corrupt enum column: {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}
