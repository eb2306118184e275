use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

use crate::error::ApiError;

/// A required text field: absent, empty and whitespace-only all count as missing.
pub fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// An optional text field: blanks are stored as NULL.
pub fn optional(value: Option<String>) -> Option<String> {
    required(value)
}

pub fn missing(message: &str) -> ApiError {
    ApiError::Validation(message.to_string())
}

pub fn planting_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ApiError::Validation(format!("Invalid plantingDate '{}', expected YYYY-MM-DD", value))
    })
}

/// Parse a stored timestamp. Rows written by the migrations carry RFC 3339;
/// rows written by hand in the sqlite shell usually carry `YYYY-MM-DD HH:MM:SS`.
pub fn stored_timestamp(value: &str, record: &str) -> DateTime<Utc> {
    value
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on {}: {}", value, record, e);
            DateTime::default()
        })
}
