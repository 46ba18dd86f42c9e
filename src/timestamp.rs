//! Persisted timestamp codec.
//!
//! Lock expiry and last-changed times are stored as local wall-clock
//! strings of the fixed form `YYYY-MM-DD HH:MM:SS`.

use chrono::NaiveDateTime;

use crate::error::ReadError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a persisted timestamp.  Surrounding whitespace is tolerated.
pub fn parse(raw: &str) -> Result<NaiveDateTime, ReadError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ReadError::Missing("timestamp"));
    }
    NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT)
        .map_err(|_| ReadError::Malformed("timestamp"))
}

pub fn format(t: NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}
