//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Database representation: RFC 3339 with fixed microsecond precision
///
/// Fixed width keeps lexical order equal to chronological order, so
/// `ORDER BY created_at` works on the TEXT column.
pub fn to_db_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Filename-safe timestamp, e.g. `20240105_134502_123`
pub fn to_file_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y%m%d_%H%M%S_%3f").to_string()
}
