//! Input normalization
//!
//! Title and deadline are strict: bad values are rejected with a 400.
//! Tag and recurrence are lenient: blank or unknown values mean "none".

use chrono::NaiveDate;

use super::status::TaskStatus;
use crate::types::BoggaError;

pub const MISSING_TITLE: &str = "Missing title";
pub const INVALID_DEADLINE: &str = "Invalid deadline";
pub const INVALID_STATUS: &str = "Invalid status";

/// Parse a strict `YYYY-MM-DD` calendar date
pub(crate) fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Trimmed, non-empty title
pub fn normalize_title(value: Option<&str>) -> Result<String, BoggaError> {
    match value.map(str::trim) {
        Some(title) if !title.is_empty() => Ok(title.to_string()),
        _ => Err(BoggaError::bad_request(MISSING_TITLE)),
    }
}

/// Canonical `YYYY-MM-DD` deadline, or `None` when blank or invalid
pub fn normalize_deadline(value: &str) -> Option<String> {
    parse_calendar_date(value.trim())
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Deadline from client input.
///
/// Absent, null and blank clear the deadline. Anything else must be a
/// valid calendar date.
pub fn parse_deadline(value: Option<&str>) -> Result<Option<String>, BoggaError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => normalize_deadline(raw)
            .map(Some)
            .ok_or_else(|| BoggaError::bad_request(INVALID_DEADLINE)),
    }
}

/// Trimmed tag; blank means no tag
pub fn normalize_tag(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
}

/// Status accepted by a task patch.
///
/// Deletion has its own operation, so only `open` and `done` are accepted.
pub fn parse_patch_status(value: Option<&str>) -> Result<TaskStatus, BoggaError> {
    match value.map(str::parse::<TaskStatus>) {
        Some(Ok(status @ (TaskStatus::Open | TaskStatus::Done))) => Ok(status),
        _ => Err(BoggaError::bad_request(INVALID_STATUS)),
    }
}
