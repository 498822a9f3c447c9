//! Recurrence rules and next-occurrence projection
//!
//! Monthly projection follows calendar overflow: the day of month is kept
//! and any excess days roll into the following month, so `2026-01-31`
//! projects to `2026-03-03`, not to the last day of February.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::validate::parse_calendar_date;

/// Largest year a `YYYY-MM-DD` deadline can carry
const MAX_YEAR: i32 = 9999;

/// How often a task repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceRule {
    Daily,
    Weekly,
    Monthly,
}

impl RecurrenceRule {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Parse a stored rule
    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// Normalize client input.
    ///
    /// Strings are trimmed and lowercased before matching. Anything that is
    /// not a recognised rule (null, empty, numbers, unknown words) means
    /// "no recurrence" rather than an error.
    pub fn normalize(value: Option<&Value>) -> Option<Self> {
        let raw = value?.as_str()?;
        Self::from_stored(&raw.trim().to_ascii_lowercase())
    }

    /// Date of the next occurrence after `base`.
    ///
    /// `None` when the result would not fit a four-digit year.
    pub fn next_after(self, base: NaiveDate) -> Option<NaiveDate> {
        let next = match self {
            Self::Daily => base.checked_add_days(Days::new(1)),
            Self::Weekly => base.checked_add_days(Days::new(7)),
            Self::Monthly => add_month_with_overflow(base),
        }?;
        (next.year() <= MAX_YEAR).then_some(next)
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Same day-of-month in the next month; surplus days spill forward.
fn add_month_with_overflow(base: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if base.month() == 12 {
        (base.year() + 1, 1)
    } else {
        (base.year(), base.month() + 1)
    };
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_days(Days::new(u64::from(base.day() - 1)))
}

/// Deadline for the task spawned when a recurring task is completed.
///
/// The base is the task's deadline, or `today` when it has none. Returns
/// `None` when the base deadline cannot be parsed as `YYYY-MM-DD` or the
/// next occurrence falls after year 9999.
pub fn next_recurring_deadline(
    deadline: Option<&str>,
    rule: RecurrenceRule,
    today: NaiveDate,
) -> Option<String> {
    let base = match deadline {
        Some(value) => parse_calendar_date(value)?,
        None => today,
    };
    rule.next_after(base)
        .map(|date| date.format("%Y-%m-%d").to_string())
}
