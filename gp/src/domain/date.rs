//! Lenient calendar-date parsing
//!
//! Dates arrive from users, snapshot files and advisory sources in a handful
//! of ISO-8601 shapes. Everything is reduced to a `NaiveDate` (or midnight
//! `NaiveDateTime`) before it reaches the scheduling engine.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer};

/// Parse a date or date-time string, keeping the time component
///
/// Accepted forms: `2025-04-03`, `2025-04-03T10:30:00`, `2025-04-03 10:30:00`,
/// fractional seconds, and RFC 3339 with an offset (the offset is dropped and
/// the wall-clock time kept).
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(at_midnight)
}

/// Parse a date or date-time string, truncated to the calendar day
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    parse_datetime(raw).map(|dt| dt.date())
}

/// Midnight at the start of `day`
pub fn at_midnight(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// Serde helper for optional date-time fields that may be written as either a
/// plain date or a full date-time. Unparseable strings are an error.
pub fn deserialize_opt_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_datetime(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
    }
}
