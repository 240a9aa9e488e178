use crate::reading::error::ReadingError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub const DAY_MS: i64 = 86_400_000;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a date/time query parameter. Values without an offset are UTC;
/// a bare date means midnight.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, ReadingError> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ReadingError::InvalidDate(raw.to_string()))
}

/// Half-open window `[from, to)` in epoch millis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from_ms: i64,
    pub to_ms: i64,
}

impl TimeWindow {
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from_ms: from.timestamp_millis(),
            to_ms: to.timestamp_millis(),
        }
    }

    pub fn parse(from: &str, to: &str) -> Result<Self, ReadingError> {
        Ok(Self::between(parse_instant(from)?, parse_instant(to)?))
    }

    pub fn day(start: DateTime<Utc>) -> Self {
        let from_ms = start.timestamp_millis();
        Self {
            from_ms,
            to_ms: from_ms + DAY_MS,
        }
    }

    pub fn contains(&self, t_ms: i64) -> bool {
        self.from_ms <= t_ms && t_ms < self.to_ms
    }
}
