//! Time range parsing and time-bucket inference for history queries.

use crate::constants::time::{DASHBOARD_OFFSET_SECS, TIMESTAMP_INPUT_LAYOUT, TIMESTAMP_LAYOUT};
use crate::error::{Error, Result};
use chrono::{Duration, FixedOffset, NaiveDateTime, Offset, Utc};
use std::fmt;

/// Granularity at which history rows are aggregated by the stored query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBucket {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeBucket {
    /// Unit name as substituted into a history template.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBucket::Hour => "hour",
            TimeBucket::Day => "day",
            TimeBucket::Week => "week",
            TimeBucket::Month => "month",
            TimeBucket::Year => "year",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick a bucket for the span between `from` and `to`.
///
/// | span            | bucket |
/// |-----------------|--------|
/// | <= 24h          | hour   |
/// | < 32 days       | day    |
/// | < 93 days       | week   |
/// | < 740 days      | month  |
/// | otherwise       | year   |
///
/// A negative span falls into `hour`.
pub fn select_bucket(from: NaiveDateTime, to: NaiveDateTime) -> TimeBucket {
    let hours = (to - from).num_milliseconds() as f64 / 3_600_000.0;

    if hours <= 24.0 {
        TimeBucket::Hour
    } else if hours < 24.0 * 32.0 {
        TimeBucket::Day
    } else if hours < 24.0 * 93.0 {
        TimeBucket::Week
    } else if hours < 24.0 * 740.0 {
        TimeBucket::Month
    } else {
        TimeBucket::Year
    }
}

/// A client-supplied time range.
///
/// The raw strings are kept as given because they are what gets substituted
/// into templates; the parsed values only drive bucket inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    from_raw: String,
    to_raw: String,
    from: NaiveDateTime,
    to: NaiveDateTime,
}

impl TimeRange {
    /// Parse both ends using the dashboard timestamp layout.
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        Ok(Self {
            from: parse_timestamp(from)?,
            to: parse_timestamp(to)?,
            from_raw: from.to_owned(),
            to_raw: to.to_owned(),
        })
    }

    /// Range from optional client-supplied ends.
    ///
    /// Both ends present are parsed. With neither, the range falls back to
    /// the last `fallback_hours` when given; anything else is rejected.
    pub fn resolve(from: Option<&str>, to: Option<&str>, fallback_hours: Option<u32>) -> Result<Self> {
        match (from, to, fallback_hours) {
            (Some(from), Some(to), _) => Self::parse(from, to),
            (None, None, Some(hours)) => Ok(Self::last(hours)),
            _ => Err(Error::InvalidRequest("time_from and time_to are required".to_owned())),
        }
    }

    /// Range covering the last `hours` hours, ending now in UTC+8.
    pub fn last(hours: u32) -> Self {
        let offset = dashboard_offset();
        let to = Utc::now().with_timezone(&offset).naive_local();
        let from = to - Duration::hours(i64::from(hours));
        Self::from_naive(from, to)
    }

    pub(crate) fn from_naive(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Self {
            from_raw: from.format(TIMESTAMP_LAYOUT).to_string(),
            to_raw: to.format(TIMESTAMP_LAYOUT).to_string(),
            from,
            to,
        }
    }

    pub fn raw_from(&self) -> &str {
        &self.from_raw
    }

    pub fn raw_to(&self) -> &str {
        &self.to_raw
    }

    pub fn bucket(&self) -> TimeBucket {
        select_bucket(self.from, self.to)
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_INPUT_LAYOUT)
        .map_err(|e| Error::Parse(format!("invalid timestamp {:?}: {}", value, e)))
}

/// Fixed UTC+8 offset used for every rendered timestamp.
pub fn dashboard_offset() -> FixedOffset {
    FixedOffset::east_opt(DASHBOARD_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}
