//! Conversion between the gateway's timestamp ranges and the date / time-of-day
//! pairs shown to users.
//!
//! The gateway describes a free segment of a table with two nullable ISO-8601
//! instants. Users see and enter a calendar date plus an optional time for
//! each side. A missing start time means midnight and a missing end time means
//! 23:59 of the given day; a missing date means the side is unbounded.
//!
//! The sentinel rule is lossy: a start at exactly 00:00 (or an end at exactly
//! 23:59) comes back from [`wire_to_display`] without a time, so a booking that
//! genuinely starts at midnight cannot be told apart from "no start time".
//! Callers that care must look at the [`TimeRange`] instead.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{self, Display};

use crate::error::{Error, Result};

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Date pattern is well-formed"));
static TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("Time pattern is well-formed"));

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Time assumed for a display range start without an explicit time.
pub fn start_of_day() -> NaiveTime {
    NaiveTime::default()
}

/// Time assumed for a display range end without an explicit time.
pub fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default()
}

/// An interval as exchanged with the gateway. `None` on either side means the
/// interval is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn to_display(&self, id: impl Into<String>) -> DisplayRange {
        let (start_date, start_time) = match self.start {
            Some(start) => split_instant(start, start_of_day()),
            None => (None, None),
        };
        let (end_date, end_time) = match self.end {
            Some(end) => split_instant(end, end_of_day()),
            None => (None, None),
        };
        DisplayRange {
            id: id.into(),
            start_date,
            start_time,
            end_date,
            end_time,
        }
    }
}

/// An interval as shown to and entered by users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRange {
    pub id: String,
    pub start_date: Option<NaiveDate>,
    #[serde(serialize_with = "serialize_time_of_day")]
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    #[serde(serialize_with = "serialize_time_of_day")]
    pub end_time: Option<NaiveTime>,
}

impl DisplayRange {
    /// Build a display range from user input. Empty strings count as absent.
    pub fn parse(
        id: impl Into<String>,
        start_date: Option<&str>,
        start_time: Option<&str>,
        end_date: Option<&str>,
        end_time: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            start_date: non_empty(start_date).map(parse_date).transpose()?,
            start_time: non_empty(start_time).map(parse_time).transpose()?,
            end_date: non_empty(end_date).map(parse_date).transpose()?,
            end_time: non_empty(end_time).map(parse_time).transpose()?,
        })
    }

    /// The first instant covered by this range, `None` if unbounded.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start_date
            .map(|date| combine(date, self.start_time.unwrap_or_else(start_of_day)))
    }

    /// The last instant covered by this range, `None` if unbounded.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end_date
            .map(|date| combine(date, self.end_time.unwrap_or_else(end_of_day)))
    }

    /// `YYYY-MM-DD HH:MM` of the start, `None` if unbounded.
    pub fn start_label(&self) -> Option<String> {
        bound_label(self.start_date, self.start_time, start_of_day())
    }

    /// `YYYY-MM-DD HH:MM` of the end, `None` if unbounded.
    pub fn end_label(&self) -> Option<String> {
        bound_label(self.end_date, self.end_time, end_of_day())
    }

    pub fn is_unbounded(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }
}

impl Display for DisplayRange {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{} - {}",
            self.start_label().as_deref().unwrap_or(OPEN_LABEL),
            self.end_label().as_deref().unwrap_or(OPEN_LABEL)
        )
    }
}

/// How an unbounded side of a range is shown.
pub const OPEN_LABEL: &str = "open";

fn bound_label(
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    sentinel: NaiveTime,
) -> Option<String> {
    date.map(|date| {
        format!(
            "{} {}",
            date.format(DATE_FORMAT),
            time.unwrap_or(sentinel).format(TIME_FORMAT)
        )
    })
}

/// Convert a pair of nullable gateway timestamps into a display range.
pub fn wire_to_display(
    id: impl Into<String>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DisplayRange> {
    let range = TimeRange {
        start: start.map(parse_instant).transpose()?,
        end: end.map(parse_instant).transpose()?,
    };
    Ok(range.to_display(id))
}

/// Convert a display range into gateway timestamps.
///
/// The start date is mandatory since every reservation request has a concrete
/// start. Without an end date the returned range is open ended.
pub fn display_to_wire(range: &DisplayRange) -> Result<TimeRange> {
    let start_date = range.start_date.ok_or_else(|| Error::InvalidDateFormat {
        value: String::new(),
    })?;
    let start = combine(start_date, range.start_time.unwrap_or_else(start_of_day));
    let end = range
        .end_date
        .map(|end_date| combine(end_date, range.end_time.unwrap_or_else(end_of_day)));
    Ok(TimeRange {
        start: Some(start),
        end,
    })
}

/// Whether `[candidate_start, candidate_end]` lies entirely inside one of the
/// available ranges. An empty or inverted candidate is never contained.
pub fn range_contains(
    candidate_start: DateTime<Utc>,
    candidate_end: DateTime<Utc>,
    available: &[DisplayRange],
) -> bool {
    window_fits(candidate_start, Some(candidate_end), available)
}

/// Like [`range_contains`], but an open candidate end only fits in ranges that
/// are themselves unbounded at the end.
pub(crate) fn window_fits(
    candidate_start: DateTime<Utc>,
    candidate_end: Option<DateTime<Utc>>,
    available: &[DisplayRange],
) -> bool {
    if let Some(candidate_end) = candidate_end {
        if candidate_start >= candidate_end {
            return false;
        }
    }

    available.iter().any(|range| {
        let starts_in_time = range
            .start()
            .map_or(true, |range_start| range_start <= candidate_start);
        let ends_in_time = match (range.end(), candidate_end) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(range_end), Some(candidate_end)) => range_end >= candidate_end,
        };
        starts_in_time && ends_in_time
    })
}

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let invalid = || Error::InvalidDateFormat {
        value: value.to_owned(),
    };
    if !DATE_PATTERN.is_match(value) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

/// Parse a `HH:MM` time of day.
pub fn parse_time(value: &str) -> Result<NaiveTime> {
    let invalid = || Error::InvalidTimeFormat {
        value: value.to_owned(),
    };
    let captures = TIME_PATTERN.captures(value).ok_or_else(invalid)?;
    let hour = captures[1].parse::<u32>().map_err(|_| invalid())?;
    let minute = captures[2].parse::<u32>().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Parse a gateway timestamp. Offsets are normalised to UTC, timestamps
/// without an offset are read as UTC and a bare date is midnight UTC.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
                .or_else(|_| {
                    NaiveDate::parse_from_str(value, DATE_FORMAT)
                        .map(|date| date.and_time(start_of_day()))
                })
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
        .map_err(|_| Error::InvalidTimestamp {
            value: value.to_owned(),
        })
}

fn split_instant(
    instant: DateTime<Utc>,
    sentinel: NaiveTime,
) -> (Option<NaiveDate>, Option<NaiveTime>) {
    let naive = instant.naive_utc();
    let time = NaiveTime::from_hms_opt(naive.hour(), naive.minute(), 0);
    (Some(naive.date()), time.filter(|time| *time != sentinel))
}

fn combine(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(time))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn serialize_time_of_day<S: Serializer>(
    time: &Option<NaiveTime>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match time {
        Some(time) => serializer.collect_str(&time.format(TIME_FORMAT)),
        None => serializer.serialize_none(),
    }
}
