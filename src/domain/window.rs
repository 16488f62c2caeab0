// Date window and clock zone handling
use chrono::{
    DateTime, Datelike, FixedOffset, Local, LocalResult, Months, NaiveDate, NaiveDateTime,
    NaiveTime, SecondsFormat, TimeZone, Utc,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq)]
pub enum WindowError {
    #[error("invalid date {value:?}: expected YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("start date {start} is after end date {end}")]
    Reversed { start: NaiveDate, end: NaiveDate },
    #[error("{0} does not exist in the configured time zone")]
    NonexistentLocalTime(NaiveDateTime),
}

/// Inclusive range of calendar dates selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WindowError> {
        if start > end {
            return Err(WindowError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, WindowError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Today through the same day next month.
    pub fn starting_on(today: NaiveDate) -> Self {
        let end = today
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self { start: today, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Absolute query bounds: start at midnight and end at 23:59 in `zone`.
    pub fn bounds(&self, zone: &ClockZone) -> Result<(DateTime<Utc>, DateTime<Utc>), WindowError> {
        let lower = zone.to_utc(self.start.and_time(NaiveTime::MIN))?;
        let upper_time = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN);
        let upper = zone.to_utc(self.end.and_time(upper_time))?;
        Ok((lower, upper))
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, WindowError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| WindowError::InvalidDate {
        value: value.to_string(),
    })
}

/// Zone used to anchor calendar dates and to render readable timestamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockZone {
    Local,
    Fixed(FixedOffset),
}

impl ClockZone {
    pub fn today(&self) -> NaiveDate {
        match self {
            ClockZone::Local => Local::now().date_naive(),
            ClockZone::Fixed(offset) => Utc::now().with_timezone(offset).date_naive(),
        }
    }

    pub fn to_utc(&self, naive: NaiveDateTime) -> Result<DateTime<Utc>, WindowError> {
        let resolved = match self {
            ClockZone::Local => earliest(Local.from_local_datetime(&naive)),
            ClockZone::Fixed(offset) => earliest(offset.from_local_datetime(&naive)),
        };
        resolved.ok_or(WindowError::NonexistentLocalTime(naive))
    }

    /// Renders an instant as `H:MM • D Month, YYYY` in this zone.
    pub fn readable(&self, instant: DateTime<Utc>) -> String {
        match self {
            ClockZone::Local => readable_in(instant.with_timezone(&Local)),
            ClockZone::Fixed(offset) => readable_in(instant.with_timezone(offset)),
        }
    }
}

fn earliest<Tz: TimeZone>(result: LocalResult<DateTime<Tz>>) -> Option<DateTime<Utc>> {
    result.earliest().map(|dt| dt.with_timezone(&Utc))
}

fn readable_in<Tz: TimeZone>(instant: DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!(
        "{} • {} {}",
        instant.format("%-H:%M"),
        instant.day(),
        instant.format("%B, %Y")
    )
}

/// Wire format for the remote API: ISO-8601 UTC with milliseconds.
pub fn wire_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
