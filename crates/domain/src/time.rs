//! Wall-clock helpers.
//!
//! Event times are local wall-clock times with minute resolution. All
//! scheduling math works on naive local timestamps so the same arithmetic
//! runs against the real clock and against a virtual one in tests.

use std::fmt;
use std::str::FromStr;

use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Local wall-clock timestamp.
pub type Timestamp = NaiveDateTime;

/// Return the current local wall-clock time.
#[must_use]
pub fn now() -> Timestamp {
    Local::now().naive_local()
}

/// `ts` moved forward by `d`.
#[must_use]
pub fn after(ts: Timestamp, d: Duration) -> Timestamp {
    ts + TimeDelta::from_std(d).unwrap_or_else(|_| TimeDelta::zero())
}

/// Time from `earlier` to `later`, zero when `later` is not after `earlier`.
#[must_use]
pub fn since(later: Timestamp, earlier: Timestamp) -> Duration {
    (later - earlier).to_std().unwrap_or(Duration::ZERO)
}

/// A time of day at minute resolution, persisted as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    /// Build from an hour (`0..=23`) and a minute (`0..=59`).
    #[must_use]
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self {
            hour: u8::try_from(hour).ok()?,
            minute: u8::try_from(minute).ok()?,
        })
    }

    /// The minute of the day a timestamp falls in (seconds are dropped).
    #[must_use]
    pub fn of(ts: Timestamp) -> Self {
        Self {
            hour: u8::try_from(ts.hour()).unwrap_or(0),
            minute: u8::try_from(ts.minute()).unwrap_or(0),
        }
    }

    #[must_use]
    pub fn hour(self) -> u32 {
        u32::from(self.hour)
    }

    #[must_use]
    pub fn minute(self) -> u32 {
        u32::from(self.minute)
    }

    #[must_use]
    pub fn as_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }

    /// Anchor this time of day on a calendar date.
    #[must_use]
    pub fn on(self, date: NaiveDate) -> Timestamp {
        date.and_time(self.as_naive_time())
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::TimeOfDay(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Parse a persisted `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`ParseError::Date`] when the text is not a valid calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ParseError::Date(s.to_string()))
}
