// Minute-precision timestamp used as the uniqueness key of events
use crate::error::ParseError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const SLOT_FORMAT: &str = "%Y-%m-%dT%H:%M";
const SLOT_FORMAT_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

/// The calendar date and time of day an event occupies.
///
/// Seconds are always truncated, so two slots are equal exactly when they
/// print to the same `YYYY-MM-DDTHH:MM` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(NaiveDateTime);

impl Slot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Slot(date.and_time(truncate_to_minute(time)))
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.0.time()
    }

    /// Same time of day on another date.
    pub fn with_date(&self, date: NaiveDate) -> Self {
        Slot::new(date, self.time())
    }
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SLOT_FORMAT))
    }
}

impl FromStr for Slot {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveDateTime::parse_from_str(s, SLOT_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(s, SLOT_FORMAT_SECONDS))
            .map(|dt| Slot::new(dt.date(), dt.time()))
            .map_err(|_| ParseError::InvalidSlot(s.to_string()))
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
