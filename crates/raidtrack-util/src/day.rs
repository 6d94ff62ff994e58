//! Day-of-week names used to key character schedules

use chrono::{DateTime, Datelike, TimeZone, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A day of the week, ordered Sunday first to match how schedules are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayName {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayName {
    pub const ALL: [DayName; 7] = [
        DayName::Sunday,
        DayName::Monday,
        DayName::Tuesday,
        DayName::Wednesday,
        DayName::Thursday,
        DayName::Friday,
        DayName::Saturday,
    ];

    /// The day name for a local (or any zoned) timestamp
    pub fn of<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self::from(dt.weekday())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayName::Sunday => "Sunday",
            DayName::Monday => "Monday",
            DayName::Tuesday => "Tuesday",
            DayName::Wednesday => "Wednesday",
            DayName::Thursday => "Thursday",
            DayName::Friday => "Friday",
            DayName::Saturday => "Saturday",
        }
    }

    pub fn weekday(&self) -> Weekday {
        match self {
            DayName::Sunday => Weekday::Sun,
            DayName::Monday => Weekday::Mon,
            DayName::Tuesday => Weekday::Tue,
            DayName::Wednesday => Weekday::Wed,
            DayName::Thursday => Weekday::Thu,
            DayName::Friday => Weekday::Fri,
            DayName::Saturday => Weekday::Sat,
        }
    }
}

impl From<Weekday> for DayName {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => DayName::Sunday,
            Weekday::Mon => DayName::Monday,
            Weekday::Tue => DayName::Tuesday,
            Weekday::Wed => DayName::Wednesday,
            Weekday::Thu => DayName::Thursday,
            Weekday::Fri => DayName::Friday,
            Weekday::Sat => DayName::Saturday,
        }
    }
}

impl fmt::Display for DayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a recognizable day name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown day: {0}")]
pub struct UnknownDay(pub String);

impl FromStr for DayName {
    type Err = UnknownDay;

    /// Accepts full names and three-letter abbreviations, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sun" | "sunday" => Ok(DayName::Sunday),
            "mon" | "monday" => Ok(DayName::Monday),
            "tue" | "tuesday" => Ok(DayName::Tuesday),
            "wed" | "wednesday" => Ok(DayName::Wednesday),
            "thu" | "thursday" => Ok(DayName::Thursday),
            "fri" | "friday" => Ok(DayName::Friday),
            "sat" | "saturday" => Ok(DayName::Saturday),
            _ => Err(UnknownDay(s.to_string())),
        }
    }
}

impl Serialize for DayName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DayName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
