//! Calendar dates without a time of day or time zone.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::Snafu;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// The only accepted wire format for a [`PlainDate`].
const FORMAT: &str = "%Y-%m-%d";

/// Error returned when a string is not a full ISO-8601 calendar date.
#[derive(Clone, Debug, PartialEq, Eq, Snafu)]
#[snafu(display("{value:?} is not a full-date ISO8601 string such as 1970-01-01"))]
pub struct ParseDateError {
    value: String,
}

/// A calendar date, serialized as `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlainDate(NaiveDate);

impl PlainDate {
    /// Create a date from its components, if they form a valid date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The instant at midnight UTC on this date.
    pub fn to_utc_midnight(self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0.and_time(NaiveTime::default()))
    }

    /// The calendar date of `instant` according to its UTC year, month and day.
    ///
    /// The time of day is discarded.
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self(instant.date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

/// Check that `s` has the exact shape `DDDD-DD-DD`.
///
/// `chrono` is lenient about padding and signs, so the shape is checked before parsing.
fn is_full_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

impl FromStr for PlainDate {
    type Err = ParseDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_full_date_shape(s) {
            return Err(ParseDateError { value: s.into() });
        }
        NaiveDate::parse_from_str(s, FORMAT)
            .map(Self)
            .map_err(|_| ParseDateError { value: s.into() })
    }
}

impl Display for PlainDate {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl From<NaiveDate> for PlainDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<PlainDate> for NaiveDate {
    fn from(date: PlainDate) -> Self {
        date.0
    }
}

impl Serialize for PlainDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlainDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let date: PlainDate = "2020-02-29".parse().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2020, 2, 29));
        assert_eq!(date.to_string(), "2020-02-29");
    }

    #[test]
    fn test_parse_invalid() {
        for s in [
            "1970-13-40",
            "not-a-date",
            "2021-02-29",
            "1970-1-01",
            "+1970-01-01",
            "1970-01-01T00:00:00Z",
            "19700101",
            "",
        ] {
            assert!(s.parse::<PlainDate>().is_err(), "{s} should not parse");
        }
    }

    #[test]
    fn test_utc_round_trip() {
        for s in [
            "1970-01-01",
            "1979-04-12",
            "1999-12-31",
            "2000-01-01",
            "2000-02-28",
            "2020-02-29",
            "2020-03-01",
            "2021-12-31",
            "0001-01-01",
            "9999-12-31",
        ] {
            let date: PlainDate = s.parse().unwrap();
            let instant = date.to_utc_midnight();
            assert_eq!(instant.to_rfc3339(), format!("{s}T00:00:00+00:00"));
            assert_eq!(PlainDate::from_utc(instant).to_string(), s);
        }
    }

    #[test]
    fn test_from_utc_discards_time_of_day() {
        let instant = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(PlainDate::from_utc(instant).to_string(), "1999-12-31");
    }

    #[test]
    fn test_serde() {
        let date = PlainDate::from_ymd(1980, 10, 1).unwrap();
        let json = serde_json::to_value(date).unwrap();
        assert_eq!(json, serde_json::json!("1980-10-01"));
        assert_eq!(serde_json::from_value::<PlainDate>(json).unwrap(), date);
        assert!(serde_json::from_value::<PlainDate>(serde_json::json!("1980-10-1")).is_err());
    }
}
