//! Time model: UTC instants on the wire, HH:mm time-of-day on a 15-minute
//! grid for recurring slots.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recurring slots snap to this grid.
pub const GRID_MINUTES: u32 = 15;

/// Lesson length used by recurring templates.
pub const LESSON_MINUTES: u32 = 60;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Wire format for instants: ISO-8601 UTC with milliseconds.
pub const UTC_MILLIS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A local time of day (HH:mm), always interpreted in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Minutes since midnight.
    pub fn minutes_from_midnight(&self) -> u32 {
        self.hour as u32 * 60 + self.minute as u32
    }

    /// Whether the minute lands on the 15-minute grid.
    pub fn on_grid(&self) -> bool {
        self.minute as u32 % GRID_MINUTES == 0
    }

    /// Whether a window of `duration_minutes` starting here stays within the
    /// same day. A 60-minute lesson must not cross midnight.
    pub fn fits_within_day(&self, duration_minutes: u32) -> bool {
        self.minutes_from_midnight() + duration_minutes <= MINUTES_PER_DAY
    }

    /// A valid recurring lesson slot: on the grid and not crossing midnight.
    pub fn is_valid_slot(&self) -> bool {
        self.on_grid() && self.fits_within_day(LESSON_MINUTES)
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0)
            .expect("hour and minute are range-checked at construction")
    }

    pub fn from_naive_time(t: NaiveTime) -> Self {
        use chrono::Timelike;
        Self {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
        }
    }

    /// Shift by whole hours, `None` when the result leaves the day.
    pub fn shifted_by_hours(&self, hours: i32) -> Option<Self> {
        let shifted = self.hour as i32 + hours;
        if (0..24).contains(&shifted) {
            Some(Self {
                hour: shifted as u8,
                minute: self.minute,
            })
        } else {
            None
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| format!("expected HH:mm, got {s:?}"))?;
        let hour: u8 = h.parse().map_err(|_| format!("invalid hour in {s:?}"))?;
        let minute: u8 = m.parse().map_err(|_| format!("invalid minute in {s:?}"))?;
        Self::new(hour, minute).ok_or_else(|| format!("time out of range: {s:?}"))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

/// Parse an ISO-8601 instant and normalize to UTC.
pub fn parse_utc(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format an instant in the wire format (`yyyy-MM-ddTHH:mm:ss.SSSZ`).
pub fn format_utc_millis(dt: DateTime<Utc>) -> String {
    dt.format(UTC_MILLIS_FORMAT).to_string()
}

/// Serde adapter forcing millisecond precision on outbound instants.
pub mod serde_utc_millis {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_utc_millis(*dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_utc(&s).ok_or_else(|| serde::de::Error::custom("invalid ISO-8601 UTC instant"))
    }
}

/// Optional-instant variant of [`serde_utc_millis`].
pub mod serde_utc_millis_opt {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        dt: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => serializer.serialize_some(&format_utc_millis(*dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        match s {
            None => Ok(None),
            Some(s) => parse_utc(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom("invalid ISO-8601 UTC instant")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_hh_mm() {
        let t: TimeOfDay = "09:45".parse().unwrap();
        assert_eq!(t.hour(), 9);
        assert_eq!(t.minute(), 45);
        assert_eq!(t.to_string(), "09:45");
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert!("24:00".parse::<TimeOfDay>().is_err());
        assert!("10:60".parse::<TimeOfDay>().is_err());
        assert!("1000".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn grid_validation() {
        assert!("10:00".parse::<TimeOfDay>().unwrap().on_grid());
        assert!("10:45".parse::<TimeOfDay>().unwrap().on_grid());
        assert!(!"10:10".parse::<TimeOfDay>().unwrap().on_grid());
    }

    #[test]
    fn lesson_must_not_cross_midnight() {
        assert!("23:00".parse::<TimeOfDay>().unwrap().is_valid_slot());
        assert!(!"23:15".parse::<TimeOfDay>().unwrap().is_valid_slot());
        assert!(!"23:30".parse::<TimeOfDay>().unwrap().is_valid_slot());
    }

    #[test]
    fn hour_shift_stays_within_day() {
        let t: TimeOfDay = "01:00".parse().unwrap();
        assert_eq!(t.shifted_by_hours(-1).unwrap().to_string(), "00:00");
        assert!(t.shifted_by_hours(-2).is_none());
        let late: TimeOfDay = "22:30".parse().unwrap();
        assert_eq!(late.shifted_by_hours(1).unwrap().to_string(), "23:30");
        assert!(late.shifted_by_hours(2).is_none());
    }

    #[test]
    fn instant_wire_format_has_millis() {
        let dt = parse_utc("2030-01-15T09:00:00Z").unwrap();
        assert_eq!(format_utc_millis(dt), "2030-01-15T09:00:00.000Z");
        let dt = parse_utc("2030-01-15T09:00:00.250Z").unwrap();
        assert_eq!(format_utc_millis(dt), "2030-01-15T09:00:00.250Z");
    }

    #[test]
    fn parse_utc_rejects_garbage() {
        assert!(parse_utc("not-a-date").is_none());
        assert!(parse_utc("2030-13-01T00:00:00Z").is_none());
    }
}
