use std::{fmt, ops::Deref};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use strum_macros::EnumIter;

/// PUE above which a reading is flagged as inefficient
pub const PUE_THRESHOLD: f64 = 1.8;

#[derive(thiserror::Error, Debug)]
pub enum ReadingError {
    #[error(r#"timestamp "{0}" is not recognized, expected "YYYY-MM-DD HH:MM:SS" or RFC 3339"#)]
    Timestamp(String),
}
type Result<T> = std::result::Result<T, ReadingError>;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses a date-time the way the readings CSV writes them
///
/// Accepts `YYYY-MM-DD HH:MM[:SS[.fff]]` (with either a space or a `T`
/// separator), RFC 3339 timestamps, which are converted to UTC, and bare
/// `YYYY-MM-DD` dates, set at midnight.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|t| t.naive_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| ReadingError::Timestamp(value.to_string()))
}

/// Serde adapter for the `timestamp` column
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&timestamp.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(de::Error::custom)
    }
}

/// Power Usage Effectiveness: total facility power over IT equipment power
///
/// There is no guard against a zero IT power: the result is then infinite
/// (or NaN if the total power is zero too).
pub fn pue(total_power: f64, it_power: f64) -> f64 {
    total_power / it_power
}

/// Efficiency status of a reading
#[derive(EnumIter, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Efficient,
    Inefficient,
}
impl Status {
    /// Classifies a PUE value against [PUE_THRESHOLD]
    ///
    /// The comparison is strict: a PUE of exactly 1.8 is efficient.
    pub fn classify(pue: f64) -> Self {
        if pue > PUE_THRESHOLD {
            Status::Inefficient
        } else {
            Status::Efficient
        }
    }
    pub fn is_efficient(&self) -> bool {
        *self == Status::Efficient
    }
    /// Label with a status marker, as shown in the dashboard
    pub fn label(&self) -> &'static str {
        match self {
            Status::Efficient => "✅ Efficient",
            Status::Inefficient => "⚠️ Inefficient",
        }
    }
}
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Efficient => write!(f, "Efficient"),
            Status::Inefficient => write!(f, "Inefficient"),
        }
    }
}

/// A raw sample of the data centre power monitor
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    /// IT equipment power [kW]
    pub it_power: f64,
    /// total facility power [kW]
    pub total_power: f64,
    /// outside temperature [C]
    pub outside_temp: f64,
}
impl Reading {
    pub fn new(
        timestamp: NaiveDateTime,
        it_power: f64,
        total_power: f64,
        outside_temp: f64,
    ) -> Self {
        Self {
            timestamp,
            it_power,
            total_power,
            outside_temp,
        }
    }
    pub fn pue(&self) -> f64 {
        pue(self.total_power, self.it_power)
    }
    /// Derives the PUE and the efficiency status of the reading
    pub fn derive(self) -> DerivedReading {
        let pue = self.pue();
        DerivedReading {
            reading: self,
            pue,
            status: Status::classify(pue),
        }
    }
}

/// A [Reading] with its PUE and efficiency status
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedReading {
    reading: Reading,
    pue: f64,
    status: Status,
}
impl From<Reading> for DerivedReading {
    fn from(reading: Reading) -> Self {
        reading.derive()
    }
}
impl Deref for DerivedReading {
    type Target = Reading;

    fn deref(&self) -> &Self::Target {
        &self.reading
    }
}
impl DerivedReading {
    pub fn reading(&self) -> &Reading {
        &self.reading
    }
    pub fn pue(&self) -> f64 {
        self.pue
    }
    pub fn status(&self) -> Status {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn pue_is_total_over_it() {
        let reading = Reading::new(at(0), 120., 210., 20.).derive();
        assert_eq!(reading.pue(), 210. / 120.);
        assert_eq!(reading.pue(), 1.75);
        assert_eq!(reading.status(), Status::Efficient);
    }

    #[test]
    fn threshold_is_strict() {
        assert_eq!(Status::classify(1.8), Status::Efficient);
        assert_eq!(Status::classify(1.8 + 1e-12), Status::Inefficient);
        assert_eq!(Status::classify(1.2), Status::Efficient);
        assert_eq!(Status::classify(2.5), Status::Inefficient);
        let reading = Reading::new(at(2), 150., 270., 25.).derive();
        assert_eq!(reading.pue(), 1.8);
        assert!(reading.status().is_efficient());
    }

    #[test]
    fn zero_it_power_is_not_guarded() {
        let reading = Reading::new(at(0), 0., 100., 20.).derive();
        assert!(reading.pue().is_infinite());
        assert_eq!(reading.status(), Status::Inefficient);
        let reading = Reading::new(at(0), 0., 0., 20.).derive();
        assert!(reading.pue().is_nan());
        assert_eq!(reading.status(), Status::Efficient);
    }

    #[test]
    fn timestamps() {
        let expected = at(13) + chrono::Duration::minutes(30);
        assert_eq!(parse_timestamp("2024-01-01 13:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-01T13:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-01 13:30").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-01-01T14:30:00+01:00").unwrap(),
            expected
        );
        assert_eq!(parse_timestamp("2024-01-01").unwrap(), at(0));
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(ReadingError::Timestamp(_))
        ));
    }

    #[test]
    fn status_labels() {
        assert_eq!(Status::Efficient.to_string(), "Efficient");
        assert_eq!(Status::Inefficient.label(), "⚠️ Inefficient");
    }
}
