use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Trade timestamp as sent by the backend: epoch milliseconds or a datetime string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TradeTimestamp {
    EpochMillis(f64),
    Text(String),
}

impl TradeTimestamp {
    /// Resolves to an instant. Naive datetimes (no offset) are read as wall
    /// time in `zone`.
    pub fn resolve(&self, zone: &ClockZone) -> Option<DateTime<Utc>> {
        match self {
            Self::EpochMillis(ms) => {
                if !ms.is_finite() {
                    return None;
                }
                DateTime::<Utc>::from_timestamp_millis(ms.trunc() as i64)
            }
            Self::Text(raw) => {
                let raw = raw.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
                    return Some(dt.with_timezone(&Utc));
                }
                NAIVE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                    .and_then(|naive| zone.from_wall_clock(&naive))
            }
        }
    }
}

/// Zone used to turn instants into wall-clock time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockZone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl ClockZone {
    pub fn from_offset_minutes(minutes: Option<i32>) -> Result<Self, String> {
        match minutes {
            None => Ok(Self::Local),
            Some(m) => m
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .map(Self::Fixed)
                .ok_or_else(|| format!("invalid utc offset: {m} minutes")),
        }
    }

    fn from_wall_clock(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Self::Local => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Self::Fixed(offset) => offset
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    pub fn format(&self, instant: DateTime<Utc>, fmt: &str) -> String {
        match self {
            Self::Local => instant.with_timezone(&Local).format(fmt).to_string(),
            Self::Fixed(offset) => instant.with_timezone(offset).format(fmt).to_string(),
        }
    }
}
