//! ISO-8601 timestamps that remember the text they were parsed from.

use super::TaskDomainError;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

const NAIVE_ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Unit in which relative time offsets are expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeResolution {
    /// Offsets in seconds.
    Seconds,
    /// Offsets in minutes.
    #[default]
    Minutes,
    /// Offsets in hours.
    Hours,
}

impl TimeResolution {
    const fn millis_per_unit(self) -> f64 {
        match self {
            Self::Seconds => 1_000.0,
            Self::Minutes => 60_000.0,
            Self::Hours => 3_600_000.0,
        }
    }
}

/// A UTC instant paired with the exact ISO-8601 text it came from.
///
/// Payloads must serialise back to the strings they were received with, so
/// the original text is kept verbatim. Comparison and hashing only consider
/// the instant.
///
/// Offsets (`2024-01-01T10:00:00Z`, `2024-01-01T12:00:00+02:00`) are
/// converted to UTC; naive date-times (`2024-01-01T10:00:00`) are read as
/// UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp {
    instant: DateTime<Utc>,
    text: String,
}

impl Timestamp {
    /// Parses an ISO-8601 timestamp, keeping the original text.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTimestamp`] when the text is not an
    /// RFC 3339 or naive ISO-8601 date-time.
    pub fn parse(text: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = text.into();
        let trimmed = raw.trim();
        let instant = DateTime::parse_from_rfc3339(trimmed)
            .map(|parsed| parsed.with_timezone(&Utc))
            .or_else(|_| {
                NaiveDateTime::parse_from_str(trimmed, NAIVE_ISO_FORMAT)
                    .map(|naive| naive.and_utc())
            })
            .map_err(|_| TaskDomainError::InvalidTimestamp(raw.clone()))?;
        Ok(Self { instant, text: raw })
    }

    /// Wraps an in-process instant, rendering it as RFC 3339 with `Z`.
    #[must_use]
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            text: instant.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }

    /// Captures the current time from the given clock.
    #[must_use]
    pub fn now(clock: &impl Clock) -> Self {
        Self::from_datetime(clock.utc())
    }

    /// Returns the UTC instant.
    #[must_use]
    pub const fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Returns the ISO text this timestamp serialises to.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the signed distance from `origin` to this instant.
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "schedulers consume fractional offsets; millisecond spans fit f64 exactly"
    )]
    #[must_use]
    pub fn difference(&self, origin: DateTime<Utc>, resolution: TimeResolution) -> f64 {
        let millis = (self.instant - origin).num_milliseconds();
        millis as f64 / resolution.millis_per_unit()
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }
}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instant.hash(state);
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::from_datetime(instant)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Timestamp> for String {
    fn from(value: Timestamp) -> Self {
        value.text
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
