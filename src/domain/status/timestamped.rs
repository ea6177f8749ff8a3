//! Timestamped status values

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A status value observed at a point in time.
///
/// The derived ordering compares the timestamp first and the value second;
/// [`Timestamped::cmp_value_first`] offers the opposite precedence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamped<T> {
    pub timestamp: DateTime<Utc>,
    pub value: T,
}

impl<T> Timestamped<T> {
    pub fn new(timestamp: DateTime<Utc>, value: T) -> Self {
        Self { timestamp, value }
    }

    /// Value observed now.
    pub fn now(value: T) -> Self {
        Self::new(Utc::now(), value)
    }

    /// ISO 8601 timestamp at second resolution, e.g. `2024-01-01T12:00:00Z`.
    pub fn iso8601(&self) -> String {
        format_iso8601(&self.timestamp)
    }

    /// Whether both values fall into the same ISO 8601 second.
    pub fn same_second(&self, other: &Self) -> bool {
        self.timestamp.timestamp() == other.timestamp.timestamp()
    }
}

impl<T: Ord> Timestamped<T> {
    pub fn cmp_value_first(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| self.timestamp.cmp(&other.timestamp))
    }
}

impl<T: fmt::Display> fmt::Display for Timestamped<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.value, self.iso8601())
    }
}

pub fn format_iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
