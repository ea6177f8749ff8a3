//! JSON projection of status histories
//!
//! Wire shape, keyed by entity id:
//!
//! ```json
//! { "DE-GDF": [["2024-01-01T12:00:00Z", "Available"], ...] }
//! ```
//!
//! Entries are newest first, same-second duplicates collapse to the first
//! (newest) entry, and only `history_size` entries are kept per entity.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use super::source::StatusSource;
use super::timestamped::Timestamped;
use crate::shared::errors::{DomainError, DomainResult};
use crate::shared::types::Paging;

pub const DEFAULT_PROJECTION_HISTORY_SIZE: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionOptions {
    /// Window over the entities, ordered by id
    pub paging: Paging,
    /// Entries kept per entity
    pub history_size: usize,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            paging: Paging::default(),
            history_size: DEFAULT_PROJECTION_HISTORY_SIZE,
        }
    }
}

/// Project the status histories of many entities into one JSON object.
pub fn project_history<'a, S, I>(sources: I, options: &ProjectionOptions) -> Value
where
    I: IntoIterator<Item = &'a S>,
    S: StatusSource + 'a,
    S::Id: Ord + fmt::Display,
    S::Value: fmt::Display,
{
    let mut sources: Vec<&S> = sources.into_iter().collect();
    sources.sort_by(|a, b| a.entity_id().cmp(b.entity_id()));

    let mut object = Map::new();
    for source in options.paging.apply(sources.into_iter()) {
        let mut history = source.status_history(None);
        history.dedup_by(|later, earlier| later.same_second(earlier));

        let entries: Vec<Value> = history
            .iter()
            .take(options.history_size)
            .map(|status| json!([status.iso8601(), status.value.to_string()]))
            .collect();

        object.insert(source.entity_id().to_string(), Value::Array(entries));
    }

    Value::Object(object)
}

/// Read a projection back into `(id, history)` pairs, ids as they appear on
/// the wire.
pub fn parse_history<T>(value: &Value) -> DomainResult<Vec<(String, Vec<Timestamped<T>>)>>
where
    T: FromStr<Err = DomainError>,
{
    let object = value
        .as_object()
        .ok_or_else(|| DomainError::InvalidProjection("expected a JSON object".into()))?;

    object
        .iter()
        .map(|(id, entries)| {
            let entries = entries.as_array().ok_or_else(|| {
                DomainError::InvalidProjection(format!("history of {} is not an array", id))
            })?;
            let history = entries
                .iter()
                .map(|entry| parse_entry(id, entry))
                .collect::<DomainResult<Vec<_>>>()?;
            Ok((id.clone(), history))
        })
        .collect()
}

fn parse_entry<T>(id: &str, entry: &Value) -> DomainResult<Timestamped<T>>
where
    T: FromStr<Err = DomainError>,
{
    let invalid = || DomainError::InvalidProjection(format!("malformed entry for {}: {}", id, entry));

    match entry.as_array().map(Vec::as_slice) {
        Some([Value::String(timestamp), Value::String(status)]) => {
            let timestamp = DateTime::parse_from_rfc3339(timestamp)
                .map_err(|_| invalid())?
                .with_timezone(&Utc);
            Ok(Timestamped::new(timestamp, status.parse()?))
        }
        _ => Err(invalid()),
    }
}
