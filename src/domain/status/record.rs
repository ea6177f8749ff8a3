//! Status snapshots and transitions

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::timestamped::Timestamped;

/// Point-in-time copy of an entity's current status
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusRecord<Id, T> {
    pub id: Id,
    pub status: Timestamped<T>,
}

impl<Id, T> StatusRecord<Id, T> {
    pub fn new(id: Id, status: Timestamped<T>) -> Self {
        Self { id, status }
    }
}

impl<Id: Clone + Eq + Hash, T> StatusRecord<Id, T> {
    /// Merge records that may repeat entity ids (re-delivered feeds,
    /// several upstream sources) down to one record per id.
    ///
    /// The record with the latest timestamp wins. Records whose timestamps
    /// render to the same ISO 8601 second collide and the first one seen is
    /// kept. Output follows the order in which each id first appeared.
    pub fn deduplicate(records: impl IntoIterator<Item = Self>) -> Vec<Self> {
        let mut positions: HashMap<Id, usize> = HashMap::new();
        let mut kept: Vec<Self> = Vec::new();

        for record in records {
            match positions.get(&record.id) {
                Some(&position) => {
                    let current = &kept[position].status.timestamp;
                    if record.status.timestamp.timestamp() > current.timestamp() {
                        kept[position] = record;
                    }
                }
                None => {
                    positions.insert(record.id.clone(), kept.len());
                    kept.push(record);
                }
            }
        }

        kept
    }
}

/// Exactly one status transition of an entity.
///
/// Ordered by id, then new status, then old status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusUpdate<Id, T> {
    pub id: Id,
    pub old_status: Timestamped<T>,
    pub new_status: Timestamped<T>,
}

impl<Id, T> StatusUpdate<Id, T> {
    pub fn new(id: Id, old_status: Timestamped<T>, new_status: Timestamped<T>) -> Self {
        Self {
            id,
            old_status,
            new_status,
        }
    }
}

impl<Id: Ord, T: Ord> Ord for StatusUpdate<Id, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.new_status.cmp(&other.new_status))
            .then_with(|| self.old_status.cmp(&other.old_status))
    }
}

impl<Id: Ord, T: Ord> PartialOrd for StatusUpdate<Id, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identifier::ProviderId;
    use crate::domain::status::StatusType;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn record(id: &str, at: DateTime<Utc>, status: StatusType) -> StatusRecord<ProviderId, StatusType> {
        StatusRecord::new(ProviderId::parse(id).unwrap(), Timestamped::new(at, status))
    }

    #[test]
    fn newest_record_per_id_survives() {
        let merged = StatusRecord::deduplicate(vec![
            record("FR-ABC", t(1), StatusType::Available),
            record("FR-ABC", t(2), StatusType::OutOfService),
        ]);

        assert_eq!(merged, vec![record("FR-ABC", t(2), StatusType::OutOfService)]);
    }

    #[test]
    fn older_redelivery_does_not_replace_newer() {
        let merged = StatusRecord::deduplicate(vec![
            record("FR-ABC", t(5), StatusType::Charging),
            record("FR-ABC", t(3), StatusType::Available),
        ]);

        assert_eq!(merged, vec![record("FR-ABC", t(5), StatusType::Charging)]);
    }

    #[test]
    fn same_second_collision_keeps_first_seen() {
        let first = record("DE-GDF", t(10), StatusType::Available);
        let second = record(
            "DE-GDF",
            t(10) + Duration::milliseconds(400),
            StatusType::Offline,
        );

        let merged = StatusRecord::deduplicate(vec![first.clone(), second]);

        assert_eq!(merged, vec![first]);
    }

    #[test]
    fn ids_keep_first_appearance_order_and_formats_collapse() {
        let merged = StatusRecord::deduplicate(vec![
            record("NL-XYZ", t(1), StatusType::Available),
            record("DE*GDF", t(1), StatusType::Available),
            record("NLXYZ", t(2), StatusType::Charging),
        ]);

        let ids: Vec<String> = merged.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["NLXYZ", "DE*GDF"]);
        assert_eq!(merged[0].status.value, StatusType::Charging);
    }

    #[test]
    fn updates_order_by_id_then_new_then_old() {
        let id_a = ProviderId::parse("DE-AAA").unwrap();
        let id_b = ProviderId::parse("DE-BBB").unwrap();
        let old = Timestamped::new(t(0), StatusType::Available);

        let a_late = StatusUpdate::new(id_a.clone(), old.clone(), Timestamped::new(t(2), StatusType::Charging));
        let a_early = StatusUpdate::new(id_a, old.clone(), Timestamped::new(t(1), StatusType::Charging));
        let b_early = StatusUpdate::new(id_b, old, Timestamped::new(t(1), StatusType::Charging));

        let mut updates = vec![b_early.clone(), a_late.clone(), a_early.clone()];
        updates.sort();
        assert_eq!(updates, vec![a_early, a_late, b_early]);
    }
}
