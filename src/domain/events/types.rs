//! Notification events
//!
//! Defines all event types that can be broadcasted to subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::outcome::{PushOutcome, PushResultKind};
use crate::domain::status::{StatusUpdate, StatusValue};

/// Event types for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    AdminStatusChanged(StatusChangedEvent),
    StatusChanged(StatusChangedEvent),
    PushCompleted(PushCompletedEvent),
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::AdminStatusChanged(_) => "admin_status_changed",
            Event::StatusChanged(_) => "status_changed",
            Event::PushCompleted(_) => "push_completed",
        }
    }

    pub fn entity_kind(&self) -> &str {
        match self {
            Event::AdminStatusChanged(e) | Event::StatusChanged(e) => &e.entity_kind,
            Event::PushCompleted(e) => &e.entity_kind,
        }
    }

    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Event::AdminStatusChanged(e) | Event::StatusChanged(e) => Some(&e.entity_id),
            Event::PushCompleted(_) => None,
        }
    }
}

/// One status transition, rendered for the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangedEvent {
    pub entity_kind: String,
    pub entity_id: String,
    pub old_status: String,
    pub new_status: String,
    pub old_timestamp: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
}

impl StatusChangedEvent {
    pub fn from_update<Id, T>(entity_kind: &str, update: &StatusUpdate<Id, T>) -> Self
    where
        Id: std::fmt::Display,
        T: StatusValue,
    {
        Self {
            entity_kind: entity_kind.to_string(),
            entity_id: update.id.to_string(),
            old_status: update.old_status.value.to_string(),
            new_status: update.new_status.value.to_string(),
            old_timestamp: update.old_status.timestamp,
            timestamp: update.new_status.timestamp,
        }
    }
}

/// Summary of one fan-out push to all targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushCompletedEvent {
    pub entity_kind: String,
    pub operation: String,
    pub sender_id: String,
    pub result: PushResultKind,
    pub items: usize,
    pub rejected: usize,
    pub warnings: Vec<String>,
    pub runtime_ms: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

impl PushCompletedEvent {
    pub fn from_outcome<U>(
        entity_kind: &str,
        operation: &str,
        items: usize,
        outcome: &PushOutcome<U>,
    ) -> Self {
        Self {
            entity_kind: entity_kind.to_string(),
            operation: operation.to_string(),
            sender_id: outcome.sender_id.clone(),
            result: outcome.kind,
            items,
            rejected: outcome.rejected.len(),
            warnings: outcome.warnings.iter().map(|w| w.to_string()).collect(),
            runtime_ms: outcome.runtime.map(|r| r.as_millis() as u64),
            timestamp: Utc::now(),
        }
    }
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}
