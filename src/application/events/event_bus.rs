//! Broadcast bus for status transitions and push results
//!
//! Ledger listeners and the push service publish through the typed helpers
//! below; consumers either take everything or subscribe to one entity kind.

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::types::{Event, EventMessage, PushCompletedEvent, StatusChangedEvent};
use crate::domain::outcome::PushOutcome;
use crate::domain::status::{AdminStatusType, StatusType, StatusUpdate};

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventMessage>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish `event`, returning how many subscribers it reached.
    pub fn publish(&self, event: Event) -> usize {
        let message = EventMessage::new(event);
        let event_type = message.event.event_type();
        let entity_kind = message.event.entity_kind().to_string();
        let entity_id = message.event.entity_id().map(String::from);

        // An error only means nobody is listening.
        let reached = self.sender.send(message).unwrap_or(0);
        debug!(event_type, %entity_kind, ?entity_id, subscribers = reached, "Event published");
        reached
    }

    pub fn publish_admin_status_changed<Id: fmt::Display>(
        &self,
        entity_kind: &str,
        update: &StatusUpdate<Id, AdminStatusType>,
    ) -> usize {
        self.publish(Event::AdminStatusChanged(StatusChangedEvent::from_update(
            entity_kind,
            update,
        )))
    }

    pub fn publish_status_changed<Id: fmt::Display>(
        &self,
        entity_kind: &str,
        update: &StatusUpdate<Id, StatusType>,
    ) -> usize {
        self.publish(Event::StatusChanged(StatusChangedEvent::from_update(entity_kind, update)))
    }

    pub fn publish_push_completed<U>(
        &self,
        entity_kind: &str,
        operation: &str,
        items: usize,
        outcome: &PushOutcome<U>,
    ) -> usize {
        self.publish(Event::PushCompleted(PushCompletedEvent::from_outcome(
            entity_kind,
            operation,
            items,
            outcome,
        )))
    }

    /// Receive every event.
    pub fn subscribe(&self) -> EventSubscriber {
        EventSubscriber {
            receiver: self.sender.subscribe(),
            entity_kind: None,
        }
    }

    /// Receive only events about `entity_kind` (e.g. `"evse"`).
    pub fn subscribe_to(&self, entity_kind: &'static str) -> EventSubscriber {
        EventSubscriber {
            receiver: self.sender.subscribe(),
            entity_kind: Some(entity_kind),
        }
    }

    /// Live subscribers; dropped ones stop counting immediately.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EventSubscriber {
    receiver: broadcast::Receiver<EventMessage>,
    entity_kind: Option<&'static str>,
}

impl EventSubscriber {
    /// Next matching event, or `None` once the bus is gone. Lagging skips
    /// the missed events.
    pub async fn recv(&mut self) -> Option<EventMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(msg) if self.accepts(&msg) => return Some(msg),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, entity_kind = ?self.entity_kind, "Subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn accepts(&self, message: &EventMessage) -> bool {
        self.entity_kind
            .map_or(true, |kind| message.event.entity_kind() == kind)
    }
}

pub type SharedEventBus = Arc<EventBus>;

pub fn create_event_bus() -> SharedEventBus {
    Arc::new(EventBus::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::PushResultKind;
    use crate::domain::status::Timestamped;
    use chrono::{TimeZone, Utc};

    fn status_update(id: &str) -> StatusUpdate<String, StatusType> {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        StatusUpdate::new(
            id.to_string(),
            Timestamped::new(at, StatusType::Available),
            Timestamped::new(at, StatusType::Charging),
        )
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let outcome = PushOutcome::<u32>::success("hub").with_warning("slow");
        assert_eq!(bus.publish_push_completed("evse", "update_status", 2, &outcome), 2);

        for subscriber in [&mut first, &mut second] {
            match subscriber.recv().await.unwrap().event {
                Event::PushCompleted(e) => {
                    assert_eq!(e.sender_id, "hub");
                    assert_eq!(e.result, PushResultKind::Success);
                    assert_eq!(e.items, 2);
                    assert_eq!(e.warnings, vec!["slow".to_string()]);
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn kind_subscribers_skip_other_kinds() {
        let bus = EventBus::new();
        let mut evses = bus.subscribe_to("evse");

        bus.publish_status_changed("location", &status_update("LOC-1"));
        bus.publish_status_changed("evse", &status_update("EVSE-1"));

        let message = evses.recv().await.unwrap();
        assert_eq!(message.event.event_type(), "status_changed");
        assert_eq!(message.event.entity_id(), Some("EVSE-1"));
    }

    #[test]
    fn subscriber_count_follows_live_receivers() {
        let bus = create_event_bus();
        let first = bus.subscribe();
        let second = bus.subscribe_to("evse");
        assert_eq!(bus.subscriber_count(), 2);

        drop(first);
        assert_eq!(bus.subscriber_count(), 1);
        drop(second);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn publishing_without_subscribers_reaches_nobody() {
        let bus = EventBus::with_capacity(4);
        assert_eq!(bus.publish_status_changed("evse", &status_update("EVSE-1")), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
