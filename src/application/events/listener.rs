//! Bridge from ledger listeners onto the event bus

use std::fmt;

use crate::domain::status::{
    AdminStatusType, ListenerError, StatusListener, StatusType, StatusUpdate,
};

use super::event_bus::SharedEventBus;

/// Publishes every status transition it is told about.
///
/// Register one on an admin-status ledger to get `AdminStatusChanged`
/// events, on a status ledger to get `StatusChanged` events.
#[derive(Clone)]
pub struct EventBusListener {
    bus: SharedEventBus,
    entity_kind: &'static str,
}

impl EventBusListener {
    pub fn new(bus: SharedEventBus, entity_kind: &'static str) -> Self {
        Self { bus, entity_kind }
    }
}

impl<Id: fmt::Display> StatusListener<Id, AdminStatusType> for EventBusListener {
    fn on_status_changed(
        &self,
        update: &StatusUpdate<Id, AdminStatusType>,
    ) -> Result<(), ListenerError> {
        self.bus.publish_admin_status_changed(self.entity_kind, update);
        Ok(())
    }
}

impl<Id: fmt::Display> StatusListener<Id, StatusType> for EventBusListener {
    fn on_status_changed(&self, update: &StatusUpdate<Id, StatusType>) -> Result<(), ListenerError> {
        self.bus.publish_status_changed(self.entity_kind, update);
        Ok(())
    }
}
