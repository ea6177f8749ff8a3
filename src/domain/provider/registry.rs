//! Providers of one roaming network

use std::time::Instant;

use futures_util::future::join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::model::EMobilityProvider;
use crate::domain::arena::{EntityArena, Handle};
use crate::domain::entity::{AdminStatusUpdate, EnergyStatusUpdate, Evse, OperationalStatusUpdate};
use crate::domain::identifier::{EntityId, ProviderId};
use crate::domain::outcome::{flatten, PushOutcome};
use crate::domain::status::{
    project_history, AdminStatusType, ProjectionOptions, StatusRecord, StatusType,
};
use crate::shared::errors::{DomainError, DomainResult};

pub struct ProviderRegistry {
    network_id: EntityId,
    providers: EntityArena<ProviderId, EMobilityProvider>,
}

impl ProviderRegistry {
    pub fn new(network_id: EntityId) -> Self {
        Self {
            network_id,
            providers: EntityArena::new(),
        }
    }

    pub fn network_id(&self) -> &EntityId {
        &self.network_id
    }

    pub fn register(&mut self, provider: EMobilityProvider) -> DomainResult<Handle> {
        let id = provider.id().clone();
        let handle = self.providers.insert(id.clone(), provider)?;
        info!(network = %self.network_id, provider = %id, "Provider registered");
        Ok(handle)
    }

    pub fn remove(&mut self, id: &ProviderId) -> DomainResult<EMobilityProvider> {
        let provider = self.providers.remove(id).ok_or_else(|| DomainError::NotFound {
            entity: "provider",
            field: "id",
            value: id.to_string(),
        })?;
        info!(network = %self.network_id, provider = %id, "Provider removed");
        Ok(provider)
    }

    pub fn handle_of(&self, id: &ProviderId) -> Option<Handle> {
        self.providers.handle_of(id)
    }

    pub fn get(&self, id: &ProviderId) -> Option<&EMobilityProvider> {
        self.providers.by_id(id)
    }

    pub fn get_mut(&mut self, id: &ProviderId) -> Option<&mut EMobilityProvider> {
        self.providers.by_id_mut(id)
    }

    pub fn by_handle(&self, handle: Handle) -> Option<&EMobilityProvider> {
        self.providers.get(handle)
    }

    pub fn by_handle_mut(&mut self, handle: Handle) -> Option<&mut EMobilityProvider> {
        self.providers.get_mut(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EMobilityProvider> + '_ {
        self.providers.iter().map(|(_, provider)| provider)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Current admin status of every provider, in registration order.
    pub fn admin_status_snapshots(&self) -> Vec<StatusRecord<ProviderId, AdminStatusType>> {
        self.iter()
            .filter_map(|p| p.admin_status_ledger().snapshot().ok())
            .collect()
    }

    /// Current status of every provider, in registration order.
    pub fn status_snapshots(&self) -> Vec<StatusRecord<ProviderId, StatusType>> {
        self.iter()
            .filter_map(|p| p.status_ledger().snapshot().ok())
            .collect()
    }

    pub fn admin_status_projection(&self, options: &ProjectionOptions) -> Value {
        project_history(self.iter().map(|p| p.admin_status_ledger()), options)
    }

    pub fn status_projection(&self, options: &ProjectionOptions) -> Value {
        project_history(self.iter().map(|p| p.status_ledger()), options)
    }

    /// Forward EVSE admin status updates to every provider.
    pub async fn update_evse_admin_status(
        &self,
        updates: Vec<AdminStatusUpdate<Evse>>,
    ) -> PushOutcome<AdminStatusUpdate<Evse>> {
        let started = Instant::now();
        if let Some(outcome) = self.no_providers("update_evse_admin_status", &updates) {
            return outcome.with_runtime(started.elapsed());
        }
        let pushes = self
            .iter()
            .map(|provider| provider.update_evse_admin_status(updates.clone()));
        let outcomes = join_all(pushes).await;
        self.summarize("update_evse_admin_status", outcomes, started)
    }

    /// Forward EVSE status updates to every provider.
    pub async fn update_evse_status(
        &self,
        updates: Vec<OperationalStatusUpdate<Evse>>,
    ) -> PushOutcome<OperationalStatusUpdate<Evse>> {
        let started = Instant::now();
        if let Some(outcome) = self.no_providers("update_evse_status", &updates) {
            return outcome.with_runtime(started.elapsed());
        }
        let pushes = self
            .iter()
            .map(|provider| provider.update_evse_status(updates.clone()));
        let outcomes = join_all(pushes).await;
        self.summarize("update_evse_status", outcomes, started)
    }

    /// Forward EVSE energy status updates to every provider.
    pub async fn update_evse_energy_status(
        &self,
        updates: Vec<EnergyStatusUpdate<Evse>>,
    ) -> PushOutcome<EnergyStatusUpdate<Evse>> {
        let started = Instant::now();
        if let Some(outcome) = self.no_providers("update_evse_energy_status", &updates) {
            return outcome.with_runtime(started.elapsed());
        }
        let pushes = self
            .iter()
            .map(|provider| provider.update_evse_energy_status(updates.clone()));
        let outcomes = join_all(pushes).await;
        self.summarize("update_evse_energy_status", outcomes, started)
    }

    fn no_providers<U: Clone>(&self, operation: &'static str, updates: &[U]) -> Option<PushOutcome<U>> {
        if !self.providers.is_empty() {
            return None;
        }
        warn!(network = %self.network_id, operation, rejected = updates.len(), "No providers registered");
        Some(
            PushOutcome::out_of_service(self.network_id.to_string(), updates.to_vec())
                .with_description("No providers registered"),
        )
    }

    fn summarize<U>(
        &self,
        operation: &'static str,
        outcomes: Vec<PushOutcome<U>>,
        started: Instant,
    ) -> PushOutcome<U> {
        let providers = outcomes.len();
        let outcome = flatten(self.network_id.to_string(), outcomes, started.elapsed());
        debug!(
            network = %self.network_id,
            operation,
            providers,
            result = %outcome.kind,
            rejected = outcome.rejected.len(),
            "Provider fan-out finished"
        );
        outcome
    }
}
