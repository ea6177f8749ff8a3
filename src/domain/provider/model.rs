//! E-mobility provider entity

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::domain::entity::{AdminStatusUpdate, EnergyStatusUpdate, Evse, OperationalStatusUpdate};
use crate::domain::identifier::ProviderId;
use crate::domain::outcome::PushOutcome;
use crate::domain::ports::PushTarget;
use crate::domain::status::{
    AdminStatusType, ChangeMethod, ErrorSink, StatusLedger, StatusType, StatusUpdate, Timestamped,
};
use crate::shared::errors::DomainResult;

pub type AdminStatusLedger = StatusLedger<ProviderId, AdminStatusType>;
pub type OperationalStatusLedger = StatusLedger<ProviderId, StatusType>;

/// E-mobility provider taking part in a roaming network.
///
/// Owns the provider's own admin status and status histories and forwards
/// EVSE updates to its remote backend, if one is attached.
pub struct EMobilityProvider {
    id: ProviderId,
    name: String,
    admin_status: AdminStatusLedger,
    status: OperationalStatusLedger,
    remote: Option<Arc<dyn PushTarget<Evse>>>,
    push_disabled: bool,
}

impl EMobilityProvider {
    /// New provider, `Operational` and `Available` as of now.
    pub fn new(id: ProviderId, name: impl Into<String>, max_history_size: usize) -> Self {
        Self::with_initial(
            id,
            name,
            Timestamped::now(AdminStatusType::Operational),
            Timestamped::now(StatusType::Available),
            max_history_size,
        )
    }

    pub fn with_initial(
        id: ProviderId,
        name: impl Into<String>,
        admin_status: Timestamped<AdminStatusType>,
        status: Timestamped<StatusType>,
        max_history_size: usize,
    ) -> Self {
        Self {
            admin_status: StatusLedger::new(id.clone(), admin_status, max_history_size),
            status: StatusLedger::new(id.clone(), status, max_history_size),
            id,
            name: name.into(),
            remote: None,
            push_disabled: false,
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn PushTarget<Evse>>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn id(&self) -> &ProviderId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn remote(&self) -> Option<&Arc<dyn PushTarget<Evse>>> {
        self.remote.as_ref()
    }

    /// Attach or detach the remote backend; returns the previous one.
    pub fn set_remote(
        &mut self,
        remote: Option<Arc<dyn PushTarget<Evse>>>,
    ) -> Option<Arc<dyn PushTarget<Evse>>> {
        std::mem::replace(&mut self.remote, remote)
    }

    pub fn push_disabled(&self) -> bool {
        self.push_disabled
    }

    pub fn set_push_disabled(&mut self, disabled: bool) {
        self.push_disabled = disabled;
    }

    /// Route listener failures of both ledgers to `sink`.
    pub fn set_error_sink(&mut self, sink: Arc<dyn ErrorSink>) {
        self.admin_status.set_error_sink(sink.clone());
        self.status.set_error_sink(sink);
    }

    pub fn admin_status(&self) -> DomainResult<Timestamped<AdminStatusType>> {
        self.admin_status.current_status()
    }

    pub fn status(&self) -> DomainResult<Timestamped<StatusType>> {
        self.status.current_status()
    }

    pub fn admin_status_ledger(&self) -> &AdminStatusLedger {
        &self.admin_status
    }

    pub fn admin_status_ledger_mut(&mut self) -> &mut AdminStatusLedger {
        &mut self.admin_status
    }

    pub fn status_ledger(&self) -> &OperationalStatusLedger {
        &self.status
    }

    pub fn status_ledger_mut(&mut self) -> &mut OperationalStatusLedger {
        &mut self.status
    }

    pub fn set_admin_status(
        &mut self,
        status: Timestamped<AdminStatusType>,
        method: ChangeMethod,
    ) -> DomainResult<Option<StatusUpdate<ProviderId, AdminStatusType>>> {
        self.admin_status.set_status(status, method)
    }

    pub fn set_status(
        &mut self,
        status: Timestamped<StatusType>,
        method: ChangeMethod,
    ) -> DomainResult<Option<StatusUpdate<ProviderId, StatusType>>> {
        self.status.set_status(status, method)
    }

    pub async fn update_evse_admin_status(
        &self,
        updates: Vec<AdminStatusUpdate<Evse>>,
    ) -> PushOutcome<AdminStatusUpdate<Evse>> {
        let started = Instant::now();
        let (remote, updates) = match self.gate("update_evse_admin_status", updates) {
            Ok(open) => open,
            Err(outcome) => return outcome.with_runtime(started.elapsed()),
        };
        let outcome = remote.update_admin_status(updates).await;
        self.finish("update_evse_admin_status", outcome, started)
    }

    pub async fn update_evse_status(
        &self,
        updates: Vec<OperationalStatusUpdate<Evse>>,
    ) -> PushOutcome<OperationalStatusUpdate<Evse>> {
        let started = Instant::now();
        let (remote, updates) = match self.gate("update_evse_status", updates) {
            Ok(open) => open,
            Err(outcome) => return outcome.with_runtime(started.elapsed()),
        };
        let outcome = remote.update_status(updates).await;
        self.finish("update_evse_status", outcome, started)
    }

    pub async fn update_evse_energy_status(
        &self,
        updates: Vec<EnergyStatusUpdate<Evse>>,
    ) -> PushOutcome<EnergyStatusUpdate<Evse>> {
        let started = Instant::now();
        let (remote, updates) = match self.gate("update_evse_energy_status", updates) {
            Ok(open) => open,
            Err(outcome) => return outcome.with_runtime(started.elapsed()),
        };
        let outcome = remote.update_energy_status(updates).await;
        self.finish("update_evse_energy_status", outcome, started)
    }

    /// Decide whether updates may reach the remote backend. Checked in order:
    /// push disabled, admin status, presence of a backend.
    fn gate<U>(
        &self,
        operation: &'static str,
        updates: Vec<U>,
    ) -> Result<(Arc<dyn PushTarget<Evse>>, Vec<U>), PushOutcome<U>> {
        let sender = self.id.to_string();

        if self.push_disabled {
            debug!(provider = %self.id, operation, "Push disabled, skipping");
            return Err(PushOutcome::no_operation(sender).with_description("Push disabled"));
        }

        let admin = self.admin_status.current_status().ok().map(|s| s.value);
        if admin != Some(AdminStatusType::Operational) {
            warn!(
                provider = %self.id,
                operation,
                admin_status = %admin.unwrap_or_default(),
                rejected = updates.len(),
                "Provider not operational"
            );
            return Err(PushOutcome::admin_down(sender, updates)
                .with_description(format!("Provider admin status is {}", admin.unwrap_or_default())));
        }

        match &self.remote {
            Some(remote) => Ok((remote.clone(), updates)),
            None => {
                warn!(provider = %self.id, operation, rejected = updates.len(), "No remote provider");
                Err(PushOutcome::out_of_service(sender, updates)
                    .with_description("No remote provider attached"))
            }
        }
    }

    fn finish<U>(&self, operation: &'static str, mut outcome: PushOutcome<U>, started: Instant) -> PushOutcome<U> {
        outcome.runtime.get_or_insert(started.elapsed());
        debug!(
            provider = %self.id,
            operation,
            result = %outcome.kind,
            rejected = outcome.rejected.len(),
            "Remote push finished"
        );
        outcome
    }
}

impl fmt::Debug for EMobilityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EMobilityProvider")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("admin_status", &self.admin_status.current_status().ok())
            .field("status", &self.status.current_status().ok())
            .field("has_remote", &self.remote.is_some())
            .field("push_disabled", &self.push_disabled)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::entity::EntityKind;
    use crate::domain::outcome::PushResultKind;

    /// Remote backend that records batches and answers with a fixed kind,
    /// rejecting everything unless the kind is a success.
    pub struct FakeTarget {
        pub id: String,
        pub kind: PushResultKind,
        pub status_batches: Mutex<Vec<usize>>,
    }

    impl FakeTarget {
        pub fn new(id: &str, kind: PushResultKind) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                kind,
                status_batches: Mutex::new(Vec::new()),
            })
        }

        fn answer<U>(&self, updates: Vec<U>) -> PushOutcome<U> {
            let rejected = if self.kind.is_success() { Vec::new() } else { updates };
            PushOutcome {
                kind: self.kind,
                sender_id: self.id.clone(),
                description: None,
                rejected,
                warnings: Vec::new(),
                runtime: None,
            }
        }
    }

    #[async_trait]
    impl<K: EntityKind> PushTarget<K> for FakeTarget {
        fn target_id(&self) -> &str {
            &self.id
        }

        async fn update_admin_status(
            &self,
            updates: Vec<AdminStatusUpdate<K>>,
        ) -> PushOutcome<AdminStatusUpdate<K>> {
            self.answer(updates)
        }

        async fn update_status(
            &self,
            updates: Vec<OperationalStatusUpdate<K>>,
        ) -> PushOutcome<OperationalStatusUpdate<K>> {
            self.status_batches.lock().unwrap().push(updates.len());
            self.answer(updates)
        }

        async fn update_energy_status(
            &self,
            updates: Vec<EnergyStatusUpdate<K>>,
        ) -> PushOutcome<EnergyStatusUpdate<K>> {
            self.answer(updates)
        }
    }
}
