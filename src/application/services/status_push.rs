//! Status Push Service
//!
//! Fans status updates of one entity kind out to every registered push
//! target and folds the per-target results into one outcome.
//!
//! Each target is guarded by its own lock so that batches for the same
//! target never overlap. Timeouts and lock contention are treated as
//! transient and retried on the rejected items only.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::application::events::SharedEventBus;
use crate::domain::entity::{AdminStatusUpdate, EnergyStatusUpdate, EntityKind, OperationalStatusUpdate};
use crate::domain::outcome::{flatten, PushOutcome};
use crate::domain::ports::PushTarget;
use crate::shared::errors::{DomainError, DomainResult};
use crate::shared::utils::{retry_rejected, RetryConfig};

/// Configuration for status pushes
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Upper bound for one push to one target
    pub timeout: Duration,
    /// How long to wait for a target that is busy with another batch
    pub lock_wait: Duration,
    pub retry: RetryConfig,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            lock_wait: Duration::from_secs(5),
            retry: RetryConfig::default(),
        }
    }
}

struct TargetSlot<K: EntityKind> {
    target: Arc<dyn PushTarget<K>>,
    lock: Mutex<()>,
}

/// Status Push Service
///
/// One instance per entity kind, e.g. `StatusPushService<Evse>`.
pub struct StatusPushService<K: EntityKind> {
    sender_id: String,
    targets: DashMap<String, Arc<TargetSlot<K>>>,
    config: PushConfig,
    event_bus: Option<SharedEventBus>,
}

impl<K: EntityKind> StatusPushService<K> {
    pub fn new(sender_id: impl Into<String>, config: PushConfig) -> Self {
        Self {
            sender_id: sender_id.into(),
            targets: DashMap::new(),
            config,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: SharedEventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    pub fn register_target(&self, target: Arc<dyn PushTarget<K>>) -> DomainResult<()> {
        let id = target.target_id().to_string();
        match self.targets.entry(id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(DomainError::AlreadyExists(id)),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(Arc::new(TargetSlot {
                    target,
                    lock: Mutex::new(()),
                }));
                info!(kind = K::NAME, target = %id, "Push target registered");
                Ok(())
            }
        }
    }

    pub fn unregister_target(&self, target_id: &str) -> Option<Arc<dyn PushTarget<K>>> {
        let (_, slot) = self.targets.remove(target_id)?;
        info!(kind = K::NAME, target = %target_id, "Push target unregistered");
        Some(slot.target.clone())
    }

    /// Registered target ids, sorted.
    pub fn target_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.targets.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub async fn push_admin_status(
        &self,
        updates: Vec<AdminStatusUpdate<K>>,
    ) -> PushOutcome<AdminStatusUpdate<K>> {
        self.fan_out("update_admin_status", updates, |target, batch| {
            async move { target.update_admin_status(batch).await }.boxed()
        })
        .await
    }

    pub async fn push_status(
        &self,
        updates: Vec<OperationalStatusUpdate<K>>,
    ) -> PushOutcome<OperationalStatusUpdate<K>> {
        self.fan_out("update_status", updates, |target, batch| {
            async move { target.update_status(batch).await }.boxed()
        })
        .await
    }

    pub async fn push_energy_status(
        &self,
        updates: Vec<EnergyStatusUpdate<K>>,
    ) -> PushOutcome<EnergyStatusUpdate<K>> {
        self.fan_out("update_energy_status", updates, |target, batch| {
            async move { target.update_energy_status(batch).await }.boxed()
        })
        .await
    }

    async fn fan_out<U, F>(&self, operation: &'static str, updates: Vec<U>, push: F) -> PushOutcome<U>
    where
        U: Clone + Send + 'static,
        F: Fn(Arc<dyn PushTarget<K>>, Vec<U>) -> BoxFuture<'static, PushOutcome<U>> + Clone,
    {
        let started = Instant::now();
        let items = updates.len();

        if updates.is_empty() {
            debug!(kind = K::NAME, operation, "Nothing to push");
            return PushOutcome::no_operation(self.sender_id.clone()).with_runtime(started.elapsed());
        }

        let mut slots: Vec<(String, Arc<TargetSlot<K>>)> = self
            .targets
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        slots.sort_by(|a, b| a.0.cmp(&b.0));

        let outcome = if slots.is_empty() {
            warn!(kind = K::NAME, operation, rejected = items, "No push targets registered");
            PushOutcome::out_of_service(self.sender_id.clone(), updates)
                .with_description("No push targets registered")
                .with_runtime(started.elapsed())
        } else {
            let pushes = slots
                .into_iter()
                .map(|(_, slot)| self.push_with_retry(operation, slot, updates.clone(), push.clone()));
            let outcomes = join_all(pushes).await;
            flatten(self.sender_id.clone(), outcomes, started.elapsed())
        };

        self.record(operation, items, &outcome, started.elapsed());
        outcome
    }

    async fn push_with_retry<U, F>(
        &self,
        operation: &'static str,
        slot: Arc<TargetSlot<K>>,
        updates: Vec<U>,
        push: F,
    ) -> PushOutcome<U>
    where
        U: Clone + Send + 'static,
        F: Fn(Arc<dyn PushTarget<K>>, Vec<U>) -> BoxFuture<'static, PushOutcome<U>> + Clone,
    {
        retry_rejected(
            &self.config.retry,
            updates,
            |batch| self.push_once(operation, slot.clone(), batch, push.clone()),
            |outcome| outcome.kind.is_transient(),
            operation,
        )
        .await
    }

    async fn push_once<U, F>(
        &self,
        operation: &'static str,
        slot: Arc<TargetSlot<K>>,
        batch: Vec<U>,
        push: F,
    ) -> PushOutcome<U>
    where
        U: Clone + Send + 'static,
        F: Fn(Arc<dyn PushTarget<K>>, Vec<U>) -> BoxFuture<'static, PushOutcome<U>>,
    {
        let started = Instant::now();
        let target_id = slot.target.target_id().to_string();

        let _guard = match tokio::time::timeout(self.config.lock_wait, slot.lock.lock()).await {
            Ok(guard) => guard,
            Err(_) => {
                warn!(
                    kind = K::NAME,
                    operation,
                    target = %target_id,
                    lock_wait_ms = self.config.lock_wait.as_millis() as u64,
                    "Push target busy"
                );
                return PushOutcome::lock_timeout(target_id, batch)
                    .with_description("Push target is busy")
                    .with_runtime(started.elapsed());
            }
        };

        match tokio::time::timeout(self.config.timeout, push(slot.target.clone(), batch.clone())).await {
            Ok(mut outcome) => {
                outcome.runtime.get_or_insert(started.elapsed());
                outcome
            }
            Err(_) => {
                warn!(
                    kind = K::NAME,
                    operation,
                    target = %target_id,
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "Push timed out"
                );
                PushOutcome::timeout(target_id, batch)
                    .with_description("Push timed out")
                    .with_runtime(started.elapsed())
            }
        }
    }

    fn record<U>(&self, operation: &'static str, items: usize, outcome: &PushOutcome<U>, elapsed: Duration) {
        metrics::counter!(
            "status_push_total",
            "kind" => K::NAME,
            "operation" => operation,
            "result" => outcome.kind.as_str()
        )
        .increment(1);
        metrics::histogram!("status_push_duration_seconds", "kind" => K::NAME, "operation" => operation)
            .record(elapsed.as_secs_f64());

        info!(
            kind = K::NAME,
            operation,
            items,
            result = %outcome.kind,
            rejected = outcome.rejected.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Status push finished"
        );

        if let Some(bus) = &self.event_bus {
            bus.publish_push_completed(K::NAME, operation, items, outcome);
        }
    }
}
