//! Push targets: collaborators that accept status updates
//!
//! Implemented by roaming networks, remote providers and CPO backends. A
//! target never fails with `Err`: every failure is a [`PushOutcome`] whose
//! `rejected` list holds the updates it could not apply.

use async_trait::async_trait;

use crate::domain::entity::{
    AdminStatusUpdate, EnergyStatusUpdate, EntityKind, OperationalStatusUpdate,
};
use crate::domain::outcome::PushOutcome;

#[async_trait]
pub trait PushTarget<K: EntityKind>: Send + Sync {
    /// Identifier used as sender id and for per-target locking
    fn target_id(&self) -> &str;

    async fn update_admin_status(
        &self,
        updates: Vec<AdminStatusUpdate<K>>,
    ) -> PushOutcome<AdminStatusUpdate<K>>;

    async fn update_status(
        &self,
        updates: Vec<OperationalStatusUpdate<K>>,
    ) -> PushOutcome<OperationalStatusUpdate<K>>;

    async fn update_energy_status(
        &self,
        updates: Vec<EnergyStatusUpdate<K>>,
    ) -> PushOutcome<EnergyStatusUpdate<K>>;
}
