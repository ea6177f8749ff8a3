//! Read access to an entity's status

use super::record::StatusRecord;
use super::timestamped::Timestamped;
use crate::shared::errors::DomainResult;

/// Anything that can report its current status and recent history.
pub trait StatusSource {
    type Id: Clone;
    type Value: Clone;

    fn entity_id(&self) -> &Self::Id;

    fn current_status(&self) -> DomainResult<Timestamped<Self::Value>>;

    /// Newest first, at most `limit` entries.
    fn status_history(&self, limit: Option<usize>) -> Vec<Timestamped<Self::Value>>;

    fn status_snapshot(&self) -> DomainResult<StatusRecord<Self::Id, Self::Value>> {
        Ok(StatusRecord::new(
            self.entity_id().clone(),
            self.current_status()?,
        ))
    }
}
