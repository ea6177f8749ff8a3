//! Status ledger
//!
//! Bounded, newest-first history of timestamped status values for a single
//! entity. Admin status and operational status each get their own ledger.
//!
//! A ledger is single-writer: the owning entity serializes mutations, so no
//! locking happens here. Listener notification is synchronous; a failing or
//! panicking listener is reported to the [`ErrorSink`] and the mutation that
//! triggered it stays committed.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, trace};

use super::listener::{ErrorSink, ListenerHandle, ListenerPanic, StatusListener, TracingErrorSink};
use super::record::{StatusRecord, StatusUpdate};
use super::source::StatusSource;
use super::timestamped::Timestamped;
use super::types::StatusValue;
use crate::shared::errors::{DomainError, DomainResult};

pub const DEFAULT_MAX_HISTORY_SIZE: usize = 50;

const MODULE: &str = "StatusLedger";

/// How a new status value is merged into the history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeMethod {
    /// Drop the history and keep only the new value
    Replace,
    /// Insert at the time-sorted position
    Insert,
}

impl ChangeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "Replace",
            Self::Insert => "Insert",
        }
    }
}

impl fmt::Display for ChangeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "insert" => Ok(Self::Insert),
            _ => Err(DomainError::InvalidChangeMethod(s.to_string())),
        }
    }
}

pub struct StatusLedger<Id, T> {
    id: Id,
    history: VecDeque<Timestamped<T>>,
    max_history_size: usize,
    listeners: Vec<(ListenerHandle, Arc<dyn StatusListener<Id, T>>)>,
    next_listener: u64,
    error_sink: Arc<dyn ErrorSink>,
}

impl<Id, T> StatusLedger<Id, T>
where
    Id: Clone + fmt::Display,
    T: StatusValue,
{
    /// Ledger seeded with its initial status.
    pub fn new(id: Id, initial: Timestamped<T>, max_history_size: usize) -> Self {
        let mut ledger = Self::unseeded(id, max_history_size);
        ledger.history.push_front(initial);
        ledger
    }

    /// Ledger without any status yet; call [`StatusLedger::seed`] before use.
    pub fn unseeded(id: Id, max_history_size: usize) -> Self {
        Self {
            id,
            history: VecDeque::new(),
            max_history_size: max_history_size.max(1),
            listeners: Vec::new(),
            next_listener: 0,
            error_sink: Arc::new(TracingErrorSink),
        }
    }

    pub fn with_error_sink(mut self, error_sink: Arc<dyn ErrorSink>) -> Self {
        self.set_error_sink(error_sink);
        self
    }

    pub fn set_error_sink(&mut self, error_sink: Arc<dyn ErrorSink>) {
        self.error_sink = error_sink;
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn max_history_size(&self) -> usize {
        self.max_history_size
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn register(&mut self, listener: Arc<dyn StatusListener<Id, T>>) -> ListenerHandle {
        let handle = ListenerHandle(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((handle, listener));
        handle
    }

    /// Returns false if the handle was not registered.
    pub fn unregister(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(h, _)| *h != handle);
        self.listeners.len() < before
    }

    /// Set the initial status of an unseeded ledger. Seeding never notifies
    /// listeners; on an already seeded ledger the value is inserted silently.
    pub fn seed(&mut self, initial: Timestamped<T>) {
        self.insert_entry(initial);
    }

    pub fn current_status(&self) -> DomainResult<Timestamped<T>> {
        self.history
            .front()
            .cloned()
            .ok_or_else(|| DomainError::EmptyHistory(self.id.to_string()))
    }

    /// Merge one status value and notify listeners if the current value changed.
    pub fn set_status(
        &mut self,
        status: Timestamped<T>,
        method: ChangeMethod,
    ) -> DomainResult<Option<StatusUpdate<Id, T>>> {
        let previous = self.current_status()?;

        if method == ChangeMethod::Replace {
            self.history.clear();
        }
        self.insert_entry(status);

        Ok(self.emit_if_changed(previous))
    }

    /// Merge many status values in timestamp order and notify listeners at
    /// most once, for the net change.
    pub fn set_status_list(
        &mut self,
        statuses: impl IntoIterator<Item = Timestamped<T>>,
        method: ChangeMethod,
    ) -> DomainResult<Option<StatusUpdate<Id, T>>> {
        let mut statuses: Vec<Timestamped<T>> = statuses.into_iter().collect();
        if statuses.is_empty() {
            return Ok(None);
        }

        let previous = self.current_status()?;

        // Stable, so the later input wins a same-second collision.
        statuses.sort_by_key(|s| s.timestamp);

        if method == ChangeMethod::Replace {
            self.history.clear();
        }
        let count = statuses.len();
        for status in statuses {
            self.insert_entry(status);
        }
        trace!(id = %self.id, count, %method, "Merged status list");

        Ok(self.emit_if_changed(previous))
    }

    /// Newest-first view of the history, bounded by `limit` and the ledger
    /// size. Clone the iterator to restart it.
    pub fn history(&self, limit: Option<usize>) -> impl Iterator<Item = &Timestamped<T>> + Clone + '_ {
        let limit = limit.unwrap_or(self.max_history_size).min(self.max_history_size);
        self.history.iter().take(limit)
    }

    pub fn snapshot(&self) -> DomainResult<StatusRecord<Id, T>> {
        Ok(StatusRecord::new(self.id.clone(), self.current_status()?))
    }

    fn insert_entry(&mut self, status: Timestamped<T>) {
        if let Some(existing) = self.history.iter_mut().find(|e| e.same_second(&status)) {
            *existing = status;
        } else {
            let position = self
                .history
                .iter()
                .position(|e| e.timestamp < status.timestamp)
                .unwrap_or(self.history.len());
            self.history.insert(position, status);
        }
        self.history.truncate(self.max_history_size);
    }

    fn emit_if_changed(&self, previous: Timestamped<T>) -> Option<StatusUpdate<Id, T>> {
        let head = self.history.front()?;
        if head.value == previous.value {
            return None;
        }

        let update = StatusUpdate::new(self.id.clone(), previous, head.clone());
        debug!(
            id = %self.id,
            old = %update.old_status.value,
            new = %update.new_status.value,
            "Status changed"
        );
        self.notify(&update);
        Some(update)
    }

    fn notify(&self, update: &StatusUpdate<Id, T>) {
        for (_, listener) in &self.listeners {
            let result = catch_unwind(AssertUnwindSafe(|| listener.on_status_changed(update)));
            match result {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    self.error_sink
                        .handle_errors(MODULE, "on_status_changed", error.as_ref());
                }
                Err(payload) => {
                    let panic = ListenerPanic::from_payload(payload);
                    self.error_sink
                        .handle_errors(MODULE, "on_status_changed", &panic);
                }
            }
        }
    }
}

impl<Id, T> StatusSource for StatusLedger<Id, T>
where
    Id: Clone + fmt::Display,
    T: StatusValue,
{
    type Id = Id;
    type Value = T;

    fn entity_id(&self) -> &Id {
        &self.id
    }

    fn current_status(&self) -> DomainResult<Timestamped<T>> {
        StatusLedger::current_status(self)
    }

    fn status_history(&self, limit: Option<usize>) -> Vec<Timestamped<T>> {
        self.history(limit).cloned().collect()
    }
}
