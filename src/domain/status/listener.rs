//! Status change observers and the error sink they report to

use std::any::Any;
use std::error::Error;

use thiserror::Error;
use tracing::error;

use super::record::StatusUpdate;

/// Error returned by a failing listener
pub type ListenerError = Box<dyn Error + Send + Sync>;

/// Observer of status transitions on a ledger.
pub trait StatusListener<Id, T>: Send + Sync {
    fn on_status_changed(&self, update: &StatusUpdate<Id, T>) -> Result<(), ListenerError>;
}

impl<Id, T, F> StatusListener<Id, T> for F
where
    F: Fn(&StatusUpdate<Id, T>) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_status_changed(&self, update: &StatusUpdate<Id, T>) -> Result<(), ListenerError> {
        self(update)
    }
}

/// Registration token returned by `StatusLedger::register`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub(crate) u64);

/// Receives failures that must not propagate to the caller that caused them.
///
/// Implementations are best-effort and must not panic.
pub trait ErrorSink: Send + Sync {
    fn handle_errors(&self, module: &str, caller: &str, error: &(dyn Error + Send + Sync));
}

/// Error sink that logs through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn handle_errors(&self, module: &str, caller: &str, error: &(dyn Error + Send + Sync)) {
        error!(module, caller, error = %error, "Listener failed");
    }
}

/// A listener panicked while handling a status update.
#[derive(Debug, Error)]
#[error("listener panicked: {0}")]
pub struct ListenerPanic(pub String);

impl ListenerPanic {
    pub(crate) fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self(message)
    }
}
