//! Status propagation
//!
//! Timestamped status values, per-entity ledgers, snapshots/transitions and
//! the JSON projection used on the wire.

pub mod ledger;
pub mod listener;
pub mod projection;
pub mod record;
pub mod source;
pub mod timestamped;
pub mod types;

pub use ledger::{ChangeMethod, StatusLedger, DEFAULT_MAX_HISTORY_SIZE};
pub use listener::{
    ErrorSink, ListenerError, ListenerHandle, ListenerPanic, StatusListener, TracingErrorSink,
};
pub use projection::{
    parse_history, project_history, ProjectionOptions, DEFAULT_PROJECTION_HISTORY_SIZE,
};
pub use record::{StatusRecord, StatusUpdate};
pub use source::StatusSource;
pub use timestamped::{format_iso8601, Timestamped};
pub use types::{AdminStatusType, EnergyStatus, StatusType, StatusValue};
