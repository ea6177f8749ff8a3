pub mod arena;
pub mod entity;
pub mod events;
pub mod identifier;
pub mod outcome;
pub mod ports;
pub mod provider;
pub mod status;

// Re-export commonly used types
pub use arena::{EntityArena, Handle};
pub use events::{Event, EventMessage, PushCompletedEvent, StatusChangedEvent};
pub use entity::{
    AdminStatusUpdate, ChargingPool, ChargingStation, EnergyStatusUpdate, EntityKind, Evse,
    OperationalStatusUpdate, Operator, Provider, RoamingNetwork,
};
pub use identifier::{CountryCode, EntityId, ProviderId, ProviderIdFormat};
pub use outcome::{flatten, PushOutcome, PushResultKind, Warning};
pub use ports::PushTarget;
pub use provider::{EMobilityProvider, ProviderRegistry};
pub use status::{
    AdminStatusType, ChangeMethod, EnergyStatus, ErrorSink, StatusLedger, StatusListener,
    StatusRecord, StatusType, StatusUpdate, Timestamped,
};

pub use crate::shared::errors::{DomainError, DomainResult};
