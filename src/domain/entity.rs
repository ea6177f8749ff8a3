//! Entity kinds of the roaming platform
//!
//! Each kind fixes the identifier type used in its status updates. Status
//! value types are shared by all kinds.

use std::fmt;
use std::hash::Hash;

use super::identifier::{EntityId, ProviderId};
use super::status::{AdminStatusType, EnergyStatus, StatusType, StatusUpdate};

pub trait EntityKind: Send + Sync + 'static {
    /// Label used in logs, metrics and events
    const NAME: &'static str;

    type Id: Clone + Eq + Hash + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static;
}

pub struct Evse;
pub struct ChargingStation;
pub struct ChargingPool;
pub struct Operator;
pub struct RoamingNetwork;
pub struct Provider;

impl EntityKind for Evse {
    const NAME: &'static str = "evse";
    type Id = EntityId;
}

impl EntityKind for ChargingStation {
    const NAME: &'static str = "charging_station";
    type Id = EntityId;
}

impl EntityKind for ChargingPool {
    const NAME: &'static str = "charging_pool";
    type Id = EntityId;
}

impl EntityKind for Operator {
    const NAME: &'static str = "operator";
    type Id = EntityId;
}

impl EntityKind for RoamingNetwork {
    const NAME: &'static str = "roaming_network";
    type Id = EntityId;
}

impl EntityKind for Provider {
    const NAME: &'static str = "provider";
    type Id = ProviderId;
}

pub type AdminStatusUpdate<K> = StatusUpdate<<K as EntityKind>::Id, AdminStatusType>;
pub type OperationalStatusUpdate<K> = StatusUpdate<<K as EntityKind>::Id, StatusType>;
pub type EnergyStatusUpdate<K> = StatusUpdate<<K as EntityKind>::Id, EnergyStatus>;
