//! Status value types shared by all entity kinds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::errors::DomainError;

/// Bound for values that can be kept in a status ledger.
pub trait StatusValue: Clone + Eq + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl<T> StatusValue for T where T: Clone + Eq + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static {}

/// Operator-controlled availability of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AdminStatusType {
    Unspecified,
    Operational,
    OutOfService,
    Blocked,
    InternalUse,
    Planned,
    Deleted,
}

impl AdminStatusType {
    pub const ALL: [AdminStatusType; 7] = [
        Self::Unspecified,
        Self::Operational,
        Self::OutOfService,
        Self::Blocked,
        Self::InternalUse,
        Self::Planned,
        Self::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "Unspecified",
            Self::Operational => "Operational",
            Self::OutOfService => "OutOfService",
            Self::Blocked => "Blocked",
            Self::InternalUse => "InternalUse",
            Self::Planned => "Planned",
            Self::Deleted => "Deleted",
        }
    }
}

impl Default for AdminStatusType {
    fn default() -> Self {
        Self::Unspecified
    }
}

impl fmt::Display for AdminStatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminStatusType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownStatus {
                kind: "admin status",
                value: s.to_string(),
            })
    }
}

/// Operationally observed status of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusType {
    Unspecified,
    Available,
    Reserved,
    Charging,
    Unavailable,
    OutOfService,
    Offline,
    Error,
}

impl StatusType {
    pub const ALL: [StatusType; 8] = [
        Self::Unspecified,
        Self::Available,
        Self::Reserved,
        Self::Charging,
        Self::Unavailable,
        Self::OutOfService,
        Self::Offline,
        Self::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "Unspecified",
            Self::Available => "Available",
            Self::Reserved => "Reserved",
            Self::Charging => "Charging",
            Self::Unavailable => "Unavailable",
            Self::OutOfService => "OutOfService",
            Self::Offline => "Offline",
            Self::Error => "Error",
        }
    }
}

impl Default for StatusType {
    fn default() -> Self {
        Self::Unspecified
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownStatus {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// Power currently offered by an entity, in watts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnergyStatus {
    pub available_power_w: u32,
    pub max_power_w: u32,
}

impl EnergyStatus {
    pub fn new(available_power_w: u32, max_power_w: u32) -> Self {
        Self {
            available_power_w,
            max_power_w,
        }
    }
}

impl fmt::Display for EnergyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} W", self.available_power_w, self.max_power_w)
    }
}
