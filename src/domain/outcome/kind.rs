//! Push result classification

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classified result of one push attempt against a collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PushResultKind {
    Unspecified,
    /// Every item was applied
    Success,
    /// Mixed per-item results within one batch
    Partial,
    /// Accepted for later delivery
    Enqueued,
    /// Nothing to do (empty batch or pushing disabled)
    NoOperation,
    /// No backend available
    OutOfService,
    /// Administratively disabled
    AdminDown,
    Error,
    Timeout,
    /// Could not acquire the per-target push lock in time
    LockTimeout,
}

impl PushResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "Unspecified",
            Self::Success => "Success",
            Self::Partial => "Partial",
            Self::Enqueued => "Enqueued",
            Self::NoOperation => "NoOperation",
            Self::OutOfService => "OutOfService",
            Self::AdminDown => "AdminDown",
            Self::Error => "Error",
            Self::Timeout => "Timeout",
            Self::LockTimeout => "LockTimeout",
        }
    }

    /// Whether the outcome means nothing was left undelivered.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::Enqueued | Self::NoOperation)
    }

    /// Transient failures that may succeed when the rejected items are pushed again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::LockTimeout)
    }
}

impl fmt::Display for PushResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_like_kinds() {
        assert!(PushResultKind::Success.is_success());
        assert!(PushResultKind::Enqueued.is_success());
        assert!(PushResultKind::NoOperation.is_success());
        assert!(!PushResultKind::Partial.is_success());
        assert!(!PushResultKind::AdminDown.is_success());
    }

    #[test]
    fn only_timeouts_are_transient() {
        assert!(PushResultKind::Timeout.is_transient());
        assert!(PushResultKind::LockTimeout.is_transient());
        assert!(!PushResultKind::Error.is_transient());
        assert!(!PushResultKind::OutOfService.is_transient());
    }
}
