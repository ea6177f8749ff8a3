//! Push outcome value object

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::kind::PushResultKind;

/// Non-fatal remark attached to an outcome
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Warning(String);

impl Warning {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Warning {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Warning {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Result of pushing a batch of items (status updates, energy updates, ...)
/// to one collaborator.
///
/// Non-successful kinds carry the exact items that were not applied in
/// `rejected`, so callers can retry that subset instead of the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushOutcome<U> {
    pub kind: PushResultKind,
    pub sender_id: String,
    pub description: Option<String>,
    pub rejected: Vec<U>,
    pub warnings: Vec<Warning>,
    pub runtime: Option<Duration>,
}

impl<U> PushOutcome<U> {
    fn with_kind(kind: PushResultKind, sender_id: impl Into<String>, rejected: Vec<U>) -> Self {
        Self {
            kind,
            sender_id: sender_id.into(),
            description: None,
            rejected,
            warnings: Vec::new(),
            runtime: None,
        }
    }

    pub fn success(sender_id: impl Into<String>) -> Self {
        Self::with_kind(PushResultKind::Success, sender_id, Vec::new())
    }

    pub fn enqueued(sender_id: impl Into<String>) -> Self {
        Self::with_kind(PushResultKind::Enqueued, sender_id, Vec::new())
    }

    pub fn no_operation(sender_id: impl Into<String>) -> Self {
        Self::with_kind(PushResultKind::NoOperation, sender_id, Vec::new())
    }

    pub fn unspecified(sender_id: impl Into<String>) -> Self {
        Self::with_kind(PushResultKind::Unspecified, sender_id, Vec::new())
    }

    pub fn partial(sender_id: impl Into<String>, rejected: Vec<U>) -> Self {
        Self::with_kind(PushResultKind::Partial, sender_id, rejected)
    }

    pub fn out_of_service(sender_id: impl Into<String>, rejected: Vec<U>) -> Self {
        Self::with_kind(PushResultKind::OutOfService, sender_id, rejected)
    }

    pub fn admin_down(sender_id: impl Into<String>, rejected: Vec<U>) -> Self {
        Self::with_kind(PushResultKind::AdminDown, sender_id, rejected)
    }

    pub fn error(sender_id: impl Into<String>, rejected: Vec<U>) -> Self {
        Self::with_kind(PushResultKind::Error, sender_id, rejected)
    }

    pub fn timeout(sender_id: impl Into<String>, rejected: Vec<U>) -> Self {
        Self::with_kind(PushResultKind::Timeout, sender_id, rejected)
    }

    pub fn lock_timeout(sender_id: impl Into<String>, rejected: Vec<U>) -> Self {
        Self::with_kind(PushResultKind::LockTimeout, sender_id, rejected)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_warning(mut self, warning: impl Into<Warning>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = Warning>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_runtime(mut self, runtime: Duration) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn is_success(&self) -> bool {
        self.kind.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_constructors_keep_rejected_items() {
        let outcome = PushOutcome::out_of_service("net", vec![1, 2]);
        assert_eq!(outcome.kind, PushResultKind::OutOfService);
        assert_eq!(outcome.rejected, vec![1, 2]);
        assert!(!outcome.is_success());
    }

    #[test]
    fn builder_fills_optional_fields() {
        let outcome = PushOutcome::<u8>::success("net")
            .with_description("done")
            .with_warning("slow backend")
            .with_runtime(Duration::from_millis(12));

        assert_eq!(outcome.description.as_deref(), Some("done"));
        assert_eq!(outcome.warnings, vec![Warning::new("slow backend")]);
        assert_eq!(outcome.runtime, Some(Duration::from_millis(12)));
        assert!(outcome.rejected.is_empty());
    }
}
