//! Folding per-item push outcomes into one summary outcome

use std::time::Duration;

use super::kind::PushResultKind;
use super::push_outcome::PushOutcome;

/// Description used when there is nothing to flatten.
pub const EMPTY_FLATTEN_DESCRIPTION: &str = "!";

/// Combine independent push outcomes into one.
///
/// The result has the common kind when every input agrees, otherwise
/// `Partial`. Descriptions are joined with newlines; rejected items and
/// warnings are concatenated, all in input order. An empty input yields
/// `Error` with the description `"!"`, which existing callers rely on.
pub fn flatten<U>(
    sender_id: impl Into<String>,
    outcomes: impl IntoIterator<Item = PushOutcome<U>>,
    runtime: Duration,
) -> PushOutcome<U> {
    let sender_id = sender_id.into();
    let outcomes: Vec<PushOutcome<U>> = outcomes.into_iter().collect();

    let Some(first_kind) = outcomes.first().map(|o| o.kind) else {
        return PushOutcome::error(sender_id, Vec::new())
            .with_description(EMPTY_FLATTEN_DESCRIPTION)
            .with_runtime(runtime);
    };

    let kind = if outcomes.iter().all(|o| o.kind == first_kind) {
        first_kind
    } else {
        PushResultKind::Partial
    };

    let mut descriptions = Vec::new();
    let mut rejected = Vec::new();
    let mut warnings = Vec::new();

    for outcome in outcomes {
        if let Some(description) = outcome.description {
            descriptions.push(description);
        }
        rejected.extend(outcome.rejected);
        warnings.extend(outcome.warnings);
    }

    PushOutcome {
        kind,
        sender_id,
        description: (!descriptions.is_empty()).then(|| descriptions.join("\n")),
        rejected,
        warnings,
        runtime: Some(runtime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::Warning;

    fn runtime() -> Duration {
        Duration::from_millis(40)
    }

    #[test]
    fn uniform_success_stays_success() {
        let outcomes = vec![
            PushOutcome::<u32>::success("a").with_description("first"),
            PushOutcome::success("b").with_description("second"),
            PushOutcome::success("c").with_description("third"),
        ];

        let result = flatten("net", outcomes, runtime());

        assert_eq!(result.kind, PushResultKind::Success);
        assert_eq!(result.sender_id, "net");
        assert_eq!(result.description.as_deref(), Some("first\nsecond\nthird"));
        assert_eq!(result.runtime, Some(runtime()));
    }

    #[test]
    fn mixed_kinds_become_partial() {
        let outcomes = vec![
            PushOutcome::<u32>::success("a"),
            PushOutcome::error("b", vec![7]),
        ];

        let result = flatten("net", outcomes, runtime());

        assert_eq!(result.kind, PushResultKind::Partial);
        assert_eq!(result.rejected, vec![7]);
    }

    #[test]
    fn empty_input_is_error_with_sentinel() {
        let result = flatten::<u32>("net", Vec::new(), runtime());

        assert_eq!(result.kind, PushResultKind::Error);
        assert_eq!(result.description.as_deref(), Some(EMPTY_FLATTEN_DESCRIPTION));
        assert!(result.rejected.is_empty());
    }

    #[test]
    fn uniform_failures_keep_their_kind_and_all_rejections() {
        let outcomes = vec![
            PushOutcome::out_of_service("a", vec![1]),
            PushOutcome::out_of_service("b", vec![2, 3]),
        ];

        let result = flatten("net", outcomes, runtime());

        assert_eq!(result.kind, PushResultKind::OutOfService);
        assert_eq!(result.rejected, vec![1, 2, 3]);
        assert_eq!(result.description, None);
    }

    #[test]
    fn rejected_items_and_warnings_keep_input_order() {
        let outcomes = vec![
            PushOutcome::success("a").with_warning("w1"),
            PushOutcome::success("b"),
            PushOutcome::out_of_service("c", vec!["u1", "u2"]).with_warning("w2"),
        ];

        let result = flatten("net", outcomes, runtime());

        assert_eq!(result.kind, PushResultKind::Partial);
        assert_eq!(result.rejected, vec!["u1", "u2"]);
        assert_eq!(result.warnings, vec![Warning::new("w1"), Warning::new("w2")]);
    }
}
