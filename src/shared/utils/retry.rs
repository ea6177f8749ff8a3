//! Retry with exponential backoff
//!
//! Re-pushes only the items a collaborator rejected, for as long as its
//! outcome is transient (timeouts, contended locks).

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::outcome::PushOutcome;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    /// Initial delay between retries.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_multiplier: f64,
    /// Maximum delay between retries (cap).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// Next backoff step, capped at `max_delay`. A multiplier below 1 or a
    /// non-finite one keeps the delay unchanged.
    fn next_delay(&self, delay: Duration) -> Duration {
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return delay.min(self.max_delay);
        }
        Duration::try_from_secs_f64(delay.as_secs_f64() * self.backoff_multiplier)
            .map_or(self.max_delay, |next| next.min(self.max_delay))
    }
}

/// Push `items`, then keep re-pushing whatever was rejected while
/// `should_retry` holds for the outcome.
///
/// The final outcome describes the last attempt. Items accepted by earlier
/// attempts are never sent again; if a retry was needed, a warning records
/// how many attempts it took.
///
/// # Example
/// ```ignore
/// let outcome = retry_rejected(
///     &RetryConfig::default(),
///     updates,
///     |batch| target.update_status(batch),
///     |outcome| outcome.kind.is_transient(),
///     "update_status",
/// ).await;
/// ```
pub async fn retry_rejected<U, F, Fut>(
    config: &RetryConfig,
    items: Vec<U>,
    mut push: F,
    should_retry: impl Fn(&PushOutcome<U>) -> bool,
    operation_name: &str,
) -> PushOutcome<U>
where
    F: FnMut(Vec<U>) -> Fut,
    Fut: Future<Output = PushOutcome<U>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut delay = config.initial_delay;
    let mut attempt = 1;
    let mut outcome = push(items).await;

    while attempt < max_attempts && !outcome.rejected.is_empty() && should_retry(&outcome) {
        warn!(
            operation = operation_name,
            attempt,
            max_attempts,
            result = %outcome.kind,
            rejected = outcome.rejected.len(),
            retry_in_ms = delay.as_millis() as u64,
            "Transient failure, retrying rejected items"
        );

        tokio::time::sleep(delay).await;
        delay = config.next_delay(delay);

        let rejected = std::mem::take(&mut outcome.rejected);
        outcome = push(rejected).await;
        attempt += 1;
    }

    if attempt == 1 {
        return outcome;
    }

    if outcome.rejected.is_empty() {
        info!(operation = operation_name, attempt, result = %outcome.kind, "Succeeded after retry");
        outcome.with_warning(format!("succeeded after {} attempts", attempt))
    } else {
        warn!(
            operation = operation_name,
            attempt,
            max_attempts,
            result = %outcome.kind,
            rejected = outcome.rejected.len(),
            "Operation failed permanently"
        );
        outcome.with_warning(format!("gave up after {} attempts", attempt))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::domain::outcome::PushResultKind;

    fn fast() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(4),
        }
    }

    fn transient(outcome: &PushOutcome<u32>) -> bool {
        outcome.kind.is_transient()
    }

    #[test]
    fn delay_is_capped() {
        let config = RetryConfig::default();
        let mut delay = config.initial_delay;
        for _ in 0..10 {
            delay = config.next_delay(delay);
        }
        assert_eq!(delay, config.max_delay);
    }

    #[test]
    fn unusable_multipliers_keep_the_delay() {
        for multiplier in [-2.0, 0.0, 0.5, f64::NAN, f64::NEG_INFINITY] {
            let config = RetryConfig {
                backoff_multiplier: multiplier,
                ..RetryConfig::default()
            };
            assert_eq!(config.next_delay(Duration::from_millis(200)), Duration::from_millis(200));
        }

        let config = RetryConfig {
            backoff_multiplier: f64::INFINITY,
            ..RetryConfig::default()
        };
        assert_eq!(config.next_delay(Duration::from_millis(200)), Duration::from_millis(200));

        let config = RetryConfig {
            backoff_multiplier: 1e300,
            ..RetryConfig::default()
        };
        assert_eq!(config.next_delay(Duration::from_millis(200)), config.max_delay);
    }

    #[tokio::test]
    async fn negative_multiplier_still_retries() {
        let config = RetryConfig {
            backoff_multiplier: -2.0,
            ..fast()
        };
        let calls = AtomicU32::new(0);

        let outcome = retry_rejected(
            &config,
            vec![7],
            |batch| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { PushOutcome::timeout("t", batch) }
            },
            transient,
            "test",
        )
        .await;

        assert_eq!(outcome.kind, PushResultKind::Timeout);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.warnings[0].as_str(), "gave up after 3 attempts");
    }

    #[tokio::test]
    async fn success_on_first_attempt_is_returned_as_is() {
        let calls = AtomicU32::new(0);

        let outcome = retry_rejected(
            &fast(),
            vec![1, 2],
            |_batch| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { PushOutcome::<u32>::success("t") }
            },
            transient,
            "test",
        )
        .await;

        assert_eq!(outcome.kind, PushResultKind::Success);
        assert!(outcome.warnings.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn only_rejected_items_are_retried() {
        let batches = Mutex::new(Vec::new());

        let outcome = retry_rejected(
            &fast(),
            vec![1, 2, 3],
            |batch: Vec<u32>| {
                let attempt = {
                    let mut batches = batches.lock().unwrap();
                    batches.push(batch.clone());
                    batches.len()
                };
                async move {
                    if attempt == 1 {
                        PushOutcome::timeout("t", vec![batch[2]])
                    } else {
                        PushOutcome::success("t")
                    }
                }
            },
            transient,
            "test",
        )
        .await;

        assert_eq!(outcome.kind, PushResultKind::Success);
        assert_eq!(*batches.lock().unwrap(), vec![vec![1, 2, 3], vec![3]]);
        assert_eq!(outcome.warnings[0].as_str(), "succeeded after 2 attempts");
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let outcome = retry_rejected(
            &fast(),
            vec![7],
            |batch| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { PushOutcome::lock_timeout("t", batch) }
            },
            transient,
            "test",
        )
        .await;

        assert_eq!(outcome.kind, PushResultKind::LockTimeout);
        assert_eq!(outcome.rejected, vec![7]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let calls = AtomicU32::new(0);

        let outcome = retry_rejected(
            &fast(),
            vec![7],
            |batch| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { PushOutcome::error("t", batch) }
            },
            transient,
            "test",
        )
        .await;

        assert_eq!(outcome.kind, PushResultKind::Error);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
