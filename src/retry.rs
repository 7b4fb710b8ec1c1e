use crate::endpoint::EndpointSelector;
use crate::errors::{CollectorError, Result};
use crate::exec::{QueryCommand, QueryExecutor, QueryOutcome};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, warn};

/// Bounded-attempt retry policy with a fixed inter-attempt delay
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u8,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u8, retry_delay: Duration) -> Self {
        Self {
            max_attempts,
            retry_delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5))
    }
}

/// Runs one logical query with bounded retries.
///
/// Each attempt picks a fresh endpoint from the selector, so a retry may
/// land on a different node. A successful attempt returns its payload
/// immediately. A fatal (pruned-history) failure short-circuits the
/// remaining attempts. Transient failures sleep the fixed delay and retry
/// until the attempt bound is exhausted.
pub async fn run_with_retry<E, S>(
    executor: &E,
    selector: &S,
    command: &QueryCommand,
    policy: &RetryPolicy,
) -> Result<String>
where
    E: QueryExecutor,
    S: EndpointSelector + ?Sized,
{
    let mut last_failure = String::new();

    for attempt in 1..=policy.max_attempts {
        let endpoint = selector.select();

        match executor.execute(command, endpoint).await {
            QueryOutcome::Success(payload) => return Ok(payload),
            QueryOutcome::Fatal(message) => {
                error!(
                    "[retry] history pruned, aborting retries for `{}`: {}",
                    command.describe(),
                    message
                );
                return Err(CollectorError::pruned_history(message));
            }
            QueryOutcome::Transient(message) => {
                warn!(
                    "[retry] attempt {}/{} failed for `{}`: {}",
                    attempt,
                    policy.max_attempts,
                    command.describe(),
                    message
                );
                last_failure = message;

                if attempt < policy.max_attempts {
                    sleep(policy.retry_delay).await;
                }
            }
        }
    }

    Err(CollectorError::command_failed(format!(
        "all {} attempts failed for `{}`: {last_failure}",
        policy.max_attempts,
        command.describe()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::RotatingSelector;
    use crate::test_utils::MockQueryExecutor;
    use crate::types::TopicId;

    fn fast_policy(max_attempts: u8) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    fn selector() -> RotatingSelector {
        RotatingSelector::new(vec![
            "https://rpc-1.example".to_string(),
            "https://rpc-2.example".to_string(),
            "https://rpc-3.example".to_string(),
        ])
        .unwrap()
    }

    fn command() -> QueryCommand {
        QueryCommand::topic("allorad", TopicId::from_trusted(1))
    }

    #[tokio::test]
    async fn test_success_returns_payload_immediately() {
        let executor =
            MockQueryExecutor::with_outcomes(vec![QueryOutcome::Success("exists: true".into())]);

        let payload = run_with_retry(&executor, &selector(), &command(), &fast_policy(3))
            .await
            .unwrap();

        assert_eq!(payload, "exists: true");
        assert_eq!(executor.attempt_count().await, 1);
    }

    #[tokio::test]
    async fn test_transient_failure_retries_then_succeeds() {
        let executor = MockQueryExecutor::with_outcomes(vec![
            QueryOutcome::Transient("timed out after 15s".into()),
            QueryOutcome::Success("exists: true".into()),
        ]);

        let payload = run_with_retry(&executor, &selector(), &command(), &fast_policy(3))
            .await
            .unwrap();

        assert_eq!(payload, "exists: true");
        assert_eq!(executor.attempt_count().await, 2);
    }

    #[tokio::test]
    async fn test_transient_failures_exhaust_exact_attempt_bound() {
        let executor = MockQueryExecutor::with_outcomes(vec![
            QueryOutcome::Transient("timed out after 15s".into()),
            QueryOutcome::Transient("timed out after 15s".into()),
            QueryOutcome::Transient("timed out after 15s".into()),
            // A fourth attempt would consume this; it must not happen.
            QueryOutcome::Success("exists: true".into()),
        ]);

        let result = run_with_retry(&executor, &selector(), &command(), &fast_policy(3)).await;

        assert!(matches!(result, Err(CollectorError::CommandFailed { .. })));
        assert_eq!(executor.attempt_count().await, 3);
    }

    #[tokio::test]
    async fn test_fatal_failure_short_circuits_after_single_attempt() {
        let executor = MockQueryExecutor::with_outcomes(vec![
            QueryOutcome::Fatal("height 100 is not available, lowest height is 2000".into()),
            QueryOutcome::Success("exists: true".into()),
        ]);

        let result = run_with_retry(&executor, &selector(), &command(), &fast_policy(3)).await;

        assert!(matches!(result, Err(CollectorError::PrunedHistory { .. })));
        assert_eq!(executor.attempt_count().await, 1);
    }

    #[tokio::test]
    async fn test_each_attempt_selects_a_fresh_endpoint() {
        let executor = MockQueryExecutor::with_outcomes(vec![
            QueryOutcome::Transient("connection refused".into()),
            QueryOutcome::Transient("connection refused".into()),
            QueryOutcome::Transient("connection refused".into()),
        ]);

        let _ = run_with_retry(&executor, &selector(), &command(), &fast_policy(3)).await;

        assert_eq!(
            executor.seen_endpoints().await,
            vec![
                "https://rpc-1.example".to_string(),
                "https://rpc-2.example".to_string(),
                "https://rpc-3.example".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_single_attempt_policy_does_not_retry() {
        let executor = MockQueryExecutor::with_outcomes(vec![
            QueryOutcome::Transient("connection refused".into()),
            QueryOutcome::Success("exists: true".into()),
        ]);

        let result = run_with_retry(&executor, &selector(), &command(), &fast_policy(1)).await;

        assert!(result.is_err());
        assert_eq!(executor.attempt_count().await, 1);
    }
}
