use crate::types::{BlockNumber, TopicId};
use std::time::Duration;
use tokio::process::Command;
use tracing::error;

/// Failure-message signatures the node emits once a height has been pruned
/// from its retained history. Every part of a signature must appear in the
/// message for it to classify as fatal.
const FATAL_SIGNATURES: &[&[&str]] = &[&["lowest height is", "is not available"]];

/// Whether a failure message indicates the requested height has been pruned.
///
/// Pruned-history failures are permanent for a given query and must not be
/// retried.
#[must_use]
pub fn is_pruned_history(message: &str) -> bool {
    FATAL_SIGNATURES
        .iter()
        .any(|signature| signature.iter().all(|part| message.contains(part)))
}

/// Classification of a single external query attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The query completed; carries the raw response payload
    Success(String),
    /// The attempt failed but a retry may succeed
    Transient(String),
    /// The attempt failed permanently; retries must stop
    Fatal(String),
}

/// One node query, as a program plus argument vector.
///
/// The endpoint is not part of the command; it is appended per attempt so
/// retries can land on different nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl QueryCommand {
    /// Query whether a topic exists
    pub fn topic_exists(program: &str, topic_id: TopicId) -> Self {
        Self {
            program: program.to_string(),
            args: vec![
                "q".to_string(),
                "emissions".to_string(),
                "topic-exists".to_string(),
                topic_id.to_string(),
            ],
        }
    }

    /// Query topic parameters (epoch boundary, epoch length, metadata)
    pub fn topic(program: &str, topic_id: TopicId) -> Self {
        Self {
            program: program.to_string(),
            args: vec![
                "q".to_string(),
                "emissions".to_string(),
                "topic".to_string(),
                topic_id.to_string(),
            ],
        }
    }

    /// Query the most recent network inference for a topic
    pub fn latest_network_inferences(program: &str, topic_id: TopicId) -> Self {
        Self {
            program: program.to_string(),
            args: vec![
                "q".to_string(),
                "emissions".to_string(),
                "latest-network-inferences".to_string(),
                topic_id.to_string(),
            ],
        }
    }

    /// Query the network inference for a topic at a specific block
    pub fn inference_at_block(program: &str, topic_id: TopicId, block: BlockNumber) -> Self {
        Self {
            program: program.to_string(),
            args: vec![
                "q".to_string(),
                "emissions".to_string(),
                "network-inferences-at-block-outlier-resistant".to_string(),
                topic_id.to_string(),
                block.to_string(),
            ],
        }
    }

    /// Query a block header by height
    pub fn block(program: &str, block: BlockNumber) -> Self {
        Self {
            program: program.to_string(),
            args: vec![
                "query".to_string(),
                "block".to_string(),
                "--type=height".to_string(),
                block.to_string(),
            ],
        }
    }

    /// One-line rendering for logs
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }
}

/// Runs one query attempt against one endpoint
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, command: &QueryCommand, endpoint: &str) -> QueryOutcome;
}

/// Executes queries by spawning the node CLI as a subprocess under a hard
/// wall-clock timeout
#[derive(Debug, Clone)]
pub struct SubprocessExecutor {
    timeout: Duration,
}

impl SubprocessExecutor {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl QueryExecutor for SubprocessExecutor {
    async fn execute(&self, command: &QueryCommand, endpoint: &str) -> QueryOutcome {
        let mut process = Command::new(&command.program);
        process
            .args(&command.args)
            .args(["--node", endpoint])
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, process.output()).await {
            Err(_) => {
                return QueryOutcome::Transient(format!(
                    "timed out after {}s",
                    self.timeout.as_secs()
                ));
            }
            Ok(Err(e)) => {
                error!("[exec] failed to spawn {}: {}", command.program, e);
                return QueryOutcome::Transient(format!(
                    "failed to run {}: {e}",
                    command.program
                ));
            }
            Ok(Ok(output)) => output,
        };

        if output.status.success() {
            let payload = String::from_utf8_lossy(&output.stdout).trim().to_string();
            return QueryOutcome::Success(payload);
        }

        let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if is_pruned_history(&message) {
            QueryOutcome::Fatal(message)
        } else {
            QueryOutcome::Transient(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pruned_history_signature_matches() {
        let message =
            "rpc error: height 100 is not available, lowest height is 2000 (26): invalid request";
        assert!(is_pruned_history(message));
    }

    #[test]
    fn test_pruned_history_requires_every_part() {
        assert!(!is_pruned_history("lowest height is 2000"));
        assert!(!is_pruned_history("height 100 is not available"));
        assert!(!is_pruned_history("timed out after 15s"));
        assert!(!is_pruned_history(""));
    }

    #[test]
    fn test_topic_exists_command() {
        let command = QueryCommand::topic_exists("allorad", TopicId::from_trusted(13));
        assert_eq!(command.program, "allorad");
        assert_eq!(command.args, ["q", "emissions", "topic-exists", "13"]);
    }

    #[test]
    fn test_topic_command() {
        let command = QueryCommand::topic("allorad", TopicId::from_trusted(13));
        assert_eq!(command.args, ["q", "emissions", "topic", "13"]);
    }

    #[test]
    fn test_latest_network_inferences_command() {
        let command = QueryCommand::latest_network_inferences("allorad", TopicId::from_trusted(7));
        assert_eq!(
            command.args,
            ["q", "emissions", "latest-network-inferences", "7"]
        );
    }

    #[test]
    fn test_inference_at_block_command() {
        let command = QueryCommand::inference_at_block(
            "allorad",
            TopicId::from_trusted(7),
            BlockNumber::from_trusted(1000),
        );
        assert_eq!(
            command.args,
            [
                "q",
                "emissions",
                "network-inferences-at-block-outlier-resistant",
                "7",
                "1000"
            ]
        );
    }

    #[test]
    fn test_block_command() {
        let command = QueryCommand::block("allorad", BlockNumber::from_trusted(1000));
        assert_eq!(command.args, ["query", "block", "--type=height", "1000"]);
    }

    #[test]
    fn test_describe_includes_program_and_args() {
        let command = QueryCommand::topic("allorad", TopicId::from_trusted(1));
        assert_eq!(command.describe(), "allorad q emissions topic 1");
    }

    #[tokio::test]
    async fn test_subprocess_spawn_failure_is_transient() {
        let executor = SubprocessExecutor::new(Duration::from_secs(1));
        let command = QueryCommand::topic("definitely-not-a-real-binary", TopicId::from_trusted(1));

        let outcome = executor.execute(&command, "https://rpc-1.example").await;
        assert!(matches!(outcome, QueryOutcome::Transient(_)));
    }
}
