use crate::config::CollectorConfig;
use crate::endpoint::{EndpointSelector, UniformRandomSelector};
use crate::errors::{CollectorError, Result};
use crate::exec::{QueryCommand, QueryExecutor, SubprocessExecutor};
use crate::retry::{run_with_retry, RetryPolicy};
use crate::types::{BlockNumber, CombinedValue, Topic, TopicId};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::warn;

/// Typed query operations against the chain node.
///
/// Every operation below the run entry point degrades to `false`/`None`
/// instead of raising; only [`InferenceProvider::latest_inference_block`]
/// surfaces a hard error, since the run cannot start without it.
pub trait InferenceProvider {
    /// Block height of the most recent network inference for a topic
    async fn latest_inference_block(&self, topic_id: TopicId) -> Result<BlockNumber>;

    /// Whether the topic exists on chain; `false` on any failure
    async fn is_topic_valid(&self, topic_id: TopicId) -> bool;

    /// Topic parameters, or `None` if the topic is invalid or any field is missing
    async fn get_topic(&self, topic_id: TopicId) -> Option<Topic>;

    /// The aggregated inference at a block, or `None` if unresolved
    async fn inference_at_block(
        &self,
        topic_id: TopicId,
        block: BlockNumber,
    ) -> Option<(BlockNumber, CombinedValue)>;

    /// The block header timestamp, or `None` if unresolved
    async fn block_time(&self, block: BlockNumber) -> Option<DateTime<Utc>>;
}

/// Field extraction over the node's loosely typed key-mapping payloads.
///
/// Absent keys and explicit `null` values are treated identically as
/// "field missing"; nothing is ever coerced to zero or an empty string.
mod payload {
    use serde_yaml::Value;

    /// Parses a raw payload, rejecting empty documents
    pub fn parse(raw: &str) -> Option<Value> {
        let value: Value = serde_yaml::from_str(raw).ok()?;
        if value.is_null() {
            return None;
        }
        Some(value)
    }

    /// Looks up a key, mapping `null` to absent
    pub fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
        match value.get(key) {
            None | Some(Value::Null) => None,
            Some(inner) => Some(inner),
        }
    }

    /// Reads an integer that the node may emit as a number or quoted string
    pub fn as_i64(value: &Value) -> Option<i64> {
        match value {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(value: &Value) -> Option<&str> {
        value.as_str()
    }

    pub fn as_bool(value: &Value) -> Option<bool> {
        match value {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => match text.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Reads a decimal that the node may emit as a number or quoted string
    pub fn as_decimal_text(value: &Value) -> Option<String> {
        match value {
            Value::Number(number) => Some(number.to_string()),
            Value::String(text) => Some(text.trim().to_string()),
            _ => None,
        }
    }
}

/// Normalizes a node block timestamp and parses it as RFC 3339 UTC.
///
/// Node timestamps can carry more fractional-second digits than a standard
/// parser accepts; the fractional component is dropped before parsing.
fn parse_block_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim().trim_matches('"');
    let normalized = match trimmed.split_once('.') {
        Some((whole, _fraction)) => format!("{whole}Z"),
        None => trimmed.to_string(),
    };

    DateTime::parse_from_rfc3339(&normalized)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Line prefix carrying the height in the latest-inference response
const INFERENCE_BLOCK_HEIGHT_PREFIX: &str = "inference_block_height:";

/// Chain query client issuing node CLI queries through the retry
/// coordinator.
///
/// Generic over the executor and the endpoint selection strategy so tests
/// can substitute scripted implementations.
pub struct AlloradClient<E = SubprocessExecutor, S = UniformRandomSelector> {
    executor: E,
    selector: S,
    policy: RetryPolicy,
    program: String,
}

impl AlloradClient {
    /// Creates a client with the subprocess executor and uniform-random
    /// endpoint selection from the given configuration
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let executor = SubprocessExecutor::new(Duration::from_secs(config.query_timeout));
        let selector = UniformRandomSelector::new(config.endpoints.clone())?;
        let policy = RetryPolicy::new(
            config.max_attempts,
            Duration::from_secs(config.retry_delay),
        );

        Ok(Self::with_parts(
            executor,
            selector,
            policy,
            config.command.clone(),
        ))
    }
}

impl<E, S> AlloradClient<E, S>
where
    E: QueryExecutor,
    S: EndpointSelector,
{
    /// Assembles a client from explicit parts, the injection seam for tests
    pub fn with_parts(executor: E, selector: S, policy: RetryPolicy, program: String) -> Self {
        Self {
            executor,
            selector,
            policy,
            program,
        }
    }

    async fn run(&self, command: QueryCommand) -> Result<String> {
        run_with_retry(&self.executor, &self.selector, &command, &self.policy).await
    }
}

impl<E, S> InferenceProvider for AlloradClient<E, S>
where
    E: QueryExecutor,
    S: EndpointSelector,
{
    async fn latest_inference_block(&self, topic_id: TopicId) -> Result<BlockNumber> {
        let raw = self
            .run(QueryCommand::latest_network_inferences(
                &self.program,
                topic_id,
            ))
            .await?;

        for line in raw.lines() {
            if let Some(rest) = line.trim().strip_prefix(INFERENCE_BLOCK_HEIGHT_PREFIX) {
                let height = rest.trim().trim_matches('"').parse::<i64>()?;
                return BlockNumber::new(height);
            }
        }

        Err(CollectorError::malformed_response(format!(
            "no {INFERENCE_BLOCK_HEIGHT_PREFIX} field in latest inference response for topic {topic_id}"
        )))
    }

    async fn is_topic_valid(&self, topic_id: TopicId) -> bool {
        let raw = match self
            .run(QueryCommand::topic_exists(&self.program, topic_id))
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!("[client] topic {} validation failed: {}", topic_id, e);
                return false;
            }
        };

        payload::parse(&raw)
            .and_then(|value| payload::field(&value, "exists").and_then(payload::as_bool))
            .unwrap_or(false)
    }

    async fn get_topic(&self, topic_id: TopicId) -> Option<Topic> {
        if !self.is_topic_valid(topic_id).await {
            warn!("[client] topic {} does not exist", topic_id);
            return None;
        }

        let raw = match self.run(QueryCommand::topic(&self.program, topic_id)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("[client] topic {} detail query failed: {}", topic_id, e);
                return None;
            }
        };

        let value = payload::parse(&raw)?;
        let topic = payload::field(&value, "topic")?;

        let epoch_last_ended =
            payload::field(topic, "epoch_last_ended").and_then(payload::as_i64)?;
        let epoch_length = payload::field(topic, "epoch_length").and_then(payload::as_i64)?;
        if epoch_length <= 0 {
            warn!(
                "[client] topic {} reports non-positive epoch length {}",
                topic_id, epoch_length
            );
            return None;
        }

        // Metadata is display-only; absence degrades to empty rather than None.
        let metadata = payload::field(topic, "metadata")
            .and_then(payload::as_str)
            .unwrap_or_default()
            .to_string();

        Some(Topic {
            id: topic_id,
            epoch_last_ended: BlockNumber::new(epoch_last_ended).ok()?,
            epoch_length,
            metadata,
        })
    }

    async fn inference_at_block(
        &self,
        topic_id: TopicId,
        block: BlockNumber,
    ) -> Option<(BlockNumber, CombinedValue)> {
        let raw = match self
            .run(QueryCommand::inference_at_block(
                &self.program,
                topic_id,
                block,
            ))
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "[client] inference query failed for topic {} at block {}: {}",
                    topic_id, block, e
                );
                return None;
            }
        };

        let value = payload::parse(&raw)?;
        let network_inferences = payload::field(&value, "network_inferences")?;
        let combined_value = payload::field(network_inferences, "combined_value")
            .and_then(payload::as_decimal_text)?;

        let combined_value = CombinedValue::new(combined_value)
            .map_err(|e| warn!("[client] unusable combined value at block {}: {}", block, e))
            .ok()?;

        Some((block, combined_value))
    }

    async fn block_time(&self, block: BlockNumber) -> Option<DateTime<Utc>> {
        let raw = match self.run(QueryCommand::block(&self.program, block)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("[client] block query failed for height {}: {}", block, e);
                return None;
            }
        };

        let value = payload::parse(&raw)?;
        let header = payload::field(&value, "header")?;
        let time = payload::field(header, "time").and_then(payload::as_str)?;

        parse_block_timestamp(time)
    }
}
