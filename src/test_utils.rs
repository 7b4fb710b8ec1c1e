//! Scripted test doubles shared by the unit test modules.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::client::InferenceProvider;
use crate::errors::{CollectorError, Result};
use crate::exec::{QueryCommand, QueryExecutor, QueryOutcome};
use crate::types::{BlockNumber, CombinedValue, Topic, TopicId};

/// A UTC timestamp from unix seconds, for fixtures
pub fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

/// Scripted query executor replaying a fixed outcome sequence.
///
/// Records the endpoint of every attempt so retry tests can assert the
/// per-attempt selection behavior.
pub struct MockQueryExecutor {
    outcomes: Mutex<VecDeque<QueryOutcome>>,
    endpoints_seen: Mutex<Vec<String>>,
}

impl MockQueryExecutor {
    pub fn with_outcomes(outcomes: Vec<QueryOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            endpoints_seen: Mutex::new(Vec::new()),
        }
    }

    pub async fn attempt_count(&self) -> usize {
        self.endpoints_seen.lock().await.len()
    }

    pub async fn seen_endpoints(&self) -> Vec<String> {
        self.endpoints_seen.lock().await.clone()
    }
}

impl QueryExecutor for MockQueryExecutor {
    async fn execute(&self, _command: &QueryCommand, endpoint: &str) -> QueryOutcome {
        self.endpoints_seen.lock().await.push(endpoint.to_string());

        match self.outcomes.lock().await.pop_front() {
            Some(outcome) => outcome,
            None => QueryOutcome::Transient("no scripted outcome left".to_string()),
        }
    }
}

/// Scripted inference provider replaying per-operation response queues,
/// one entry consumed per call
pub struct MockInferenceProvider {
    latest_blocks: Mutex<VecDeque<BlockNumber>>,
    validity: Mutex<VecDeque<bool>>,
    topics: Mutex<VecDeque<Option<Topic>>>,
    inferences: Mutex<VecDeque<Option<(BlockNumber, CombinedValue)>>>,
    block_times: Mutex<VecDeque<Option<DateTime<Utc>>>>,
}

impl Default for MockInferenceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockInferenceProvider {
    pub fn new() -> Self {
        Self {
            latest_blocks: Mutex::new(VecDeque::new()),
            validity: Mutex::new(VecDeque::new()),
            topics: Mutex::new(VecDeque::new()),
            inferences: Mutex::new(VecDeque::new()),
            block_times: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_topics(self, topics: Vec<Option<Topic>>) -> Self {
        *self.topics.try_lock().unwrap() = topics.into();
        self
    }

    pub fn with_inferences(
        self,
        inferences: Vec<Option<(BlockNumber, CombinedValue)>>,
    ) -> Self {
        *self.inferences.try_lock().unwrap() = inferences.into();
        self
    }

    pub fn with_block_times(self, block_times: Vec<Option<DateTime<Utc>>>) -> Self {
        *self.block_times.try_lock().unwrap() = block_times.into();
        self
    }
}

impl InferenceProvider for MockInferenceProvider {
    async fn latest_inference_block(&self, _topic_id: TopicId) -> Result<BlockNumber> {
        match self.latest_blocks.lock().await.pop_front() {
            Some(block) => Ok(block),
            None => Err(CollectorError::command_failed(
                "no scripted latest inference block",
            )),
        }
    }

    async fn is_topic_valid(&self, _topic_id: TopicId) -> bool {
        self.validity.lock().await.pop_front().unwrap_or(false)
    }

    async fn get_topic(&self, _topic_id: TopicId) -> Option<Topic> {
        self.topics.lock().await.pop_front().flatten()
    }

    async fn inference_at_block(
        &self,
        _topic_id: TopicId,
        _block: BlockNumber,
    ) -> Option<(BlockNumber, CombinedValue)> {
        self.inferences.lock().await.pop_front().flatten()
    }

    async fn block_time(&self, _block: BlockNumber) -> Option<DateTime<Utc>> {
        self.block_times.lock().await.pop_front().flatten()
    }
}
