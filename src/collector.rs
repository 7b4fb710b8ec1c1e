use crate::client::InferenceProvider;
use crate::config::CollectorConfig;
use crate::types::{BlockNumber, InferenceRecord, TopicId};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// How a collection run ended.
///
/// Reported alongside the record sequence so an empty dataset is never
/// conflated with a successful walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    /// The walk descended past the target block
    Exhausted,
    /// Too many consecutive zero-valued samples
    Anomaly,
    /// Topic lookup failed before any block was visited
    TopicError,
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Exhausted => "exhausted",
            Self::Anomaly => "anomaly",
            Self::TopicError => "topic error",
        };
        write!(f, "{label}")
    }
}

/// Result of a collection run: the ordered dataset plus the terminal state
#[derive(Debug)]
pub struct CollectionOutcome {
    /// Records in collection order, descending block height
    pub records: Vec<InferenceRecord>,
    pub terminal_state: TerminalState,
}

/// Working state of the backward walk, destroyed when the run terminates
struct CollectionState {
    current_block: BlockNumber,
    consecutive_zero_count: u32,
    records: Vec<InferenceRecord>,
}

impl CollectionState {
    const fn new(start_block: BlockNumber) -> Self {
        Self {
            current_block: start_block,
            consecutive_zero_count: 0,
            records: Vec::new(),
        }
    }

    fn step_down(&mut self, epoch_length: i64) {
        self.current_block = self.current_block - epoch_length;
    }
}

/// The backward block-walking collection state machine.
///
/// Issues one query at a time; the consecutive-zero counter and the
/// monotonic descent both depend on strict sequential ordering.
pub struct DataCollector<T> {
    provider: Arc<T>,
    zero_value_cooldown: Duration,
    max_consecutive_zeros: u32,
}

impl<T> DataCollector<T>
where
    T: InferenceProvider + Send + Sync,
{
    pub fn new(provider: Arc<T>, config: &CollectorConfig) -> Self {
        Self {
            provider,
            zero_value_cooldown: Duration::from_secs(config.zero_value_cooldown),
            max_consecutive_zeros: config.max_consecutive_zeros,
        }
    }

    /// Walks backward from the topic's last epoch boundary to `target_block`
    /// in epoch-length strides, collecting one record per resolved non-zero
    /// observation.
    pub async fn run_collection(
        &self,
        topic_id: TopicId,
        target_block: BlockNumber,
    ) -> CollectionOutcome {
        let Some(topic) = self.provider.get_topic(topic_id).await else {
            error!("[collector] failed to get topic {} information", topic_id);
            return CollectionOutcome {
                records: Vec::new(),
                terminal_state: TerminalState::TopicError,
            };
        };

        info!("[collector] topic metadata: {}", topic.metadata);
        info!(
            "[collector] epoch last ended at block {}, epoch length {}",
            topic.epoch_last_ended, topic.epoch_length
        );

        let mut state = CollectionState::new(topic.epoch_last_ended);

        while state.current_block >= target_block {
            let current = state.current_block;
            info!("[collector] processing block {}", current);

            // Unresolved steps are skipped without touching the zero
            // counter; only resolved-but-zero values count toward it.
            let Some((block, combined_value)) =
                self.provider.inference_at_block(topic_id, current).await
            else {
                warn!("[collector] no inference data at block {}", current);
                state.step_down(topic.epoch_length);
                continue;
            };

            let Some(block_timestamp) = self.provider.block_time(current).await else {
                warn!("[collector] no timestamp for block {}", current);
                state.step_down(topic.epoch_length);
                continue;
            };

            if combined_value.is_zero() {
                state.consecutive_zero_count += 1;
                info!(
                    "[collector] zero combined value at block {}, consecutive zeros: {}",
                    current, state.consecutive_zero_count
                );

                // A rate-limiting pause, not error recovery.
                sleep(self.zero_value_cooldown).await;

                if state.consecutive_zero_count >= self.max_consecutive_zeros {
                    warn!(
                        "[collector] reached {} consecutive zero values, stopping collection",
                        state.consecutive_zero_count
                    );
                    return CollectionOutcome {
                        records: state.records,
                        terminal_state: TerminalState::Anomaly,
                    };
                }

                state.step_down(topic.epoch_length);
                continue;
            }

            state.consecutive_zero_count = 0;
            info!(
                "[collector] collected {} at block {} ({})",
                combined_value, block, block_timestamp
            );
            state.records.push(InferenceRecord {
                block_height: block,
                block_timestamp,
                combined_value,
            });

            state.step_down(topic.epoch_length);
        }

        CollectionOutcome {
            records: state.records,
            terminal_state: TerminalState::Exhausted,
        }
    }
}
