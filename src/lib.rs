//! # Allora Chain Data
//!
//! A collector that polls an Allora chain node for a topic's network
//! inference values, walking backward through chain history in epoch-sized
//! steps, and assembles an ordered dataset of
//! (block height, timestamp, value) records for a lookback window.
//!
//! ## Architecture Overview
//!
//! The crate is organized leaf-first around the query/retry engine:
//!
//! ```text
//! timeframe ──► target block
//!                    │
//!               collector ──► client ──► retry ──► exec ──► endpoint
//!                    │
//!               ordered dataset ──► export
//! ```
//!
//! - [`endpoint`] - Endpoint selection strategies over the node pool
//! - [`exec`] - Node CLI query construction, subprocess execution, and
//!   transient/fatal outcome classification
//! - [`retry`] - Bounded-attempt retry loop with a fixed inter-attempt delay
//! - [`client`] - Typed chain query operations and response parsing
//! - [`timeframe`] - Lookback window to block count conversion
//! - [`collector`] - The backward block-walking collection state machine
//! - [`export`] - Plain CSV persistence of the collected dataset
//! - [`config`] - Environment-driven runtime configuration
//! - [`errors`] - Domain-specific error types
//! - [`types`] - Validated domain newtypes and records
//!
//! The collector issues one query at a time; every wait (per-attempt
//! timeout, retry delay, zero-value cooldown) is a cooperative suspension
//! of the single collection flow.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use allora_chain_data::client::{AlloradClient, InferenceProvider};
//! use allora_chain_data::collector::DataCollector;
//! use allora_chain_data::config::CollectorConfig;
//! use allora_chain_data::timeframe::Timeframe;
//! use allora_chain_data::types::{BlockNumber, TopicId};
//!
//! # async fn example() -> eyre::Result<()> {
//! let config = CollectorConfig::from_env()?;
//! let client = Arc::new(AlloradClient::new(&config)?);
//! let topic_id = TopicId::new(13)?;
//!
//! let latest = client.latest_inference_block(topic_id).await?;
//! let lookback = Timeframe::Day.blocks_for(config.block_interval_seconds);
//! let target = BlockNumber::new((latest.value() - lookback).max(1))?;
//!
//! let collector = DataCollector::new(client, &config);
//! let outcome = collector.run_collection(topic_id, target).await;
//! println!("{} records ({})", outcome.records.len(), outcome.terminal_state);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod client;
pub mod collector;
pub mod config;
pub mod endpoint;
pub mod errors;
pub mod exec;
pub mod export;
pub mod retry;
pub mod timeframe;
pub mod types;

#[cfg(test)]
mod test_utils;

// Public re-exports for simplified API
pub use collector::{CollectionOutcome, DataCollector, TerminalState};
pub use errors::{CollectorError, Result};
pub use timeframe::Timeframe;
pub use types::{BlockNumber, CombinedValue, InferenceRecord, Topic, TopicId};
