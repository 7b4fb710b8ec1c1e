use crate::errors::{CollectorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

/// A chain block height with validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockNumber(i64);

impl BlockNumber {
    /// Creates a new `BlockNumber` with validation
    pub fn new(value: i64) -> Result<Self> {
        if value < 0 {
            return Err(CollectorError::invalid_format(
                "block_number",
                format!("Block number cannot be negative: {value}"),
            ));
        }
        Ok(Self(value))
    }

    /// Creates a `BlockNumber` without validation (for trusted sources)
    #[must_use]
    pub const fn from_trusted(value: i64) -> Self {
        Self(value)
    }

    /// Gets the inner value
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<BlockNumber> for i64 {
    fn from(block_number: BlockNumber) -> Self {
        block_number.0
    }
}

impl FromStr for BlockNumber {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.parse::<i64>().map_err(|e| {
            CollectorError::invalid_format(
                "block_number",
                format!("Invalid block number '{s}': {e}"),
            )
        })?;
        Self::new(value)
    }
}

impl Sub<i64> for BlockNumber {
    type Output = Self;

    fn sub(self, other: i64) -> Self {
        Self::from_trusted(self.0 - other)
    }
}

impl Sub<Self> for BlockNumber {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::from_trusted(self.0 - other.0)
    }
}

/// An externally assigned topic identifier, strictly positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicId(u64);

impl TopicId {
    /// Creates a new `TopicId` with validation
    pub fn new(value: u64) -> Result<Self> {
        if value == 0 {
            return Err(CollectorError::invalid_format(
                "topic_id",
                "Topic id must be a positive integer",
            ));
        }
        Ok(Self(value))
    }

    /// Creates a `TopicId` without validation (for trusted sources)
    #[must_use]
    pub const fn from_trusted(value: u64) -> Self {
        Self(value)
    }

    /// Gets the inner value
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TopicId {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.parse::<u64>().map_err(|e| {
            CollectorError::invalid_format("topic_id", format!("Invalid topic id '{s}': {e}"))
        })?;
        Self::new(value)
    }
}

/// An aggregated inference value as reported by the node.
///
/// The node reports decimal strings with more precision than an `f64`
/// holds, so the raw text is preserved verbatim. Zero is a "no data"
/// sentinel, not a valid observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedValue(String);

impl CombinedValue {
    /// Creates a new `CombinedValue`, rejecting text that is not a decimal number
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let parsed = value.trim().parse::<f64>().map_err(|e| {
            CollectorError::invalid_format(
                "combined_value",
                format!("Invalid decimal value '{value}': {e}"),
            )
        })?;
        if !parsed.is_finite() {
            return Err(CollectorError::invalid_format(
                "combined_value",
                format!("Non-finite decimal value '{value}'"),
            ));
        }
        Ok(Self(value.trim().to_string()))
    }

    /// Creates a `CombinedValue` without validation (for trusted sources)
    #[must_use]
    pub const fn from_trusted(value: String) -> Self {
        Self(value)
    }

    /// Whether this value is the zero "no data" sentinel
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.parse::<f64>().map(|v| v == 0.0).unwrap_or(false)
    }

    /// Gets the inner value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombinedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Topic parameters fetched once at the start of a collection run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: TopicId,
    /// Most recent completed epoch boundary at query time
    pub epoch_last_ended: BlockNumber,
    /// Number of blocks per epoch; the collection stride
    pub epoch_length: i64,
    /// Opaque descriptive string, display-only
    pub metadata: String,
}

/// One collected observation.
///
/// Records are append-only and ordered by descending block height; every
/// record carries a non-zero value and a resolved timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferenceRecord {
    pub block_height: BlockNumber,
    pub block_timestamp: DateTime<Utc>,
    pub combined_value: CombinedValue,
}
