use crate::errors::{CollectorError, Result};

/// Environment variable holding the comma-separated node endpoint pool
const RPC_URLS_ENV: &str = "RPC_URLS";

/// Runtime configuration for a collection run
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Static non-empty pool of node endpoints
    pub endpoints: Vec<String>,
    /// Node CLI program used to issue queries
    pub command: String,
    /// Hard wall-clock timeout per query attempt, seconds
    pub query_timeout: u64,
    /// Bounded attempts per logical query
    pub max_attempts: u8,
    /// Fixed delay between retry attempts, seconds
    pub retry_delay: u64,
    /// Rate-limiting pause after a resolved zero value, seconds
    pub zero_value_cooldown: u64,
    /// Chain average block interval, seconds
    pub block_interval_seconds: i64,
    /// Consecutive resolved zeros that halt a run
    pub max_consecutive_zeros: u32,
}

impl CollectorConfig {
    #[must_use]
    pub const fn builder() -> CollectorConfigBuilder {
        CollectorConfigBuilder::new()
    }

    /// Builds a configuration from environment variables.
    ///
    /// `RPC_URLS` is required (comma-separated). `ALLORAD_BIN`,
    /// `QUERY_TIMEOUT`, `SLEEP_TIME`, `ZERO_SLEEP_TIME` and
    /// `ALLORA_CHAIN_BLOCK_TIME_IN_SECONDS` override the defaults.
    pub fn from_env() -> Result<Self> {
        let raw_urls = dotenvy::var(RPC_URLS_ENV).map_err(|_| {
            CollectorError::configuration(RPC_URLS_ENV, "Missing environment variable")
        })?;
        let endpoints: Vec<String> = raw_urls
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();

        let mut builder = Self::builder()
            .endpoints(endpoints)
            .query_timeout(env_u64("QUERY_TIMEOUT", 15)?)
            .retry_delay(env_u64("SLEEP_TIME", 5)?)
            .zero_value_cooldown(env_u64("ZERO_SLEEP_TIME", 2)?)
            .block_interval_seconds(env_i64("ALLORA_CHAIN_BLOCK_TIME_IN_SECONDS", 5)?);

        if let Ok(command) = dotenvy::var("ALLORAD_BIN") {
            builder = builder.command(command);
        }

        builder.build()
    }
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match dotenvy::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| CollectorError::configuration(name, format!("Invalid value: {e}"))),
        Err(_) => Ok(default),
    }
}

fn env_i64(name: &str, default: i64) -> Result<i64> {
    match dotenvy::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|e| CollectorError::configuration(name, format!("Invalid value: {e}"))),
        Err(_) => Ok(default),
    }
}

pub struct CollectorConfigBuilder {
    endpoints: Vec<String>,
    command: Option<String>,
    query_timeout: u64,
    max_attempts: u8,
    retry_delay: u64,
    zero_value_cooldown: u64,
    block_interval_seconds: i64,
    max_consecutive_zeros: u32,
}

impl CollectorConfigBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            endpoints: Vec::new(),
            command: None,
            query_timeout: 15,
            max_attempts: 3,
            retry_delay: 5,
            zero_value_cooldown: 2,
            block_interval_seconds: 5,
            max_consecutive_zeros: 3,
        }
    }

    /// Preset with no inter-attempt waits, for tests
    #[must_use]
    pub const fn testing() -> Self {
        Self::new()
            .query_timeout(1)
            .retry_delay(0)
            .zero_value_cooldown(0)
            .block_interval_seconds(1)
    }

    #[must_use]
    pub fn endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.endpoints = endpoints;
        self
    }

    #[must_use]
    pub fn command<S: Into<String>>(mut self, command: S) -> Self {
        self.command = Some(command.into());
        self
    }

    #[must_use]
    pub const fn query_timeout(mut self, query_timeout: u64) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    #[must_use]
    pub const fn max_attempts(mut self, max_attempts: u8) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub const fn retry_delay(mut self, retry_delay: u64) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    #[must_use]
    pub const fn zero_value_cooldown(mut self, zero_value_cooldown: u64) -> Self {
        self.zero_value_cooldown = zero_value_cooldown;
        self
    }

    #[must_use]
    pub const fn block_interval_seconds(mut self, block_interval_seconds: i64) -> Self {
        self.block_interval_seconds = block_interval_seconds;
        self
    }

    #[must_use]
    pub const fn max_consecutive_zeros(mut self, max_consecutive_zeros: u32) -> Self {
        self.max_consecutive_zeros = max_consecutive_zeros;
        self
    }

    pub fn build(self) -> Result<CollectorConfig> {
        if self.endpoints.is_empty() {
            return Err(CollectorError::configuration(
                "endpoints",
                "Endpoint pool must not be empty",
            ));
        }

        if self.endpoints.iter().any(|url| url.trim().is_empty()) {
            return Err(CollectorError::configuration(
                "endpoints",
                "Endpoint addresses must not be blank",
            ));
        }

        if self.query_timeout == 0 {
            return Err(CollectorError::configuration(
                "query_timeout",
                "Query timeout must be greater than 0",
            ));
        }

        if self.max_attempts == 0 {
            return Err(CollectorError::configuration(
                "max_attempts",
                "Max attempts must be greater than 0",
            ));
        }

        if self.block_interval_seconds <= 0 {
            return Err(CollectorError::configuration(
                "block_interval_seconds",
                "Block interval must be greater than 0",
            ));
        }

        if self.max_consecutive_zeros == 0 {
            return Err(CollectorError::configuration(
                "max_consecutive_zeros",
                "Consecutive zero threshold must be greater than 0",
            ));
        }

        Ok(CollectorConfig {
            endpoints: self.endpoints,
            command: self.command.unwrap_or_else(|| "allorad".to_string()),
            query_timeout: self.query_timeout,
            max_attempts: self.max_attempts,
            retry_delay: self.retry_delay,
            zero_value_cooldown: self.zero_value_cooldown,
            block_interval_seconds: self.block_interval_seconds,
            max_consecutive_zeros: self.max_consecutive_zeros,
        })
    }
}

impl Default for CollectorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
