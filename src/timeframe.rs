use crate::errors::{CollectorError, Result};
use std::fmt;
use std::str::FromStr;

/// A closed set of human lookback windows.
///
/// Durations are fixed: the month is a 30-day month, not calendar-accurate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Hour,
    Day,
    Week,
    Month,
}

impl Timeframe {
    /// Every supported timeframe, shortest first
    pub const ALL: [Self; 4] = [Self::Hour, Self::Day, Self::Week, Self::Month];

    /// Window duration in seconds
    #[must_use]
    pub const fn duration_seconds(self) -> i64 {
        match self {
            Self::Hour => 3600,
            Self::Day => 86_400,
            Self::Week => 604_800,
            Self::Month => 2_592_000,
        }
    }

    /// Number of blocks covering this window at the given average block
    /// interval, rounded up so the window is never shorter than requested.
    ///
    /// The interval must be positive; [`crate::config::CollectorConfig`]
    /// validates it at build time.
    #[must_use]
    pub const fn blocks_for(self, block_interval_seconds: i64) -> i64 {
        let seconds = self.duration_seconds();
        (seconds + block_interval_seconds - 1) / block_interval_seconds
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Hour => "1Hour",
            Self::Day => "1Day",
            Self::Week => "1Week",
            Self::Month => "1Month",
        };
        write!(f, "{label}")
    }
}

impl FromStr for Timeframe {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1Hour" => Ok(Self::Hour),
            "1Day" => Ok(Self::Day),
            "1Week" => Ok(Self::Week),
            "1Month" => Ok(Self::Month),
            other => Err(CollectorError::invalid_timeframe(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_for_exact_division() {
        // 86400 / 5 divides evenly.
        assert_eq!(Timeframe::Day.blocks_for(5), 17_280);
    }

    #[test]
    fn test_blocks_for_rounds_up() {
        // 3600 / 7 = 514.28..., must round to 515 so the window is not short.
        assert_eq!(Timeframe::Hour.blocks_for(7), 515);
    }

    #[test]
    fn test_blocks_for_one_second_interval() {
        assert_eq!(Timeframe::Month.blocks_for(1), 2_592_000);
    }

    #[test]
    fn test_from_str_accepts_supported_labels() {
        assert_eq!("1Hour".parse::<Timeframe>().unwrap(), Timeframe::Hour);
        assert_eq!("1Day".parse::<Timeframe>().unwrap(), Timeframe::Day);
        assert_eq!("1Week".parse::<Timeframe>().unwrap(), Timeframe::Week);
        assert_eq!("1Month".parse::<Timeframe>().unwrap(), Timeframe::Month);
    }

    #[test]
    fn test_from_str_rejects_unknown_labels() {
        let err = "2Years".parse::<Timeframe>().unwrap_err();
        assert!(matches!(err, CollectorError::InvalidTimeframe { .. }));
        assert!("1hour".parse::<Timeframe>().is_err());
        assert!("".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for timeframe in Timeframe::ALL {
            let label = timeframe.to_string();
            assert_eq!(label.parse::<Timeframe>().unwrap(), timeframe);
        }
    }
}
