//! Measurement granularity.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Router dataset holding the per-MAC traffic counters.
pub const MONITOR_DATASET: &str = "macaddrs";

/// Which monitor subset a run reads.
///
/// `Hour` is the last hour at one sample per minute; `Day` is the last
/// day at one sample per quarter hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Hour,
    Day,
}

impl Period {
    /// Router subset identifier for this granularity.
    pub fn subset_id(self) -> &'static str {
        match self {
            Period::Hour => "subset0001",
            Period::Day => "subset0002",
        }
    }

    /// Width of one sample in seconds.
    pub fn interval_seconds(self) -> f64 {
        match self {
            Period::Hour => 60.0,
            Period::Day => 900.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Hour => "hour",
            Period::Day => "day",
        }
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(Period::Hour),
            "day" => Ok(Period::Day),
            other => Err(CoreError::InvalidPeriod(other.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
