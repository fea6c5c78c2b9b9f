//! Result of one monitor run, as published to status readers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{Minutes, Timestamp};

/// Usage of one monitored device for the current day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceUsage {
    /// Normalized MAC (lowercase, no colons).
    pub mac: String,
    pub name: String,
    pub daily_active_minutes: Minutes,
    /// Active periods as `"<HH:MM±hh:mm>/<ISO 8601 duration>"`.
    pub active: Vec<String>,
}

/// Aggregate of one monitor run. Partial when the run failed.
///
/// `Default` is the "no run yet" value handed out before the first update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Landevices reported by the router.
    pub devices_checked: usize,
    /// Devices that carry an owning-user identifier.
    pub users_fetched: usize,
    /// Fatal and soft errors, in the order they occurred.
    pub errors: Vec<String>,
    pub start_time: Option<Timestamp>,
    #[serde(rename = "duration_ms", with = "duration_millis")]
    pub duration: Duration,
    pub devices: Vec<DeviceUsage>,
}

impl Summary {
    /// Copy with the timing fields cleared, for comparing runs.
    pub fn without_timing(&self) -> Self {
        Self {
            start_time: None,
            duration: Duration::ZERO,
            ..self.clone()
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> Summary {
        Summary {
            devices_checked: 3,
            users_fetched: 2,
            errors: vec!["MAC tablet not found in data".to_string()],
            start_time: Some(Utc.timestamp_opt(1000, 0).unwrap()),
            duration: Duration::from_millis(500),
            devices: vec![DeviceUsage {
                mac: "aa11bb22cc33".to_string(),
                name: "iPad".to_string(),
                daily_active_minutes: 45,
                active: vec![
                    "10:00+02:00/PT45M".to_string(),
                    "14:15+02:00/PT1H".to_string(),
                ],
            }],
        }
    }

    #[test]
    fn summary_serializes_with_millisecond_duration() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["devices_checked"], 3);
        assert_eq!(json["users_fetched"], 2);
        assert_eq!(json["duration_ms"], 500);
        assert_eq!(json["start_time"], "1970-01-01T00:16:40Z");
        assert_eq!(json["errors"][0], "MAC tablet not found in data");
        assert_eq!(json["devices"][0]["mac"], "aa11bb22cc33");
        assert_eq!(json["devices"][0]["daily_active_minutes"], 45);
        assert_eq!(json["devices"][0]["active"][1], "14:15+02:00/PT1H");
    }

    #[test]
    fn default_summary_has_null_start_time() {
        let json = serde_json::to_value(Summary::default()).unwrap();
        assert!(json["start_time"].is_null());
        assert_eq!(json["duration_ms"], 0);
        assert_eq!(json["devices"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn without_timing_clears_only_timing() {
        let summary = sample();
        let stripped = summary.without_timing();
        assert_eq!(stripped.start_time, None);
        assert_eq!(stripped.duration, Duration::ZERO);
        assert_eq!(stripped.devices, summary.devices);
        assert_eq!(stripped.errors, summary.errors);
    }
}
