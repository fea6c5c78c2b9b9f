/// All stored timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Wall-clock time in the router's local zone, as seen by the policy engine.
pub type LocalTime = chrono::DateTime<chrono::FixedOffset>;

/// Allowed or consumed screen time, in whole minutes.
pub type Minutes = u32;
