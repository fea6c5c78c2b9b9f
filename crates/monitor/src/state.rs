//! Run state machine.
//!
//! ```text
//! Connecting -> Authenticated -> DevicesFetched -> {PolicyParsed | NoPolicy}
//!   -> TargetsResolved -> DataFetched -> PerDeviceProcessing -> Completed
//! ```
//!
//! Every non-terminal state may also move to `Failed`. `Completed` and
//! `Failed` are terminal.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Connecting,
    Authenticated,
    DevicesFetched,
    PolicyParsed,
    NoPolicy,
    TargetsResolved,
    DataFetched,
    PerDeviceProcessing,
    Completed,
    Failed(String),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed(_))
    }

    /// Whether `next` directly follows `self`.
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        use RunState::*;

        if let Failed(_) = next {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Connecting, Authenticated)
                | (Authenticated, DevicesFetched)
                | (DevicesFetched, PolicyParsed)
                | (DevicesFetched, NoPolicy)
                | (PolicyParsed, TargetsResolved)
                | (NoPolicy, TargetsResolved)
                | (TargetsResolved, DataFetched)
                | (DataFetched, PerDeviceProcessing)
                | (PerDeviceProcessing, Completed)
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Connecting => f.write_str("connecting"),
            RunState::Authenticated => f.write_str("authenticated"),
            RunState::DevicesFetched => f.write_str("devices fetched"),
            RunState::PolicyParsed => f.write_str("policy parsed"),
            RunState::NoPolicy => f.write_str("no policy"),
            RunState::TargetsResolved => f.write_str("targets resolved"),
            RunState::DataFetched => f.write_str("data fetched"),
            RunState::PerDeviceProcessing => f.write_str("processing devices"),
            RunState::Completed => f.write_str("completed"),
            RunState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
