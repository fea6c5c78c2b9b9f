use std::fmt;

use homegate_core::error::CoreError;
use homegate_fritzbox::RouterError;

/// Router call that failed a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStep {
    Connect,
    FetchLandevices,
    FetchMonitorConfig,
    FetchMonitorData,
}

impl fmt::Display for RunStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunStep::Connect => "connect",
            RunStep::FetchLandevices => "fetch landevices",
            RunStep::FetchMonitorConfig => "fetch monitor config",
            RunStep::FetchMonitorData => "fetch monitor data",
        })
    }
}

/// Direction of an enforcement call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforcementAction {
    Block,
    Unblock,
}

impl EnforcementAction {
    pub fn blocks(self) -> bool {
        self == EnforcementAction::Block
    }
}

impl fmt::Display for EnforcementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EnforcementAction::Block => "block",
            EnforcementAction::Unblock => "unblock",
        })
    }
}

/// Error classes of a monitor run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad credentials, period or policy. Fatal, raised before any fetch.
    Config,
    /// A router call failed. Fatal.
    Collaborator,
    /// No measurements for a target. Soft.
    DeviceNotFound,
    /// A block/unblock could not be issued. Soft.
    Enforcement,
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("username and password are required")]
    MissingCredentials,

    #[error(transparent)]
    InvalidPeriod(CoreError),

    #[error("failed to parse policy: {0}")]
    InvalidPolicy(#[source] CoreError),

    #[error("failed to {step}: {source}")]
    Collaborator {
        step: RunStep,
        #[source]
        source: RouterError,
    },

    #[error(transparent)]
    DeviceNotFound(CoreError),

    #[error("failed to {action} device: {source}")]
    Enforcement {
        action: EnforcementAction,
        #[source]
        source: RouterError,
    },

    #[error("cannot {action}, no user UID for device")]
    NoIdentifier { action: EnforcementAction },
}

impl MonitorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MonitorError::MissingCredentials
            | MonitorError::InvalidPeriod(_)
            | MonitorError::InvalidPolicy(_) => ErrorKind::Config,
            MonitorError::Collaborator { .. } => ErrorKind::Collaborator,
            MonitorError::DeviceNotFound(_) => ErrorKind::DeviceNotFound,
            MonitorError::Enforcement { .. } | MonitorError::NoIdentifier { .. } => {
                ErrorKind::Enforcement
            }
        }
    }

    /// Fatal errors end the run; soft ones are recorded and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Config | ErrorKind::Collaborator)
    }
}

/// Invalid process configuration (environment variables).
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}
