//! Monitor orchestrator for the home router usage monitor.
//!
//! [`Monitor::run`] performs one pass: connect, load devices, resolve
//! targets, fetch measurements, report per device and enforce the daily
//! policy. Host processes build a [`Monitor`] from [`Settings`] and decide
//! how often to run it.

pub mod error;
pub mod options;
pub mod report;
pub mod run;
pub mod state;

pub use error::{ErrorKind, MonitorError, SettingsError};
pub use options::{MonitorOptions, Settings};
pub use run::{Monitor, RunOutcome};
pub use state::RunState;
