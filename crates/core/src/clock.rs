//! Injectable source of "now".
//!
//! Weekday resolution and the daily window both depend on the current local
//! time. Reading it through [`Clock`] keeps those computations deterministic
//! under test.

use chrono::Local;

use crate::types::LocalTime;

pub trait Clock: Send + Sync {
    fn now(&self) -> LocalTime;
}

/// Reads the host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> LocalTime {
        Local::now().fixed_offset()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: LocalTime,
}

impl FixedClock {
    pub fn new(at: LocalTime) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> LocalTime {
        self.at
    }
}
