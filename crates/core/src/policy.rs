//! Weekday screen-time policy (allowed minutes per day).
//!
//! A policy string is a run of `KEY MINUTES` tokens such as
//! `MO-TH90FR120SA-SU180`. A key is either a single day code (`FR`) or an
//! inclusive Monday-first range of two day codes (`MO-TH`). Ranges never wrap
//! past Sunday: `SA-MO` matches no day at all.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Weekday};
use regex::Regex;

use crate::clock::Clock;
use crate::error::CoreError;
use crate::types::Minutes;

// ---------------------------------------------------------------------------
// Day codes
// ---------------------------------------------------------------------------

/// Two-letter day codes, Monday first. The index is the weekday ordinal.
pub const DAY_CODES: [&str; 7] = ["MO", "TU", "WE", "TH", "FR", "SA", "SU"];

/// Regex matching one `KEY MINUTES` token.
const POLICY_TOKEN_PATTERN: &str = r"([A-Z-]+)(\d+)";

static POLICY_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(POLICY_TOKEN_PATTERN).expect("valid regex"));

/// Day code for a weekday.
pub fn day_code(weekday: Weekday) -> &'static str {
    DAY_CODES[weekday.num_days_from_monday() as usize]
}

fn day_index(code: &str) -> Option<usize> {
    DAY_CODES.iter().position(|c| *c == code)
}

/// Whether the range key `start-end` covers the weekday at `day_idx`.
fn range_covers(key: &str, day_idx: usize) -> bool {
    let mut parts = key.split('-');
    let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    match (day_index(start), day_index(end)) {
        (Some(start_idx), Some(end_idx)) => start_idx <= day_idx && day_idx <= end_idx,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// PolicyTable
// ---------------------------------------------------------------------------

/// Parsed policy: day key to allowed minutes, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyTable {
    entries: Vec<(String, Minutes)>,
}

impl PolicyTable {
    /// Parse a policy string.
    ///
    /// Characters between tokens are ignored. A key that appears twice keeps
    /// its first position but takes the last value. Fails when no token is
    /// found or a minute count does not fit.
    pub fn parse(policy: &str) -> Result<Self, CoreError> {
        let mut table = PolicyTable::default();

        for caps in POLICY_TOKEN_RE.captures_iter(policy) {
            let key = &caps[1];
            let minutes: Minutes = caps[2].parse().map_err(|e| {
                CoreError::InvalidPolicy(format!("minutes for {key} out of range: {e}"))
            })?;
            table.insert(key, minutes);
        }

        if table.is_empty() {
            return Err(CoreError::InvalidPolicy(
                "no valid policy entries found".to_string(),
            ));
        }
        Ok(table)
    }

    fn insert(&mut self, key: &str, minutes: Minutes) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = minutes,
            None => self.entries.push((key.to_string(), minutes)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Minutes> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, minutes)| *minutes)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Minutes)> {
        self.entries.iter().map(|(k, m)| (k.as_str(), *m))
    }

    /// Minutes allowed on `date`.
    ///
    /// An exact day key wins over any range. Among ranges the first one in
    /// table order that covers the day applies. No match means zero.
    pub fn allowed_minutes_for(&self, date: NaiveDate) -> Minutes {
        let weekday = date.weekday();
        let code = day_code(weekday);

        if let Some(minutes) = self.get(code) {
            return minutes;
        }

        let day_idx = weekday.num_days_from_monday() as usize;
        self.entries
            .iter()
            .filter(|(key, _)| key.contains('-'))
            .find(|(key, _)| range_covers(key, day_idx))
            .map(|(_, minutes)| *minutes)
            .unwrap_or(0)
    }

    /// `active_minutes` does not exceed the allowance for `date`.
    pub fn is_within_policy(&self, date: NaiveDate, active_minutes: Minutes) -> bool {
        active_minutes <= self.allowed_minutes_for(date)
    }

    /// Allowance for the clock's current local date.
    pub fn allowed_today(&self, clock: &dyn Clock) -> Minutes {
        self.allowed_minutes_for(clock.now().date_naive())
    }

    pub fn is_within_policy_today(&self, clock: &dyn Clock, active_minutes: Minutes) -> bool {
        self.is_within_policy(clock.now().date_naive(), active_minutes)
    }
}

impl FromStr for PolicyTable {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
