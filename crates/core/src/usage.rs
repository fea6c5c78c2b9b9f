//! Traffic-counter analysis.
//!
//! Turns the router's per-direction byte/s series into byte totals, the
//! number of active quarter hours since midnight, and a short activity
//! timeline. Series are ordered oldest first; the last sample is the most
//! recent completed interval.
//!
//! Pure logic, no I/O. The caller supplies the current local time.

use chrono::Timelike;

use crate::types::{LocalTime, Minutes};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Width of one daily-series interval in minutes.
pub const DAILY_INTERVAL_MINUTES: Minutes = 15;

/// Samples in a full daily series (24h of quarter hours).
pub const DAILY_INTERVALS: usize = 96;

/// Number of intervals shown in the timeline (12 hours).
pub const TIMELINE_WINDOW: usize = 48;

/// Timeline symbol marking local midnight.
const BOUNDARY_SYMBOL: char = '|';
const ACTIVE_SYMBOL: char = '*';
const INACTIVE_SYMBOL: char = '.';

// ---------------------------------------------------------------------------
// Interval helpers
// ---------------------------------------------------------------------------

/// Completed quarter hours since local midnight.
pub fn intervals_since_midnight(now: &LocalTime) -> usize {
    let minutes = now.hour() * 60 + now.minute();
    (minutes / DAILY_INTERVAL_MINUTES) as usize
}

/// An interval is active when either direction strictly exceeds the
/// threshold. A missing sample on either side counts as zero.
pub fn is_active(rcv: &[f64], snd: &[f64], idx: usize, threshold: f64) -> bool {
    let down = rcv.get(idx).copied().unwrap_or(0.0);
    let up = snd.get(idx).copied().unwrap_or(0.0);
    down > threshold || up > threshold
}

/// First index of the daily window (today's samples only).
pub fn daily_window_start(len: usize, intervals_since_midnight: usize) -> usize {
    len.saturating_sub(intervals_since_midnight)
}

// ---------------------------------------------------------------------------
// Hourly totals
// ---------------------------------------------------------------------------

/// Bytes transferred per direction over an hourly series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HourlyTotals {
    pub downstream_bytes: i64,
    pub upstream_bytes: i64,
}

/// Sum `sample * interval_seconds` per direction.
///
/// Each product is truncated before it is added, so the totals match the
/// router's own per-interval byte counts.
pub fn compute_hourly_totals(rcv: &[f64], snd: &[f64], interval_seconds: f64) -> HourlyTotals {
    let total = |series: &[f64]| -> i64 {
        series
            .iter()
            .map(|rate| (rate * interval_seconds) as i64)
            .sum()
    };

    HourlyTotals {
        downstream_bytes: total(rcv),
        upstream_bytes: total(snd),
    }
}

// ---------------------------------------------------------------------------
// Daily activity
// ---------------------------------------------------------------------------

/// Active intervals since local midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyActivity {
    /// `active_count * 15`.
    pub active_minutes: Minutes,
    pub active_count: usize,
    /// Index into the series where the daily window begins.
    pub window_start: usize,
    /// Activity flag per interval of the daily window.
    pub window: Vec<bool>,
}

/// Count active intervals in the suffix of the series that belongs to today.
pub fn compute_daily_activity(
    rcv: &[f64],
    snd: &[f64],
    threshold: f64,
    intervals_since_midnight: usize,
) -> DailyActivity {
    let window_start = daily_window_start(rcv.len(), intervals_since_midnight);
    let window: Vec<bool> = (window_start..rcv.len())
        .map(|idx| is_active(rcv, snd, idx, threshold))
        .collect();
    let active_count = window.iter().filter(|active| **active).count();

    DailyActivity {
        active_minutes: active_count as Minutes * DAILY_INTERVAL_MINUTES,
        active_count,
        window_start,
        window,
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// Activity over the most recent intervals, with the midnight boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    pub activity: Vec<bool>,
    /// Slot where local midnight falls. May lie outside the window, in which
    /// case no marker is drawn.
    pub boundary_position: i64,
}

impl Timeline {
    /// Number of intervals in the (possibly shrunk) window.
    pub fn len(&self) -> usize {
        self.activity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activity.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.activity.iter().filter(|active| **active).count()
    }

    pub fn active_minutes(&self) -> Minutes {
        self.active_count() as Minutes * DAILY_INTERVAL_MINUTES
    }

    fn boundary_slot(&self) -> Option<usize> {
        usize::try_from(self.boundary_position)
            .ok()
            .filter(|pos| *pos < self.activity.len())
    }

    /// One symbol per interval: `|` at midnight, `*` active, `.` idle.
    pub fn render(&self) -> String {
        let boundary = self.boundary_slot();
        self.activity
            .iter()
            .enumerate()
            .map(|(idx, active)| {
                if boundary == Some(idx) {
                    BOUNDARY_SYMBOL
                } else if *active {
                    ACTIVE_SYMBOL
                } else {
                    INACTIVE_SYMBOL
                }
            })
            .collect()
    }
}

/// Activity over the last `window_size` samples.
///
/// A shorter series shrinks the window instead of padding it, and the
/// midnight boundary is measured against the shrunk window.
pub fn compute_timeline(
    rcv: &[f64],
    snd: &[f64],
    threshold: f64,
    window_size: usize,
    intervals_since_midnight: usize,
) -> Timeline {
    let window_size = window_size.min(rcv.len());
    let start = rcv.len() - window_size;
    let activity = (start..rcv.len())
        .map(|idx| is_active(rcv, snd, idx, threshold))
        .collect();

    Timeline {
        activity,
        boundary_position: window_size as i64 - intervals_since_midnight as i64,
    }
}

// ---------------------------------------------------------------------------
// Active periods
// ---------------------------------------------------------------------------

/// Render an ISO 8601 duration such as `PT45M`, `PT1H` or `PT1H15M`.
pub fn iso8601_duration(minutes: Minutes) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, 0) => "PT0M".to_string(),
        (0, m) => format!("PT{m}M"),
        (h, 0) => format!("PT{h}H"),
        (h, m) => format!("PT{h}H{m}M"),
    }
}

/// Collapse the daily window into `"<HH:MM±hh:mm>/<duration>"` tokens, one
/// per run of consecutive active intervals.
///
/// The window's last entry is the quarter hour that ended at the most recent
/// boundary before `now`, so entry `k` of a window of length `n` started
/// `intervals_since_midnight - n + k` quarter hours after midnight.
pub fn active_periods(window: &[bool], now: &LocalTime) -> Vec<String> {
    let elapsed = intervals_since_midnight(now);
    let first_slot = elapsed.saturating_sub(window.len());
    let offset = now.format("%:z").to_string();

    let mut periods = Vec::new();
    let mut run_start: Option<usize> = None;

    for (idx, active) in window.iter().chain(std::iter::once(&false)).enumerate() {
        match (*active, run_start) {
            (true, None) => run_start = Some(idx),
            (false, Some(start)) => {
                let start_minutes = (first_slot + start) as Minutes * DAILY_INTERVAL_MINUTES;
                let length = (idx - start) as Minutes * DAILY_INTERVAL_MINUTES;
                periods.push(format!(
                    "{:02}:{:02}{offset}/{}",
                    start_minutes / 60,
                    start_minutes % 60,
                    iso8601_duration(length)
                ));
                run_start = None;
            }
            _ => {}
        }
    }

    periods
}
