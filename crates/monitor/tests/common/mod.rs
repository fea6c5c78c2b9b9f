#![allow(dead_code)]

use std::sync::Arc;

use chrono::DateTime;
use homegate_core::clock::FixedClock;
use homegate_fritzbox::fake::FakeRouterClient;
use homegate_fritzbox::types::{Landevice, SubsetData};
use homegate_monitor::{Monitor, MonitorOptions, RunOutcome};

pub const MAC: &str = "00:11:22:33:44:55";
pub const NORMALIZED_MAC: &str = "001122334455";

/// Bytes/s of an active sample.
pub const BUSY: f64 = 5000.0;

/// Monday 2023-01-02 12:00 local (+01:00): 48 quarter hours since midnight,
/// so the daily window of a 96-sample series starts at index 48.
pub fn fixed_clock() -> Arc<FixedClock> {
    let at = DateTime::parse_from_rfc3339("2023-01-02T12:00:00+01:00").unwrap();
    Arc::new(FixedClock::new(at))
}

pub fn landevice(uid: &str, name: &str, mac: &str, user_uids: &str, blocked: bool) -> Landevice {
    Landevice {
        uid: uid.to_string(),
        friendly_name: name.to_string(),
        mac: mac.to_string(),
        active: "1".to_string(),
        user_uids: user_uids.to_string(),
        blocked: if blocked { "1" } else { "0" }.to_string(),
    }
}

/// 96 quarter-hour samples, busy at the given indices.
pub fn day_series(active: &[usize]) -> Vec<f64> {
    let mut series = vec![0.0; 96];
    for &idx in active {
        series[idx] = BUSY;
    }
    series
}

/// Receive/send series for one device; only the receive side is busy.
pub fn day_data(normalized_mac: &str, active: &[usize]) -> Vec<SubsetData> {
    vec![
        SubsetData::new(format!("rcv_{normalized_mac}"), day_series(active)),
        SubsetData::new(format!("snd_{normalized_mac}"), day_series(&[])),
    ]
}

/// Day run for [`MAC`] with policy `MO-SU20` and enforcement on.
pub fn enforcing_options() -> MonitorOptions {
    MonitorOptions {
        username: "admin".to_string(),
        password: "secret".to_string(),
        mac: Some(MAC.to_string()),
        period: "day".to_string(),
        activity_threshold: 0.0,
        policy: Some("MO-SU20".to_string()),
        enforce: true,
    }
}

/// Run the monitor once against `fake`, returning the outcome and report.
pub async fn run_once(fake: &Arc<FakeRouterClient>, options: MonitorOptions) -> (RunOutcome, String) {
    let monitor = Monitor::new(fake.clone(), fixed_clock(), options);
    let mut out = Vec::new();
    let outcome = monitor.run(&mut out).await;
    (outcome, String::from_utf8(out).unwrap())
}
