//! Daily policy evaluation and block/unblock enforcement.

mod common;

use std::sync::Arc;

use common::*;
use homegate_fritzbox::fake::{Operation, FakeRouterClient};
use homegate_monitor::RunState;

fn router(device_blocked: bool, active: &[usize]) -> Arc<FakeRouterClient> {
    Arc::new(
        FakeRouterClient::new()
            .with_landevices(vec![landevice("landevice1", "Tablet", MAC, "user1", device_blocked)])
            .with_monitor_data(day_data(NORMALIZED_MAC, active)),
    )
}

// ---------------------------------------------------------------------------
// Exceeded policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exceeded_policy_blocks_device_once() {
    let fake = router(false, &[94, 95]);

    let (outcome, report) = run_once(&fake, enforcing_options()).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.state, RunState::Completed);
    assert_eq!(fake.block_calls(), vec![("user1".to_string(), true)]);

    let device = &outcome.summary.devices[0];
    assert_eq!(device.mac, NORMALIZED_MAC);
    assert_eq!(device.daily_active_minutes, 30);
    assert_eq!(device.active, vec!["11:30+01:00/PT30M".to_string()]);

    let timeline = format!("|{}**", ".".repeat(45));
    let expected = format!(
        "Connecting to Fritz!Box\n\
         Connected\n\
         Fetching landevices\n\
         Fetched 1 devices\n\
         {MAC} activity in last 12 hours:\n\
         Active: 30 minutes (2/48 intervals)\n\
         Daily total: 30 minutes (2/96 intervals)\n\
         Exceeded policy\n\
         Blocking using UID: user1\n\
         Device blocked\n\
         Timeline: {timeline}\n\
         \n"
    );
    assert_eq!(report, expected);
}

#[tokio::test]
async fn exceeded_policy_reasserts_block_on_blocked_device() {
    let fake = router(true, &[94, 95]);

    run_once(&fake, enforcing_options()).await;

    assert_eq!(fake.block_calls(), vec![("user1".to_string(), true)]);
}

#[tokio::test]
async fn activity_before_midnight_does_not_count() {
    // Busy all evening yesterday, idle today: 0 < 20 keeps it within.
    let fake = router(false, &[40, 41, 42, 43, 44, 45, 46, 47]);

    let (outcome, report) = run_once(&fake, enforcing_options()).await;

    assert_eq!(outcome.summary.devices[0].daily_active_minutes, 0);
    assert!(outcome.summary.devices[0].active.is_empty());
    assert!(report.contains("Within policy"));
    assert!(fake.block_calls().is_empty());
}

#[tokio::test]
async fn block_falls_back_to_device_uid() {
    let fake = Arc::new(
        FakeRouterClient::new()
            .with_landevices(vec![landevice("landevice1", "Tablet", MAC, "", false)])
            .with_monitor_data(day_data(NORMALIZED_MAC, &[94, 95])),
    );

    let (_, report) = run_once(&fake, enforcing_options()).await;

    assert!(report.contains("Blocking using UID: landevice1"));
    assert_eq!(fake.block_calls(), vec![("landevice1".to_string(), true)]);
}

#[tokio::test]
async fn block_failure_is_recorded_and_run_completes() {
    let fake = Arc::new(
        FakeRouterClient::new()
            .with_landevices(vec![landevice("landevice1", "Tablet", MAC, "user1", false)])
            .with_monitor_data(day_data(NORMALIZED_MAC, &[94, 95]))
            .failing(Operation::BlockDevice, "boom"),
    );

    let (outcome, report) = run_once(&fake, enforcing_options()).await;

    assert!(outcome.is_success());
    assert_eq!(
        outcome.summary.errors,
        vec!["failed to block device: Router API error (500): boom".to_string()]
    );
    assert!(report.contains("Failed to block device: Router API error (500): boom"));
    assert_eq!(outcome.summary.devices.len(), 1);
}

// ---------------------------------------------------------------------------
// Within policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn within_policy_unblocks_blocked_device() {
    let fake = router(true, &[95]);

    let (outcome, report) = run_once(&fake, enforcing_options()).await;

    assert_eq!(outcome.summary.devices[0].daily_active_minutes, 15);
    assert_eq!(fake.block_calls(), vec![("user1".to_string(), false)]);
    assert!(report.contains("Within policy\nDevice unblocked\n"));
}

#[tokio::test]
async fn within_policy_leaves_unblocked_device_alone() {
    let fake = router(false, &[95]);

    let (outcome, _) = run_once(&fake, enforcing_options()).await;

    assert!(outcome.summary.errors.is_empty());
    assert!(fake.block_calls().is_empty());
}

#[tokio::test]
async fn unblock_has_no_device_uid_fallback() {
    let fake = Arc::new(
        FakeRouterClient::new()
            .with_landevices(vec![landevice("landevice1", "Tablet", MAC, "", true)])
            .with_monitor_data(day_data(NORMALIZED_MAC, &[95])),
    );

    let (outcome, report) = run_once(&fake, enforcing_options()).await;

    assert!(outcome.is_success());
    assert!(fake.block_calls().is_empty());
    assert_eq!(
        outcome.summary.errors,
        vec!["cannot unblock, no user UID for device".to_string()]
    );
    assert!(report.contains("No user UID found for device, cannot unblock"));
}

// ---------------------------------------------------------------------------
// Policy and enforcement switches
// ---------------------------------------------------------------------------

#[tokio::test]
async fn enforcement_off_only_reports() {
    let fake = router(false, &[94, 95]);
    let mut options = enforcing_options();
    options.enforce = false;

    let (_, report) = run_once(&fake, options).await;

    assert!(report.contains("Exceeded policy\nTimeline:"));
    assert!(fake.block_calls().is_empty());
}

#[tokio::test]
async fn no_policy_skips_evaluation() {
    let fake = router(true, &[94, 95]);
    let mut options = enforcing_options();
    options.policy = None;

    let (outcome, report) = run_once(&fake, options).await;

    assert_eq!(outcome.state, RunState::Completed);
    assert!(!report.contains("policy"));
    assert!(fake.block_calls().is_empty());
    assert_eq!(outcome.summary.devices[0].daily_active_minutes, 30);
}

#[tokio::test]
async fn allowance_follows_the_weekday() {
    // Monday allows 45 minutes; Tuesday-Sunday only 15.
    let fake = router(false, &[94, 95]);
    let mut options = enforcing_options();
    options.policy = Some("MO45TU-SU15".to_string());

    let (_, report) = run_once(&fake, options).await;

    assert!(report.contains("Within policy"));
    assert!(fake.block_calls().is_empty());
}

#[tokio::test]
async fn allowance_reached_exactly_counts_as_exceeded() {
    // Two active half-hours are 30 minutes, the full allowance.
    let fake = router(false, &[94, 95]);
    let mut options = enforcing_options();
    options.policy = Some("MO-SU30".to_string());

    let (_, report) = run_once(&fake, options).await;

    assert!(report.contains("Exceeded policy"));
    assert_eq!(fake.block_calls(), vec![("user1".to_string(), true)]);
}

#[tokio::test]
async fn repeated_runs_are_identical_and_reassert_the_block() {
    let fake = router(false, &[94, 95]);

    let (first, first_report) = run_once(&fake, enforcing_options()).await;
    let (second, second_report) = run_once(&fake, enforcing_options()).await;

    assert_eq!(first_report, second_report);
    assert_eq!(first.summary.without_timing(), second.summary.without_timing());
    assert_eq!(
        fake.block_calls(),
        vec![("user1".to_string(), true), ("user1".to_string(), true)]
    );
}
