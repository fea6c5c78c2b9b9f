//! Periodic monitor runs feeding the status store.
//!
//! Runs the monitor, publishes the summary, then waits `interval` before
//! the next run. Cancellation is honoured before a run starts and while
//! waiting; a run in progress always finishes.

use std::sync::Arc;
use std::time::Duration;

use homegate_core::state::StatusStore;
use homegate_monitor::{Monitor, RunOutcome};
use tokio_util::sync::CancellationToken;

/// Run the monitor loop until `cancel` is triggered.
pub async fn run(
    monitor: Monitor,
    store: Arc<StatusStore>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        period = %monitor.options().period,
        enforce = monitor.options().enforce,
        "Monitor loop started"
    );

    loop {
        if cancel.is_cancelled() {
            break;
        }

        tracing::info!("Starting monitor run");
        let mut sink = std::io::sink();
        let outcome = monitor.run(&mut sink).await;
        log_outcome(&outcome);
        store.update(outcome.summary).await;

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::info!("Monitor loop stopping");
}

fn log_outcome(outcome: &RunOutcome) {
    let summary = &outcome.summary;
    if summary.errors.is_empty() {
        tracing::info!(
            devices_checked = summary.devices_checked,
            users_fetched = summary.users_fetched,
            duration_ms = summary.duration.as_millis() as u64,
            "Finished run"
        );
        return;
    }

    tracing::warn!(
        devices_checked = summary.devices_checked,
        users_fetched = summary.users_fetched,
        duration_ms = summary.duration.as_millis() as u64,
        failed = !outcome.is_success(),
        "Finished run with errors"
    );
    for error in &summary.errors {
        tracing::warn!(error = %error, "Run error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use homegate_core::clock::FixedClock;
    use homegate_core::summary::Summary;
    use homegate_fritzbox::fake::{FakeRouterClient, Operation};
    use homegate_fritzbox::types::{Landevice, SubsetData};
    use homegate_monitor::MonitorOptions;

    fn monitor(fake: Arc<FakeRouterClient>) -> Monitor {
        let at = DateTime::parse_from_rfc3339("2023-01-02T12:00:00+01:00").unwrap();
        let options = MonitorOptions {
            username: "admin".into(),
            password: "secret".into(),
            mac: Some("00:11:22:33:44:55".into()),
            ..MonitorOptions::default()
        };
        Monitor::new(fake, Arc::new(FixedClock::new(at)), options)
    }

    fn router() -> Arc<FakeRouterClient> {
        Arc::new(
            FakeRouterClient::new()
                .with_landevices(vec![Landevice {
                    uid: "landevice1".into(),
                    mac: "00:11:22:33:44:55".into(),
                    ..Default::default()
                }])
                .with_monitor_data(vec![
                    SubsetData::new("rcv_001122334455", vec![0.0; 96]),
                    SubsetData::new("snd_001122334455", vec![0.0; 96]),
                ]),
        )
    }

    async fn wait_for_devices(store: &StatusStore) {
        for _ in 0..200 {
            if store.get().await.devices_checked > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("monitor loop never published a summary");
    }

    #[tokio::test]
    async fn publishes_each_run_and_stops_on_cancel() {
        let fake = router();
        let store = Arc::new(StatusStore::new());
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run(
            monitor(fake.clone()),
            Arc::clone(&store),
            Duration::from_secs(3600),
            cancel.clone(),
        ));

        wait_for_devices(&store).await;
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("loop should stop while waiting")
            .unwrap();

        let summary = store.get().await;
        assert_eq!(summary.devices_checked, 1);
        assert_eq!(summary.devices.len(), 1);
        assert!(summary.errors.is_empty());
    }

    #[tokio::test]
    async fn failed_run_is_still_published() {
        let fake = Arc::new(FakeRouterClient::new().failing(Operation::Connect, "offline"));
        let store = Arc::new(StatusStore::new());
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run(
            monitor(fake),
            Arc::clone(&store),
            Duration::from_secs(3600),
            cancel.clone(),
        ));

        for _ in 0..200 {
            if !store.get().await.errors.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(
            store.get().await.errors,
            vec!["failed to connect: Router API error (500): offline".to_string()]
        );
    }

    #[tokio::test]
    async fn cancelled_loop_never_runs() {
        let fake = router();
        let store = Arc::new(StatusStore::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        run(monitor(fake.clone()), Arc::clone(&store), Duration::from_secs(1), cancel).await;

        assert!(fake.calls().is_empty());
        assert_eq!(store.get().await, Summary::default());
    }
}
