//! `homegate` -- one-shot usage check.
//!
//! Loads settings from the environment (see [`Settings::from_env`]), runs
//! the monitor once with the report on stdout and exits non-zero when the
//! run failed.

use std::sync::Arc;

use homegate_core::clock::SystemClock;
use homegate_fritzbox::FritzboxClient;
use homegate_monitor::{Monitor, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homegate_monitor=warn,homegate_fritzbox=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(2);
    });

    let client = FritzboxClient::new(settings.router_config()).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build router client");
        std::process::exit(1);
    });

    let monitor = Monitor::new(Arc::new(client), Arc::new(SystemClock), settings.options);
    let outcome = monitor.run(&mut std::io::stdout()).await;

    if let Some(err) = outcome.error {
        eprintln!("Monitoring error: {err}");
        std::process::exit(1);
    }

    let summary = outcome.summary;
    println!(
        "Monitoring done: checked {} devices, fetched {} users, duration {:?}",
        summary.devices_checked, summary.users_fetched, summary.duration
    );
}
