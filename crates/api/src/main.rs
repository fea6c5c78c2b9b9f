//! `homegate-web` -- status server with a background monitor loop.
//!
//! Runs the monitor every `HOMEGATE_INTERVAL_SECS` and serves the latest
//! summary at `GET /status`. Router and run settings are documented on
//! `homegate_monitor::Settings::from_env`, server settings on
//! `ServerConfig::from_env`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use homegate_api::background::monitor_loop;
use homegate_api::config::ServerConfig;
use homegate_api::router::build_app_router;
use homegate_api::state::AppState;
use homegate_core::clock::SystemClock;
use homegate_core::state::StatusStore;
use homegate_fritzbox::FritzboxClient;
use homegate_monitor::{Monitor, Settings};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "homegate_api=info,homegate_monitor=info,homegate_fritzbox=info,tower_http=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let settings = Settings::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid monitor configuration");
        std::process::exit(2);
    });
    let config = ServerConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid server configuration");
        std::process::exit(2);
    });
    tracing::info!(
        host = %config.host,
        port = config.port,
        router = %settings.router_url,
        interval_secs = settings.interval.as_secs(),
        "Loaded configuration"
    );

    // --- Monitor loop ---
    let client = FritzboxClient::new(settings.router_config()).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build router client");
        std::process::exit(1);
    });
    let monitor = Monitor::new(Arc::new(client), Arc::new(SystemClock), settings.options);
    let store = Arc::new(StatusStore::new());

    let cancel = CancellationToken::new();
    let loop_handle = tokio::spawn(monitor_loop::run(
        monitor,
        Arc::clone(&store),
        settings.interval,
        cancel.clone(),
    ));

    // --- Router ---
    let state = AppState {
        status: store,
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let ip: IpAddr = config.host.parse().unwrap_or_else(|e| {
        tracing::error!(host = %config.host, error = %e, "Invalid HOST address");
        std::process::exit(2);
    });
    let addr = SocketAddr::new(ip, config.port);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap_or_else(|e| {
        tracing::error!(%addr, error = %e, "Failed to bind to address");
        std::process::exit(1);
    });
    tracing::info!(%addr, "Status server listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, stopping monitor loop");
    cancel.cancel();
    if let Err(e) = loop_handle.await {
        tracing::error!(error = %e, "Monitor loop task failed");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
