use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crunch_events::{EventBus, JobQueue};
use crunch_worker::{TaskExecutor, WorkerConfig, WorkerPool};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crunch_api::background;
use crunch_api::config::ServerConfig;
use crunch_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "crunch_api=debug,crunch_worker=debug,crunch_store=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let worker_config = WorkerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        concurrency = worker_config.concurrency,
        item_delay_ms = worker_config.item_delay.as_millis() as u64,
        "Loaded configuration",
    );

    // --- Status store ---
    let store = crunch_store::connect(config.redis_url.as_deref())
        .await
        .expect("Failed to open status store");

    // --- Broker and event bus ---
    let (queue, receiver) = JobQueue::channel(worker_config.queue_capacity);
    let event_bus = Arc::new(EventBus::default());

    // Cancels the background tasks after the worker pool drains.
    let events_cancel = CancellationToken::new();
    let event_log_handle = tokio::spawn(background::event_log::run(
        event_bus.subscribe(),
        events_cancel.clone(),
    ));

    let retention_handle = tokio::spawn(background::status_retention::run(
        Arc::clone(&store),
        background::status_retention::SWEEP_INTERVAL,
        events_cancel.clone(),
    ));

    // --- Worker pool ---
    let executor = Arc::new(TaskExecutor::new(
        Arc::clone(&store),
        Arc::clone(&event_bus),
        &worker_config,
    ));
    let pool = WorkerPool::start(executor, receiver, worker_config.concurrency);

    // --- App state ---
    let state = AppState {
        store,
        queue,
        status_ttl: worker_config.status_ttl,
        config: Arc::new(config.clone()),
    };

    let app = crunch_api::app::build_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, draining workers");

    pool.shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await;

    events_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), event_log_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), retention_handle).await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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
