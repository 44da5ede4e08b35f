use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vidsum_core::storage::{KEYFRAMES_DIR, UPLOADS_DIR};
use vidsum_db::{MemoryStore, PgStore, RetryingStore, VideoStore};
use vidsum_pipeline::{UploadStore, VideoManager};
use vidsum_worker::{JobScheduler, WorkerConfig};

use vidsum_api::config::{LogFormat, ServerConfig, StoreKind};
use vidsum_api::router::build_app_router;
use vidsum_api::state::AppState;

const DEFAULT_LOG_FILTER: &str =
    "vidsum_api=debug,vidsum_worker=debug,vidsum_pipeline=debug,vidsum_db=info,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Invalid server configuration: {e}");
        std::process::exit(1);
    });
    let worker_config = WorkerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Invalid worker configuration: {e}");
        std::process::exit(1);
    });

    // --- Tracing ---
    init_tracing(config.log_format);
    tracing::info!(host = %config.host, port = %config.port, store = ?config.store, "Loaded server configuration");

    // --- Store ---
    let store: Arc<dyn VideoStore> = match config.store {
        StoreKind::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL is validated by ServerConfig");
            let pool = vidsum_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            vidsum_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            vidsum_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");

            Arc::new(RetryingStore::new(PgStore::new(pool), config.retry.clone()))
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; state is lost on restart");
            Arc::new(RetryingStore::new(MemoryStore::new(), config.retry.clone()))
        }
    };

    // --- Storage root ---
    for dir in [UPLOADS_DIR, KEYFRAMES_DIR] {
        tokio::fs::create_dir_all(config.data_dir.join(dir))
            .await
            .expect("Failed to create storage directories");
    }

    // --- Lifecycle manager ---
    let uploads = UploadStore::new(&config.data_dir, config.retry.clone());
    let manager = Arc::new(VideoManager::new(Arc::clone(&store), uploads));

    // --- Job scheduler ---
    let scheduler = JobScheduler::from_config(Arc::clone(&store), &worker_config);
    let scheduler_cancel = CancellationToken::new();
    let scheduler_handle = tokio::spawn({
        let cancel = scheduler_cancel.clone();
        async move { scheduler.run(cancel).await }
    });

    // --- App state ---
    let state = AppState {
        store,
        manager,
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config).expect("Invalid CORS configuration");

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
    tracing::info!("Server stopped accepting connections, stopping scheduler");

    // The scheduler finishes any in-flight job before it observes the token.
    scheduler_cancel.cancel();
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(grace, scheduler_handle).await.is_err() {
        tracing::warn!(
            timeout_secs = config.shutdown_timeout_secs,
            "Scheduler did not stop in time; the in-flight job will be recovered on restart",
        );
    }

    tracing::info!("Graceful shutdown complete");
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let (text, json) = match format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();
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
