use std::net::SocketAddr;
use std::sync::Arc;

use gather_reminders::{
    NotificationStore, PgNotificationStore, ReminderScheduler, SchedulerConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gather_api::config::ServerConfig;
use gather_api::router::build_app_router;
use gather_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gather_api=debug,gather_reminders=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let scheduler_config = SchedulerConfig::from_env();
    tracing::info!(
        interval_secs = scheduler_config.interval.as_secs(),
        window_hours = scheduler_config.window.num_hours(),
        "Loaded reminder scheduler configuration"
    );

    // --- Database ---
    let pool = gather_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    gather_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    gather_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Reminder scheduler ---
    let store: Arc<dyn NotificationStore> = Arc::new(PgNotificationStore::new(
        pool.clone(),
        scheduler_config.window,
    ));
    let scheduler = Arc::new(ReminderScheduler::new(Arc::clone(&store), scheduler_config));
    scheduler
        .start()
        .expect("Reminder scheduler must start exactly once");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        store,
        scheduler: Arc::clone(&scheduler),
    };

    let app = build_app_router(state, &config);

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
    tracing::info!("Server stopped accepting connections, cleaning up");

    if let Err(e) = scheduler.stop().await {
        tracing::warn!(error = %e, "Reminder scheduler shutdown was forced");
    }

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
