use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use briefdesk_api::config::ServerConfig;
use briefdesk_api::router::build_app_router;
use briefdesk_api::state::AppState;
use briefdesk_api::uploads::UploadStore;
use briefdesk_events::{EmailConfig, EmailDelivery, EmailDispatcher, EventBus};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "briefdesk_api=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Document store ---
    let pool = briefdesk_db::open_store(&config.data_path)
        .await
        .expect("Failed to open data file");
    tracing::info!(path = %config.data_path.display(), "Document store opened");

    briefdesk_db::health_check(&pool)
        .await
        .expect("Store health check failed");

    let report = briefdesk_db::run_migrations(&pool)
        .await
        .expect("Failed to migrate data file");
    if report.is_empty() {
        tracing::info!("Data file is up to date");
    } else {
        tracing::info!(?report, "Data file migrated");
    }

    // --- Uploads ---
    let uploads = Arc::new(UploadStore::new(&config.upload_dir));
    uploads
        .ensure_dir()
        .await
        .expect("Failed to create upload directory");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    let delivery = EmailConfig::from_env().map(EmailDelivery::new);
    if delivery.is_none() {
        tracing::info!("SMTP_HOST not set, outgoing email disabled");
    }
    let dispatcher = EmailDispatcher::new(
        delivery,
        config.frontend_url.clone(),
        config.jwt.reset_expiry_mins,
    );
    let dispatcher_handle = tokio::spawn(dispatcher.run(event_bus.subscribe()));
    tracing::info!("Email dispatcher started");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        uploads,
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

    // Dropping the last sender closes the channel and ends the dispatcher.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
