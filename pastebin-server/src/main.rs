use axum::ServiceExt;
use axum::extract::Request;
use pastebin::{ExpirySweeper, PasteService, PasteStore, StorageFactory};
use shared::config::Config;
use storage_engine::UnifiedStorageFactory;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting pastebin server");

    // Load environment variables
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env()?;
    info!("Configuration loaded: backend={:?}", config.backend);

    // ============================================
    // STEP 1: Open the storage backend
    // ============================================
    let store = PasteStore::new(UnifiedStorageFactory.create_from_config(&config)?);
    if let Err(e) = store.ping().await {
        error!("Storage backend is unreachable: {}", e);
        return Err(e.into());
    }
    let paste_service = PasteService::new(store.clone());

    // ============================================
    // STEP 2: Start the expiry sweeper
    // ============================================
    let shutdown = CancellationToken::new();
    let sweeper = match config.sweep_interval {
        Some(interval) => Some(ExpirySweeper::new(store.clone(), interval).spawn(shutdown.clone())),
        None => {
            info!("Expiry sweeper disabled");
            None
        }
    };

    // ============================================
    // STEP 3: Serve HTTP until a shutdown signal
    // ============================================
    let state = server_http::AppState::new(paste_service, &config);
    let app = server_http::build_app(server_http::build_router(state, &config));

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("HTTP Server listening on http://{}", listener.local_addr()?);

    let served = axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = &served {
        error!("HTTP server error: {}", e);
    }

    // ============================================
    // STEP 4: Stop background work and release the backend
    // ============================================
    shutdown.cancel();
    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            error!("Expiry sweeper task failed: {}", e);
        }
    }

    if let Err(e) = store.close().await {
        error!("Failed to close storage backend: {}", e);
    }

    info!("Pastebin server stopped");
    served.map_err(Into::into)
}

// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
