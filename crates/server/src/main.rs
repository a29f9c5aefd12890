use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taxonomy_core::{
    load_config, validate_config, ClientGateway, QBittorrentSource, SourceBackend,
    TaxonomyService, TorrentSource,
};
use taxonomy_server::api::{create_router, WsBroadcaster};
use taxonomy_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("TAXONOMY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");

    // Create WebSocket broadcaster and register it before any cycle runs
    let ws_broadcaster = WsBroadcaster::new(config.gateway.broadcast_capacity);
    let mut taxonomy = TaxonomyService::new();
    taxonomy.on_taxonomy_change(ws_broadcaster.change_handler());
    let taxonomy = Arc::new(RwLock::new(taxonomy));
    info!(
        "WebSocket broadcaster initialized (capacity {})",
        config.gateway.broadcast_capacity
    );

    // Create torrent source if configured
    let source: Option<Arc<dyn TorrentSource>> = match &config.source {
        Some(source_config) => match source_config.backend {
            SourceBackend::QBittorrent => {
                if let Some(qbit_config) = &source_config.qbittorrent {
                    info!("Initializing qBittorrent source at {}", qbit_config.url);
                    Some(Arc::new(
                        QBittorrentSource::new(qbit_config.clone())
                            .context("Failed to create qBittorrent source")?,
                    ))
                } else {
                    error!("qBittorrent backend selected but no qbittorrent config provided");
                    None
                }
            }
        },
        None => {
            info!("No torrent source configured");
            None
        }
    };

    // Create client gateway and start polling
    let gateway = source.map(|source| {
        let gateway = ClientGateway::new(source, Arc::clone(&taxonomy), &config.gateway);
        gateway.start();
        gateway
    });

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        taxonomy,
        gateway.clone(),
        ws_broadcaster,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    if let Some(ref gateway) = gateway {
        gateway.stop();
        info!("Client gateway stopped");
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
