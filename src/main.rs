mod batch;
mod config;
mod defaults;
mod device;
mod error;
mod grid;
mod handlers;
mod inventory;
mod models;
mod router;
mod routing;
mod store;
mod utils;

use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use store::Store;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub store: Store,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ipmedia_control=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let cfg = Config::load();
    tracing::info!("Starting IP media control server");
    tracing::info!("Panel config: {}", cfg.panel_config);
    tracing::info!("Default params: {}", cfg.default_params);
    tracing::info!("XIP3901 reference: {}", cfg.xip_reference);
    tracing::info!("Listen: {}", cfg.listen_addr);

    let store = Store::from_config(&cfg);
    if let Err(e) = store.load_config() {
        tracing::warn!("Panel config not readable yet: {}", e);
    }

    let listen_addr = cfg.listen_addr.clone();
    let state = Arc::new(AppState { config: cfg, store });
    let app = router::build(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!("Server listening on {}", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
