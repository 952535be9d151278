pub mod api;
pub mod config;
pub mod geocode;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use logic::{AdvancedResults, AllowList, PaginationDefaults};

// Export all model types
pub use model::*;

pub use seed::load_seed_data;

// Export store types
pub use store::{DocumentStore, MemoryStore, PostgresStore};

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::api::AppState;
use crate::config::{AppConfig, StoreBackend};

/// Connect the configured store, seed it when asked, and build the app.
pub async fn build_configured_app(config: &AppConfig, load_seed: bool) -> anyhow::Result<Router> {
    match config.database.backend {
        StoreBackend::Postgres => {
            let database_url = config.database_url()?;
            let store = PostgresStore::new(&database_url, config.database.max_connections.unwrap_or(20)).await?;
            store.migrate().await?;
            app_with_store(Arc::new(store), config, load_seed).await
        }
        StoreBackend::Memory => app_with_store(Arc::new(MemoryStore::new()), config, load_seed).await,
    }
}

pub async fn app_with_store<S: DocumentStore + 'static>(
    store: Arc<S>,
    config: &AppConfig,
    load_seed: bool,
) -> anyhow::Result<Router> {
    if load_seed {
        log::info!("Loading seed data...");
        load_seed_data(store.as_ref()).await?;
    }

    let geocoder = geocode::from_config(&config.geocoder, seed::data::places())?;
    let state = AppState::new(store, config.query).with_geocoder(geocoder);
    routes::build_app(state, &config.server, config.is_development())
}

/// Serve until Ctrl+C or SIGTERM.
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

// Function for integration testing
pub async fn run_server() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = AppConfig::load()?;
    let app = build_configured_app(&config, false).await?;

    let listener = TcpListener::bind(&config.server_address()).await?;
    serve(listener, app).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install signal handler: {}", e);
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
