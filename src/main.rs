use bootcamp_api::config::{AppConfig, StoreBackend};
use bootcamp_api::{build_configured_app, serve};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={} environment={}",
        config.server_address(),
        config.server.environment
    );

    if config.database.backend == StoreBackend::Memory {
        log::warn!("Using the in-memory store; data is lost on shutdown");
    }

    let load_seed = std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true";
    let app = build_configured_app(&config, load_seed).await?;

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!(
        "Server running in {} mode on http://{}",
        config.server.environment,
        bind_address
    );

    serve(listener, app).await?;
    log::info!("Server stopped");

    Ok(())
}
