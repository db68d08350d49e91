//! Storefront HTTP server.

use storefront_engine::EngineConfig;
use storefront_postgres::PgStore;
use storefront_web::{AppState, Config, build_router};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        allow_bulk_line_removal = config.allow_bulk_line_removal,
        "Configuration loaded"
    );

    info!("Connecting to database...");
    let store = PgStore::connect(&config.database_url).await?;
    store.migrate().await?;
    info!("Database ready");

    let engine_config = EngineConfig::new().with_bulk_line_removal(config.allow_bulk_line_removal);
    let state = AppState::new(store, engine_config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
    }
}
