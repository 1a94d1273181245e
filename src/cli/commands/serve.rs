use anyhow::Context;

use crate::api;
use crate::config::{self, StorageBackend};
use crate::database::{self, DatabaseManager, RecordStore};
use crate::state::AppState;

pub async fn handle(port: Option<u16>, migrate: bool) -> anyhow::Result<()> {
    let config = config::config();
    tracing::info!("Starting LMS API in {:?} mode", config.environment);

    if migrate && config.database.backend == StorageBackend::Postgres {
        let pool = DatabaseManager::connect(&config.database).await?;
        DatabaseManager::migrate(&pool).await?;
    }

    let store = database::open_store(&config.database)
        .await
        .context("failed to open record store")?;
    tracing::info!("Using {} store", store.backend_name());

    let app = api::app(AppState::new(store, config.listing.clone()), config);

    let port = port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("LMS API listening on http://{}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
