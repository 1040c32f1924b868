use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use safar_api::{app, AppState};
use safar_store::app_config::{Config, StorageBackend};
use safar_store::{DbClient, DocumentStore, MemoryStore, PgBookingRepository, PgTripRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "safar_api=debug,safar_store=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Safar API on port {}", config.server.port);

    let documents = DocumentStore::new(&config.uploads.dir);

    let app_state = match config.database.backend {
        StorageBackend::Postgres => {
            let db = DbClient::new(&config.database)
                .await
                .context("Failed to connect to Postgres")?;
            db.ensure_schema().await.context("Failed to create schema")?;

            AppState::new(
                Arc::new(PgTripRepository::new(db.pool.clone())),
                Arc::new(PgBookingRepository::new(db.pool.clone())),
                documents,
                config.auth.clone(),
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            AppState::in_memory(Arc::new(MemoryStore::new()), documents, config.auth.clone())
        }
    };

    let app = app(app_state, &config.server, &config.uploads);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
