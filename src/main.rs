use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use genba_api::auth::JwtSessionStore;
use genba_api::client::{PostalLookup, ZipcloudApi};
use genba_api::config::{AppConfig, StoreBackend};
use genba_api::database::{MemoryStore, PgStore, Store};
use genba_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting Genba API in {:?} mode", config.environment);

    if config.security.session_secret.is_empty() {
        tracing::warn!("SESSION_SECRET is not set; every protected request will be rejected");
    }

    let mut pg: Option<Arc<PgStore>> = None;
    let store: Arc<dyn Store> = match config.database.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Postgres => {
            let store = PgStore::connect(&config.database)
                .await
                .context("failed to connect to database")?;
            store.migrate().await.context("failed to run migrations")?;
            let store = Arc::new(store);
            pg = Some(store.clone());
            store
        }
    };

    let sessions = Arc::new(JwtSessionStore::new(
        config.security.session_secret.clone(),
        config.security.session_expiry_hours,
    ));
    let postal = PostalLookup::new(ZipcloudApi::new(&config.postal)?);

    let port = config.server.port;
    let state = AppState::new(store, sessions, postal, config);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Genba API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(pg) = pg {
        pg.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
