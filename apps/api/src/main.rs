mod auth;
mod calculation;
mod config;
mod document;
mod errors;
mod generation;
mod history;
mod models;
mod quality;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::history::{HistoryStore, MemoryHistoryStore, RedisHistoryStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PayDoc API v{}", env!("CARGO_PKG_VERSION"));

    let history: Arc<dyn HistoryStore> = match &config.redis_url {
        Some(url) => {
            let store = RedisHistoryStore::connect(url, config.history_namespace.clone()).await?;
            Arc::new(store)
        }
        None => {
            warn!("REDIS_URL not set; document history is kept in memory");
            Arc::new(MemoryHistoryStore::new())
        }
    };

    if config.generation_delay_ms > 0 {
        info!("Simulated generation delay: {}ms", config.generation_delay_ms);
    }

    let state = AppState::new(config.clone(), history);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
