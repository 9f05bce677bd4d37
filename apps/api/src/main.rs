mod config;
mod conversation;
mod errors;
mod llm_client;
mod posting;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::conversation::state::SessionStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

/// How often idle sessions are swept.
const PRUNE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Posting Assistant v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.llm_timeout)?;
    info!(
        "LLM client initialized (model: {}, timeout: {:?})",
        llm_client::MODEL,
        config.llm_timeout
    );

    let sessions = SessionStore::new();
    spawn_session_pruner(sessions.clone(), config.session_idle);

    // Build app state
    let state = AppState {
        llm: Arc::new(llm),
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Evicts sessions idle for longer than `max_idle`, every `PRUNE_INTERVAL`.
fn spawn_session_pruner(sessions: SessionStore, max_idle: Duration) {
    let max_idle = match chrono::Duration::from_std(max_idle) {
        Ok(d) => d,
        Err(e) => {
            warn!("Session idle timeout out of range ({e}); idle sessions will not be pruned");
            return;
        }
    };

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            ticker.tick().await;
            let evicted = sessions.prune_idle(max_idle).await;
            if evicted > 0 {
                info!("Pruned {evicted} idle sessions ({} active)", sessions.len().await);
            }
        }
    });
}
