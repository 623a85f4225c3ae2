use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kairos_api::{
    config::{Config, SessionBackend},
    db::{create_redis_client, Cache},
    routes::{create_router, AppState},
    services::{
        events::{self, EventBus},
        providers::{MovieProvider, TmdbProvider},
        session::{InMemorySessionStore, RedisSessionStore, SessionStore},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kairos_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let redis_client = create_redis_client(&config.redis_url)
        .with_context(|| format!("Invalid REDIS_URL {}", config.redis_url))?;
    let (cache, cache_handle) = Cache::new(redis_client.clone()).await;

    let tmdb = TmdbProvider::new(cache, config.tmdb_api_key.clone(), config.tmdb_api_url.clone());
    if !tmdb.has_api_key() {
        tracing::warn!("TMDB_API_KEY is not set; remote discovery and details are disabled");
    }
    let provider: Arc<dyn MovieProvider> = Arc::new(tmdb);

    let sessions: Arc<dyn SessionStore> = match config.session_backend {
        SessionBackend::Redis => Arc::new(RedisSessionStore::new(
            redis_client,
            config.session_ttl_secs,
        )),
        SessionBackend::Memory => Arc::new(InMemorySessionStore::new()),
    };
    tracing::info!(backend = sessions.name(), "Session store ready");

    let events = EventBus::default();
    let listener_task = tokio::spawn(events::log_events(events.subscribe()));

    let state = AppState::new(provider, sessions, events, config.history_limit)?;
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, flushing cache writes");
    cache_handle.shutdown().await;
    listener_task.abort();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
