//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::{Config, SessionBackend};
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database, MemorySessionStore, RedisSessionStore, SessionStore};

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    let db = Arc::new(Database::connect(&config).await?);
    tracing::info!("Database connected");

    let session_store = session_store(&config).await?;

    let app_state = AppState::from_config(db, session_store, &config);
    let app = create_router(app_state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

async fn session_store(config: &Config) -> AppResult<Arc<dyn SessionStore>> {
    match config.session_backend {
        SessionBackend::Redis => {
            let cache = Cache::connect(config).await?;
            tracing::info!("Redis session store connected");
            Ok(Arc::new(RedisSessionStore::new(
                cache,
                config.session_ttl_seconds,
            )))
        }
        SessionBackend::Memory => {
            tracing::warn!("Using in-memory sessions; they are lost on restart");
            Ok(Arc::new(MemorySessionStore::new(config.session_ttl_seconds)))
        }
    }
}
