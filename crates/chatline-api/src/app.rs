//! Application builder: wires router, middleware, and state into an Axum app.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use chatline_auth::JwtDecoder;
use chatline_core::config::{AppConfig, CorsConfig, DatabaseProvider};
use chatline_core::error::AppError;
use chatline_core::traits::{ChatStore, UserStore};
use chatline_database::{DatabaseChatStore, DatabasePool, MemoryStore};
use chatline_realtime::RealtimeEngine;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState, cors_config: &CorsConfig) -> Router {
    build_router(state)
        .layer(build_cors_layer(cors_config))
        .layer(TraceLayer::new_for_http())
}

/// Connect the configured store backend and construct the engine over it.
pub async fn build_state(config: AppConfig) -> Result<AppState, AppError> {
    let (store, users, database): (Arc<dyn ChatStore>, Arc<dyn UserStore>, Option<DatabasePool>) =
        match config.database.provider {
            DatabaseProvider::Postgres => {
                let db = DatabasePool::open(&config.database).await?;
                let store = Arc::new(DatabaseChatStore::new(&db, config.server.media_url.clone()));
                (store.clone(), store, Some(db))
            }
            DatabaseProvider::Memory => {
                warn!("Using the in-memory store; nothing survives a restart");
                let store = Arc::new(MemoryStore::new(config.server.media_url.clone()));
                (store.clone(), store, None)
            }
        };

    let tokens = Arc::new(JwtDecoder::new(&config.auth));
    let realtime = Arc::new(RealtimeEngine::new(
        config.realtime.clone(),
        store,
        users,
        tokens,
    ));

    Ok(AppState {
        config: Arc::new(config),
        realtime,
        database,
    })
}

/// Runs the Chatline server until ctrl-c.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting Chatline server");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let cors = config.server.cors.clone();
    let grace_seconds = config.server.shutdown_grace_seconds;
    let state = build_state(config).await?;
    let realtime = state.realtime.clone();
    let database = state.database.clone();

    let app = build_app(state, &cors);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(addr = %addr, "Chatline server listening");

    let grace = Duration::from_secs(grace_seconds);
    let (signalled_tx, signalled_rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            realtime.shutdown();
            let _ = signalled_tx.send(true);
        })
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = grace_elapsed(signalled_rx, grace) => {
            warn!(grace_seconds, "Connections still open after the grace period; stopping anyway");
        }
    }

    if let Some(db) = database {
        db.close().await;
    }
    info!("Chatline server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl-c; shutting down");
    }
}

/// Resolves `grace` after the shutdown signal fires.
async fn grace_elapsed(mut signalled: watch::Receiver<bool>, grace: Duration) {
    if signalled.wait_for(|s| *s).await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}
