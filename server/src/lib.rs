//! Formsync Server - host service for formsync.
//!
//! Composes one [`SyncEngine`] over an in-memory live form store and serves
//! the admin actions (listing, import, update, save, status) over HTTP. The
//! live store is reachable through its own CRUD routes so the save event and
//! the edit render can be driven end to end.

pub mod config;
pub mod error;
pub mod handlers;
pub mod notice;
pub mod routes;

use crate::config::Config;
use crate::error::{AppError, Result};
use axum::Router;
use formsync_engine::{Hooks, MemoryFormStore, PermissionGate, SyncEngine};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// The engine as this host composes it.
pub type Engine = SyncEngine<MemoryFormStore>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub config: Arc<Config>,
}

/// Build the engine and state from configuration.
pub fn bootstrap(config: Config) -> AppState {
    let engine = SyncEngine::new(
        MemoryFormStore::new(),
        config.sync_config(),
        PermissionGate::default(),
        Hooks::new().on_after_save(|event| {
            if let Err(err) = event.result {
                tracing::warn!(form_id = event.form_id, error = %err, "JSON file not saved");
            }
        }),
    );

    let status = engine.save_point_status();
    match &status.verdict {
        Ok(()) => tracing::info!(path = %status.path.display(), "save point ready"),
        Err(err) => tracing::warn!(path = %status.path.display(), error = %err, "save point not writable"),
    }

    AppState {
        engine: Arc::new(engine),
        config: Arc::new(config),
    }
}

/// Router with tracing and CORS layers applied.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run a synchronous engine call off the async runtime.
pub async fn blocking<T, F>(state: &AppState, f: F) -> Result<T>
where
    F: FnOnce(&Engine) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let engine = state.engine.clone();
    tokio::task::spawn_blocking(move || f(&engine))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
}
