//! Health and save point status endpoints.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::Result;
use crate::handlers::{handle_status, StatusResponse};
use crate::{blocking, AppState};

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Create health routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status_handler))
        .route("/", get(root))
}

/// Health check handler.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /status - Resolved save point and whether it accepts writes.
async fn status_handler(State(state): State<AppState>) -> Result<Json<StatusResponse>> {
    let status = blocking(&state, |engine| Ok(handle_status(engine))).await?;
    Ok(Json(status))
}

/// Root handler.
async fn root() -> &'static str {
    "Formsync Server"
}
