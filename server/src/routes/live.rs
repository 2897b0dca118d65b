//! Live form service routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use formsync_engine::{FormDefinition, FormId};

use crate::error::Result;
use crate::handlers::{
    handle_create_live, handle_edit_live, handle_list_live, handle_live_status, handle_save,
    handle_update_live, FormStatusResponse,
};
use crate::notice::Notice;
use crate::{blocking, AppState};

/// Create live form routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/live/forms", get(list_handler).post(create_handler))
        .route("/live/forms/{id}", get(edit_handler).put(update_handler))
        .route("/live/forms/{id}/export", post(export_handler))
        .route("/live/forms/{id}/status", get(status_handler))
}

/// GET /live/forms
async fn list_handler(State(state): State<AppState>) -> Result<Json<Vec<FormDefinition>>> {
    let forms = blocking(&state, handle_list_live).await?;
    Ok(Json(forms))
}

/// POST /live/forms
async fn create_handler(
    State(state): State<AppState>,
    Json(form): Json<FormDefinition>,
) -> Result<(StatusCode, Json<Notice>)> {
    let notice = blocking(&state, move |engine| handle_create_live(engine, form)).await?;
    Ok((StatusCode::CREATED, Json(notice)))
}

/// GET /live/forms/{id} - The form as rendered for editing.
async fn edit_handler(
    State(state): State<AppState>,
    Path(id): Path<FormId>,
) -> Result<Json<FormDefinition>> {
    let form = blocking(&state, move |engine| handle_edit_live(engine, id)).await?;
    Ok(Json(form))
}

/// PUT /live/forms/{id} - Save the form, which also exports it.
async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<FormId>,
    Json(form): Json<FormDefinition>,
) -> Result<Json<Notice>> {
    let notice = blocking(&state, move |engine| handle_update_live(engine, id, form)).await?;
    Ok(Json(notice))
}

/// POST /live/forms/{id}/export - Fire the save event without changing the form.
async fn export_handler(
    State(state): State<AppState>,
    Path(id): Path<FormId>,
) -> Result<Json<Notice>> {
    let notice = blocking(&state, move |engine| handle_save(engine, id)).await?;
    Ok(Json(notice))
}

/// GET /live/forms/{id}/status
async fn status_handler(
    State(state): State<AppState>,
    Path(id): Path<FormId>,
) -> Result<Json<FormStatusResponse>> {
    let status = blocking(&state, move |engine| handle_live_status(engine, id)).await?;
    Ok(Json(status))
}
