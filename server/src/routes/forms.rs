//! Sync table routes: listing, import and update.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::handlers::{handle_import, handle_list, handle_update, ListResponse, UpdateQuery};
use crate::notice::Notice;
use crate::{blocking, AppState};

/// Create sync table routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/forms", get(list_handler))
        .route("/forms/{key}/import", post(import_handler))
        .route("/forms/{key}/update", post(update_handler))
}

/// GET /forms - Every key across the save point and the live store.
async fn list_handler(State(state): State<AppState>) -> Result<Json<ListResponse>> {
    let response = blocking(&state, handle_list).await?;
    Ok(Json(response))
}

/// POST /forms/{key}/import - Create a live form from a JSON file.
async fn import_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Notice>> {
    let notice = blocking(&state, move |engine| handle_import(engine, &key)).await?;
    Ok(Json(notice))
}

/// POST /forms/{key}/update?formId=N - Overwrite a live form from its JSON file.
async fn update_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<UpdateQuery>,
) -> Result<Json<Notice>> {
    let notice = blocking(&state, move |engine| {
        handle_update(engine, &key, query.form_id)
    })
    .await?;
    Ok(Json(notice))
}
