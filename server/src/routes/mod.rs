//! HTTP route definitions.

mod forms;
mod health;
mod live;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(forms::routes())
        .merge(live::routes())
}
