//! Unified error handling for the server.

use crate::notice::{Action, Notice};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use formsync_engine::{Error as EngineError, FormId, FormKey, StoreError};
use serde::Serialize;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An admin action failed; rendered as a failure notice.
    #[error("{action} failed: {source}")]
    Action {
        action: Action,
        key: Option<FormKey>,
        form_id: Option<FormId>,
        #[source]
        source: EngineError,
    },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn for_key(action: Action, key: impl Into<FormKey>, source: EngineError) -> Self {
        AppError::Action {
            action,
            key: Some(key.into()),
            form_id: None,
            source,
        }
    }

    pub fn for_form(action: Action, form_id: FormId, source: EngineError) -> Self {
        AppError::Action {
            action,
            key: None,
            form_id: Some(form_id),
            source,
        }
    }
}

/// HTTP status for an engine failure.
pub fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Permission(_) => StatusCode::FORBIDDEN,
        EngineError::FileNotFound { .. } | EngineError::FormNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Parse { .. }
        | EngineError::MissingKey { .. }
        | EngineError::Store(StoreError::Rejected(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::InvalidKey(_) | EngineError::MissingFormId => StatusCode::BAD_REQUEST,
        EngineError::AlreadyLive { .. }
        | EngineError::KeyMismatch { .. }
        | EngineError::SyncDisabled(_) => StatusCode::CONFLICT,
        EngineError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        EngineError::Unreadable { .. } | EngineError::WriteFailed { .. } | EngineError::Encode(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match self {
            AppError::Action {
                action,
                key,
                form_id,
                source,
            } => {
                tracing::warn!(%action, ?key, ?form_id, error = %source, "admin action failed");
                let mut notice = Notice::failure(action, source.to_string());
                notice.key = key;
                notice.form_id = form_id;
                return (status_for(&source), Json(notice)).into_response();
            }
            AppError::Engine(e) => {
                tracing::warn!("Engine error: {:?}", e);
                (status_for(&e), e.to_string(), None)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(msg),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use formsync_engine::PermissionError;
    use std::path::PathBuf;

    #[test]
    fn engine_errors_map_to_statuses() {
        let denied = EngineError::Permission(PermissionError::NotWritable(PathBuf::from("/x")));
        assert_eq!(status_for(&denied), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&EngineError::FormNotFound(1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&EngineError::Store(StoreError::Rejected("no".into()))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&EngineError::InvalidKey("../x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&EngineError::AlreadyLive {
                key: "local_gf_a".into(),
                form_id: Some(1),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&EngineError::KeyMismatch {
                key: "local_gf_a".into(),
                form_id: 2,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&EngineError::SyncDisabled("local_gf_a".into())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn action_error_display() {
        let err = AppError::for_key(
            Action::Import,
            "local_gf_a",
            EngineError::FileNotFound {
                key: "local_gf_a".into(),
                path: PathBuf::from("/f/local_gf_a.json"),
            },
        );
        assert_eq!(
            err.to_string(),
            "import failed: no JSON file for key 'local_gf_a' at /f/local_gf_a.json"
        );
    }
}
