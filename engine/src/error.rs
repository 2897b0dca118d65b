//! Error types for the formsync engine.

use crate::{FormId, FormKey};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a save point or file failed a permission check.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error("save point does not exist or is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("save point is not writable: {}", .0.display())]
    NotWritable(PathBuf),

    #[error("file is not readable: {}", .0.display())]
    NotReadable(PathBuf),

    /// Raised by checks a host appends to the gate.
    #[error("{reason}: {}", .path.display())]
    Rejected { path: PathBuf, reason: String },
}

impl PermissionError {
    /// Path the failed check was run against.
    pub fn path(&self) -> &Path {
        match self {
            PermissionError::NotADirectory(path)
            | PermissionError::NotWritable(path)
            | PermissionError::NotReadable(path)
            | PermissionError::Rejected { path, .. } => path,
        }
    }
}

/// Errors reported by a [`FormStore`](crate::FormStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("form not found: {0}")]
    NotFound(FormId),

    /// The store refused the form (validation failure upstream).
    #[error("form rejected: {0}")]
    Rejected(String),

    #[error("form store unavailable: {0}")]
    Unavailable(String),
}

/// All possible errors from the formsync engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("permission denied: {0}")]
    Permission(#[from] PermissionError),

    // Lookup errors
    #[error("no JSON file for key '{key}' at {}", .path.display())]
    FileNotFound { key: FormKey, path: PathBuf },

    #[error("live form not found: {0}")]
    FormNotFound(FormId),

    // File errors
    #[error("could not read {}: {message}", .path.display())]
    Unreadable { path: PathBuf, message: String },

    #[error("malformed form JSON in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("form in {} has sync enabled but no key", .path.display())]
    MissingKey { path: PathBuf },

    #[error("invalid form key: '{0}'")]
    InvalidKey(String),

    #[error("form JSON could not be saved to {}: {message}", .path.display())]
    WriteFailed { path: PathBuf, message: String },

    #[error("form could not be encoded: {0}")]
    Encode(String),

    // Live store errors
    #[error("form has no live id")]
    MissingFormId,

    #[error("form key '{key}' is already live")]
    AlreadyLive { key: FormKey, form_id: Option<FormId> },

    #[error("JSON file for key '{0}' does not have sync enabled")]
    SyncDisabled(FormKey),

    #[error("live form {form_id} does not hold key '{key}'")]
    KeyMismatch { key: FormKey, form_id: FormId },

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Error::FormNotFound(id),
            other => Error::Store(other),
        }
    }
}

impl Error {
    /// True for the `NotFound` family (missing file or missing live form).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::FileNotFound { .. } | Error::FormNotFound(_))
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
