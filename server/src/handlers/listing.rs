//! Listing handler - the sync table and save point status.

use crate::error::Result;
use crate::Engine;
use formsync_engine::{FormId, SyncAction, SyncRecord, SyncState};
use serde::Serialize;

/// One row of the sync table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRow {
    pub key: String,
    pub title: String,
    /// RFC 2822 rendering of the file's `modified` stamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub state: SyncState,
    pub state_label: &'static str,
    pub action: SyncAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_id: Option<FormId>,
}

impl From<&SyncRecord> for FormRow {
    fn from(record: &SyncRecord) -> Self {
        Self {
            key: record.key().to_string(),
            title: record.title().to_string(),
            last_updated: record.last_updated(),
            state: record.state(),
            state_label: record.state().label(),
            action: record.action(),
            live_id: record.live_id(),
        }
    }
}

/// Response for the sync table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub save_point: String,
    pub forms: Vec<FormRow>,
}

/// Response for the save point status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub save_point: String,
    pub key_prefix: String,
    pub writable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Build the sync table, reconciling both stores fresh.
pub fn handle_list(engine: &Engine) -> Result<ListResponse> {
    let records = engine.records()?;
    Ok(ListResponse {
        save_point: engine.files().save_point_path().display().to_string(),
        forms: records.iter().map(FormRow::from).collect(),
    })
}

/// Run the write chain against the save point.
pub fn handle_status(engine: &Engine) -> StatusResponse {
    let status = engine.save_point_status();
    StatusResponse {
        save_point: status.path.display().to_string(),
        key_prefix: engine.files().key_prefix().to_string(),
        writable: status.is_writable(),
        message: status.verdict.err().map(|e| e.to_string()),
    }
}
