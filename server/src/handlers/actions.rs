//! Admin action handlers - import, update and save.

use crate::error::{AppError, Result};
use crate::notice::{Action, Notice};
use crate::Engine;
use formsync_engine::{settings, FormId, FormStore};
use serde::Deserialize;

/// Query parameters for an update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuery {
    /// Live form to overwrite
    pub form_id: FormId,
}

/// Create a live form from the JSON file stored under `key`.
pub fn handle_import(engine: &Engine, key: &str) -> Result<Notice> {
    let form_id = engine
        .import(key)
        .map_err(|e| AppError::for_key(Action::Import, key, e))?;
    Ok(Notice::success(Action::Import, form_id, "Form imported from JSON").with_key(key))
}

/// Overwrite a live form with the JSON file stored under `key`.
pub fn handle_update(engine: &Engine, key: &str, form_id: FormId) -> Result<Notice> {
    let form_id = engine.update(key, form_id).map_err(|e| AppError::Action {
        action: Action::Update,
        key: Some(key.to_string()),
        form_id: Some(form_id),
        source: e,
    })?;
    Ok(Notice::success(Action::Update, form_id, "Form updated from JSON").with_key(key))
}

/// Fire the save event for a live form: ensure its key, then export.
pub fn handle_save(engine: &Engine, form_id: FormId) -> Result<Notice> {
    let written = engine
        .on_form_saved(form_id)
        .map_err(|e| AppError::for_form(Action::Save, form_id, e))?;

    let notice = match written {
        Some(bytes) => Notice::success(
            Action::Save,
            form_id,
            format!("Form saved to JSON ({} bytes)", bytes),
        ),
        None => Notice::success(Action::Save, form_id, "Sync is not enabled for this form"),
    };

    // report the key the save may have just assigned
    let key = engine
        .store()
        .get_form(form_id)
        .ok()
        .and_then(|form| settings::get_key(&form).map(str::to_owned));
    Ok(match key {
        Some(key) => notice.with_key(key),
        None => notice,
    })
}
