//! Live form handlers - the in-memory form service and its save event.

use super::handle_save;
use crate::error::{AppError, Result};
use crate::notice::{Action, Notice};
use crate::Engine;
use formsync_engine::{FormDefinition, FormId, FormStatus, FormStore};
use serde::Serialize;

/// Response for a per-form status check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStatusResponse {
    pub form_id: FormId,
    pub label: &'static str,
    #[serde(flatten)]
    pub status: FormStatus,
}

pub fn handle_list_live(engine: &Engine) -> Result<Vec<FormDefinition>> {
    engine
        .store()
        .list_forms()
        .map_err(|e| AppError::Engine(e.into()))
}

/// Create a live form. Creating does not fire the save event.
pub fn handle_create_live(engine: &Engine, form: FormDefinition) -> Result<Notice> {
    let form_id = engine
        .store()
        .create_form(form)
        .map_err(|e| AppError::Action {
            action: Action::Create,
            key: None,
            form_id: None,
            source: e.into(),
        })?;
    Ok(Notice::success(Action::Create, form_id, "Form created"))
}

/// The live form as rendered for editing, `modified` stamped to now.
pub fn handle_edit_live(engine: &Engine, form_id: FormId) -> Result<FormDefinition> {
    engine
        .prepare_for_edit(form_id)
        .map_err(|e| AppError::for_form(Action::Edit, form_id, e))
}

/// Replace a live form, then fire its save event.
pub fn handle_update_live(
    engine: &Engine,
    form_id: FormId,
    form: FormDefinition,
) -> Result<Notice> {
    engine
        .store()
        .update_form(form_id, form)
        .map_err(|e| AppError::for_form(Action::Save, form_id, e.into()))?;
    handle_save(engine, form_id)
}

pub fn handle_live_status(engine: &Engine, form_id: FormId) -> Result<FormStatusResponse> {
    let status = engine.form_status(form_id)?;
    Ok(FormStatusResponse {
        form_id,
        label: status.label(),
        status,
    })
}
