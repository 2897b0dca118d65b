//! Admin notices: the JSON body every admin action answers with.

use formsync_engine::{FormId, FormKey};
use serde::Serialize;

/// The admin action a notice reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Import,
    Update,
    Save,
    Create,
    Edit,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Import => "import",
            Action::Update => "update",
            Action::Save => "save",
            Action::Create => "create",
            Action::Edit => "edit",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeStatus {
    Success,
    Failure,
}

/// Outcome of an admin action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub status: NoticeStatus,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<FormKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_id: Option<FormId>,
    /// Where the affected live form can be viewed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub message: String,
}

impl Notice {
    pub fn success(action: Action, form_id: FormId, message: impl Into<String>) -> Self {
        Self {
            status: NoticeStatus::Success,
            action,
            key: None,
            form_id: Some(form_id),
            link: Some(live_form_link(form_id)),
            message: message.into(),
        }
    }

    pub fn failure(action: Action, message: impl Into<String>) -> Self {
        Self {
            status: NoticeStatus::Failure,
            action,
            key: None,
            form_id: None,
            link: None,
            message: message.into(),
        }
    }

    pub fn with_key(mut self, key: impl Into<FormKey>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_form_id(mut self, form_id: FormId) -> Self {
        self.form_id = Some(form_id);
        self
    }
}

pub fn live_form_link(form_id: FormId) -> String {
    format!("/live/forms/{}", form_id)
}
