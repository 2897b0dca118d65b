//! Form definitions as the engine sees them.
//!
//! Only `id`, `title` and the sync settings block are typed. Everything else
//! (fields, confirmations, notifications, ...) is carried through untouched in
//! [`FormDefinition::body`].

use crate::{FormId, FormKey, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the settings block inside a form definition.
pub const SETTINGS_BLOCK: &str = "local_json_for_gravity_forms";

/// Sync metadata embedded in a form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Whether the form takes part in sync at all
    #[serde(default, deserialize_with = "lenient::flag")]
    pub enabled: bool,
    /// Stable identifier shared by the live form and its file
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::key"
    )]
    pub key: Option<FormKey>,
    /// Last edit time (seconds since epoch); drift detector
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::timestamp"
    )]
    pub modified: Option<Timestamp>,
    /// Any other values the host keeps in the block
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SyncSettings {
    /// Enabled settings for `key`.
    pub fn enabled(key: impl Into<FormKey>) -> Self {
        Self {
            enabled: true,
            key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn with_modified(mut self, modified: Timestamp) -> Self {
        self.modified = Some(modified);
        self
    }
}

/// A form definition from either store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Live store id; meaningless for forms that only exist on disk
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::id"
    )]
    pub id: Option<FormId>,
    #[serde(default)]
    pub title: String,
    #[serde(
        rename = "local_json_for_gravity_forms",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::settings"
    )]
    pub sync: Option<SyncSettings>,
    /// The rest of the form, passed through unchanged
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl FormDefinition {
    /// Create a form with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: FormId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_settings(mut self, settings: SyncSettings) -> Self {
        self.sync = Some(settings);
        self
    }

    /// Set an opaque body value.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.body.insert(name.into(), value);
        self
    }

    /// Live "active" flag as carried in the payload, if any.
    pub fn is_active(&self) -> Option<bool> {
        self.body.get("is_active").map(lenient::truthy)
    }

    /// Stamp the live "active" flag onto the payload.
    pub fn set_active(&mut self, active: bool) {
        self.body.insert("is_active".to_string(), Value::Bool(active));
    }
}

/// Decoders tolerant of how hosts persist posted settings: flags as `"1"`,
/// numbers as strings, empty strings for unset values.
mod lenient {
    use super::SyncSettings;
    use crate::{FormId, FormKey, Timestamp};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(super) fn truthy(value: &Value) -> bool {
        match value {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            Value::String(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            ),
            _ => false,
        }
    }

    pub(super) fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(truthy(&Value::deserialize(deserializer)?))
    }

    pub(super) fn key<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<FormKey>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
    }

    pub(super) fn timestamp<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as Timestamp)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub(super) fn id<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<FormId>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// Anything other than an object (hosts sometimes store `[]` or `""`)
    /// means no settings.
    pub(super) fn settings<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<SyncSettings>, D::Error> {
        match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => serde_json::from_value(value)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_minimal_file_form() {
        let form: FormDefinition = serde_json::from_value(json!({
            "title": "X",
            "local_json_for_gravity_forms": {"enabled": true, "key": "abc123", "modified": 1000}
        }))
        .unwrap();

        assert_eq!(form.id, None);
        assert_eq!(form.title, "X");
        let settings = form.sync.unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.key.as_deref(), Some("abc123"));
        assert_eq!(settings.modified, Some(1000));
    }

    #[test]
    fn parse_string_typed_settings() {
        let form: FormDefinition = serde_json::from_value(json!({
            "id": "12",
            "title": "Posted",
            "local_json_for_gravity_forms": {"enabled": "1", "key": " local_gf_a ", "modified": "1700000000"}
        }))
        .unwrap();

        assert_eq!(form.id, Some(12));
        let settings = form.sync.unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.key.as_deref(), Some("local_gf_a"));
        assert_eq!(settings.modified, Some(1_700_000_000));
    }

    #[test]
    fn disabled_and_empty_values() {
        let form: FormDefinition = serde_json::from_value(json!({
            "title": "Off",
            "local_json_for_gravity_forms": {"enabled": "0", "key": "", "modified": ""}
        }))
        .unwrap();

        let settings = form.sync.unwrap();
        assert!(!settings.enabled);
        assert_eq!(settings.key, None);
        assert_eq!(settings.modified, None);
    }

    #[test]
    fn non_object_settings_block_means_none() {
        let form: FormDefinition = serde_json::from_value(json!({
            "title": "Legacy",
            "local_json_for_gravity_forms": []
        }))
        .unwrap();
        assert_eq!(form.sync, None);
    }

    #[test]
    fn body_passes_through() {
        let original = json!({
            "id": 4,
            "title": "Survey",
            "fields": [{"id": 1, "type": "text", "label": "Name"}],
            "confirmations": {"5f1": {"type": "message"}},
            "local_json_for_gravity_forms": {"enabled": true, "key": "k", "modified": 5, "note": "kept"}
        });
        let form: FormDefinition = serde_json::from_value(original.clone()).unwrap();

        assert_eq!(form.body["fields"][0]["label"], "Name");
        assert_eq!(form.sync.as_ref().unwrap().extra["note"], "kept");
        assert_eq!(serde_json::to_value(&form).unwrap(), original);
    }

    #[test]
    fn active_flag() {
        let mut form = FormDefinition::new("A").with_field("is_active", json!("1"));
        assert_eq!(form.is_active(), Some(true));

        form.set_active(false);
        assert_eq!(form.is_active(), Some(false));
        assert_eq!(FormDefinition::new("B").is_active(), None);
    }
}
