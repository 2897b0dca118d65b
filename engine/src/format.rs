//! On-disk encoding of a form file.
//!
//! Files are written as a keyed object holding the form under `"0"` next to
//! the exporter version:
//!
//! ```json
//! {
//!   "0": { "title": "Contact", "local_json_for_gravity_forms": { ... }, ... },
//!   "version": "2.5.1"
//! }
//! ```
//!
//! Readers also accept an array whose first element is the form, and a bare
//! form object, so hand-written and older exports load too.
//!
//! Output is pretty-printed with sorted keys so files diff cleanly under
//! version control.

use crate::{error::Result, Error, FormDefinition, SETTINGS_BLOCK};
use serde_json::{Map, Value};
use std::path::Path;

/// Key of the form inside the envelope object.
pub const FORM_SLOT: &str = "0";

/// A decoded form file.
#[derive(Debug, Clone, PartialEq)]
pub struct FormFile {
    pub form: FormDefinition,
    /// Version of the system that exported the file, if recorded
    pub version: Option<String>,
}

impl FormFile {
    pub fn new(form: FormDefinition) -> Self {
        Self {
            form,
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Encode as the envelope object.
    pub fn to_value(&self) -> Result<Value> {
        let form = serde_json::to_value(&self.form).map_err(|e| Error::Encode(e.to_string()))?;

        let mut envelope = Map::new();
        envelope.insert(FORM_SLOT.to_string(), form);
        if let Some(version) = &self.version {
            envelope.insert("version".to_string(), Value::String(version.clone()));
        }
        Ok(Value::Object(envelope))
    }

    /// Encode as pretty JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(&self.to_value()?)
            .map_err(|e| Error::Encode(e.to_string()))?;
        json.push('\n');
        Ok(json)
    }

    /// Decode file contents. `source` is only used in error messages.
    pub fn from_json(json: &str, source: &Path) -> Result<Self> {
        let parse_error = |message: String| Error::Parse {
            path: source.to_path_buf(),
            message,
        };

        let value: Value = serde_json::from_str(json).map_err(|e| parse_error(e.to_string()))?;

        let (form, version) = match value {
            Value::Array(mut items) => {
                if items.is_empty() {
                    return Err(parse_error("empty form array".to_string()));
                }
                (items.swap_remove(0), None)
            }
            Value::Object(mut map) => match map.remove(FORM_SLOT) {
                Some(form) => (form, map.remove("version").and_then(version_string)),
                None if map.contains_key("title") || map.contains_key(SETTINGS_BLOCK) => {
                    (Value::Object(map), None)
                }
                None => return Err(parse_error("no form object in file".to_string())),
            },
            other => {
                return Err(parse_error(format!(
                    "expected an object or array, found {}",
                    json_type_name(&other)
                )))
            }
        };

        if !form.is_object() {
            return Err(parse_error(format!(
                "form entry is {}, not an object",
                json_type_name(&form)
            )));
        }

        let form = serde_json::from_value(form).map_err(|e| parse_error(e.to_string()))?;
        Ok(Self { form, version })
    }
}

fn version_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
