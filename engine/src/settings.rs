//! Reading and writing the sync settings block of a form.
//!
//! A form whose block is missing or disabled is invisible to sync: every
//! accessor here returns `None` for it rather than an error.

use crate::{FormDefinition, FormKey, SyncSettings, Timestamp};

/// True iff the settings block exists and its enabled flag is set.
pub fn is_enabled(form: &FormDefinition) -> bool {
    form.sync.as_ref().is_some_and(|s| s.enabled)
}

/// The settings block of an enabled form.
pub fn get_settings(form: &FormDefinition) -> Option<&SyncSettings> {
    form.sync.as_ref().filter(|s| s.enabled)
}

/// The stable key of an enabled form.
pub fn get_key(form: &FormDefinition) -> Option<&str> {
    get_settings(form).and_then(|s| s.key.as_deref())
}

/// The `modified` stamp of an enabled form.
pub fn get_modified(form: &FormDefinition) -> Option<Timestamp> {
    get_settings(form).and_then(|s| s.modified)
}

/// Mint a new key: `prefix` followed by a random v4 UUID in simple form.
pub fn generate_key(prefix: &str) -> FormKey {
    format!("{}{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Stamp `modified = now` on an enabled form; other forms come back as-is.
///
/// Called whenever a form is opened for editing, so an edit is timestamped
/// even if only the form body is saved afterwards.
pub fn inject_modified_timestamp(mut form: FormDefinition, now: Timestamp) -> FormDefinition {
    if let Some(settings) = form.sync.as_mut().filter(|s| s.enabled) {
        settings.modified = Some(now);
    }
    form
}

/// Give an enabled form a key if it has none. Returns the key, or `None`
/// when the form is not enabled. An existing key is never replaced.
pub fn ensure_key(form: &mut FormDefinition, prefix: &str) -> Option<FormKey> {
    let settings = form.sync.as_mut().filter(|s| s.enabled)?;
    let key = settings
        .key
        .get_or_insert_with(|| generate_key(prefix))
        .clone();
    Some(key)
}

/// Turn sync on for a form, assigning a key if it lacks one and stamping
/// `modified`.
pub fn enable(form: &mut FormDefinition, prefix: &str, now: Timestamp) -> FormKey {
    let settings = form.sync.get_or_insert_with(SyncSettings::default);
    settings.enabled = true;
    settings.modified = Some(now);
    settings
        .key
        .get_or_insert_with(|| generate_key(prefix))
        .clone()
}
