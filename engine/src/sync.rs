//! Reconciling the live store with the save point.
//!
//! Both sides are matched by key. For every key the engine derives one of
//! four states, fresh on every call:
//!
//! | file | live | `modified`  | state            | action  |
//! |------|------|-------------|------------------|---------|
//! | yes  | no   |             | `FileOnly`       | import  |
//! | no   | yes  |             | `LiveOnly`       | none    |
//! | yes  | yes  | equal       | `InSyncSame`     | none    |
//! | yes  | yes  | different   | `InSyncDiverged` | update  |
//!
//! Updates always flow file to live. Live to file happens only on export,
//! which the host triggers from its save event.

use crate::{
    error::Result,
    hooks::{ApplyEvent, SaveEvent},
    settings, Clock, Error, FileRepository, FormDefinition, FormFile, FormId, FormKey, FormStore,
    Hooks, PermissionGate, SyncConfig, SystemClock, Timestamp, Verdict,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

/// Enabled live forms indexed by key.
pub type LiveForms = BTreeMap<FormKey, FormDefinition>;

/// Where a key stands between the two stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    FileOnly,
    LiveOnly,
    InSyncSame,
    InSyncDiverged,
}

impl SyncState {
    /// Short label for listings.
    pub fn label(self) -> &'static str {
        match self {
            SyncState::FileOnly => "Import available",
            SyncState::LiveOnly => "Not exported",
            SyncState::InSyncSame => "Synced",
            SyncState::InSyncDiverged => "Update available",
        }
    }
}

/// What a listing offers for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SyncAction {
    Import,
    Update {
        #[serde(rename = "liveId")]
        live_id: FormId,
    },
    None,
}

#[derive(Debug, Clone, PartialEq)]
enum Sides {
    File(FormDefinition),
    Live(FormDefinition),
    Both {
        file: FormDefinition,
        live: FormDefinition,
        diverged: bool,
    },
}

/// One key with whichever sides hold it. Built by [`SyncEngine::records`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRecord {
    key: FormKey,
    sides: Sides,
    action: SyncAction,
}

impl SyncRecord {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn file(&self) -> Option<&FormDefinition> {
        match &self.sides {
            Sides::File(file) | Sides::Both { file, .. } => Some(file),
            Sides::Live(_) => None,
        }
    }

    pub fn live(&self) -> Option<&FormDefinition> {
        match &self.sides {
            Sides::Live(live) | Sides::Both { live, .. } => Some(live),
            Sides::File(_) => None,
        }
    }

    pub fn state(&self) -> SyncState {
        match &self.sides {
            Sides::File(_) => SyncState::FileOnly,
            Sides::Live(_) => SyncState::LiveOnly,
            Sides::Both { diverged: false, .. } => SyncState::InSyncSame,
            Sides::Both { diverged: true, .. } => SyncState::InSyncDiverged,
        }
    }

    /// The action [`can_import`] and [`can_sync`] allowed when the record
    /// was built.
    pub fn action(&self) -> SyncAction {
        self.action
    }

    /// Title as the file has it, falling back to the live form.
    pub fn title(&self) -> &str {
        self.file()
            .or_else(|| self.live())
            .map(|form| form.title.as_str())
            .unwrap_or_default()
    }

    pub fn live_id(&self) -> Option<FormId> {
        self.live().and_then(|live| live.id)
    }

    /// `modified` of the file side (else the live side).
    pub fn modified(&self) -> Option<Timestamp> {
        self.file()
            .or_else(|| self.live())
            .and_then(settings::get_modified)
    }

    /// [`modified`](Self::modified) as an RFC 2822 date.
    pub fn last_updated(&self) -> Option<String> {
        self.modified()
            .and_then(|ts| chrono::DateTime::<chrono::Utc>::from_timestamp(ts, 0))
            .map(|date| date.to_rfc2822())
    }
}

/// State of a single live form against its file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FormStatus {
    /// Sync is off for the form
    NotEnabled,
    /// Enabled, but nothing has been exported under its key
    FileMissing { key: FormKey },
    Synced { key: FormKey },
    Diverged {
        key: FormKey,
        #[serde(rename = "fileModified")]
        file_modified: Option<Timestamp>,
        #[serde(rename = "liveModified")]
        live_modified: Option<Timestamp>,
    },
}

impl FormStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FormStatus::Synced { .. } => "Synced",
            FormStatus::Diverged { .. } => "Sync form",
            FormStatus::NotEnabled | FormStatus::FileMissing { .. } => {
                "Sync is not enabled or the JSON file is missing"
            }
        }
    }
}

/// The resolved save point and what the write chain says about it.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePointStatus {
    pub path: PathBuf,
    pub verdict: Verdict,
}

impl SavePointStatus {
    pub fn is_writable(&self) -> bool {
        self.verdict.is_ok()
    }
}

/// True iff `file_form` is enabled and no live form holds its key.
pub fn can_import(live_forms_by_key: &LiveForms, file_form: &FormDefinition) -> bool {
    settings::get_key(file_form).is_some_and(|key| !live_forms_by_key.contains_key(key))
}

/// True iff a live form holds `file_form`'s key and their `modified` stamps
/// differ. A missing stamp compares as 0.
pub fn can_sync(live_forms_by_key: &LiveForms, file_form: &FormDefinition) -> bool {
    settings::get_key(file_form)
        .and_then(|key| live_forms_by_key.get(key))
        .is_some_and(|live| modified_or_zero(live) != modified_or_zero(file_form))
}

fn modified_or_zero(form: &FormDefinition) -> Timestamp {
    settings::get_modified(form).unwrap_or(0)
}

/// Exports, imports and updates forms between a [`FormStore`] and the save
/// point.
pub struct SyncEngine<S: FormStore> {
    store: S,
    files: FileRepository,
    hooks: Hooks,
    clock: Box<dyn Clock>,
    exporter_version: String,
}

impl<S: FormStore> SyncEngine<S> {
    pub fn new(store: S, config: SyncConfig, gate: PermissionGate, hooks: Hooks) -> Self {
        let files = FileRepository::new(&config, &hooks, gate);
        Self {
            store,
            files,
            hooks,
            clock: Box::new(SystemClock),
            exporter_version: config.exporter_version,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn files(&self) -> &FileRepository {
        &self.files
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Write a live form to its file.
    ///
    /// Disabled forms are skipped with `Ok(None)` and no check runs. Otherwise
    /// the write chain runs before anything is fetched or written, and the
    /// form is re-read from the store so the file holds the stored version.
    pub fn export(&self, form: &FormDefinition) -> Result<Option<usize>> {
        if !settings::is_enabled(form) {
            tracing::debug!(form_id = ?form.id, "sync disabled, export skipped");
            return Ok(None);
        }
        let form_id = form.id.ok_or(Error::MissingFormId)?;

        self.files.gate().check_write(self.files.save_point_path())?;

        let mut live = self.store.get_form(form_id)?;
        let Some(key) = settings::get_key(&live).map(str::to_owned) else {
            if settings::is_enabled(&live) {
                return Err(Error::MissingKey {
                    path: self.files.save_point_path().to_path_buf(),
                });
            }
            tracing::debug!(form_id, "stored form has sync disabled, export skipped");
            return Ok(None);
        };

        if let Some(sync) = live.sync.as_mut() {
            sync.modified.get_or_insert_with(|| self.clock.now());
        }
        live.set_active(self.store.is_active(form_id)?);

        let document = self
            .hooks
            .before_save(FormFile::new(live).with_version(self.exporter_version.as_str()));
        let payload = document.to_json()?;
        let result = self.files.write(&key, &payload);

        self.hooks.after_save(&SaveEvent {
            form: &document.form,
            form_id,
            payload: &payload,
            result: &result,
        });

        match &result {
            Ok(bytes) => tracing::info!(key = %key, form_id, bytes, "form exported"),
            Err(err) => tracing::warn!(key = %key, form_id, error = %err, "form export failed"),
        }
        result.map(Some)
    }

    /// Handle a live form having been saved: make sure an enabled form has a
    /// key and a `modified` stamp (persisting them to the store when either
    /// had to be filled in), then export.
    pub fn on_form_saved(&self, form_id: FormId) -> Result<Option<usize>> {
        let mut form = self.store.get_form(form_id)?;
        if !settings::is_enabled(&form) {
            return Ok(None);
        }

        let missing_key = settings::get_key(&form).is_none();
        if missing_key || settings::get_modified(&form).is_none() {
            let key = settings::ensure_key(&mut form, self.files.key_prefix());
            if let Some(sync) = form.sync.as_mut() {
                sync.modified.get_or_insert_with(|| self.clock.now());
            }
            self.store.update_form(form_id, form.clone())?;
            if missing_key {
                tracing::info!(key = ?key, form_id, "assigned form key");
            }
        }
        self.export(&form)
    }

    /// Create a live form from the file stored under `key`.
    ///
    /// Refused with [`Error::SyncDisabled`] when the file has sync off, and
    /// with [`Error::AlreadyLive`] when a live form already holds its key.
    pub fn import(&self, key: &str) -> Result<FormId> {
        let mut form = self.files.read(key)?;
        let live = self.live_forms_by_key()?;
        if !can_import(&live, &form) {
            let Some(file_key) = settings::get_key(&form) else {
                tracing::warn!(key, "import refused, file has sync disabled");
                return Err(Error::SyncDisabled(key.to_string()));
            };
            let form_id = live.get(file_key).and_then(|live| live.id);
            tracing::warn!(key = %file_key, ?form_id, "import refused, key is already live");
            return Err(Error::AlreadyLive {
                key: file_key.to_string(),
                form_id,
            });
        }

        // the file's id belongs to whichever install exported it
        form.id = None;
        let form = self.hooks.before_import(form);

        let result = self.store.create_form(form.clone()).map_err(Error::from);
        self.hooks.after_import(&ApplyEvent {
            form: &form,
            result: &result,
        });

        match &result {
            Ok(form_id) => tracing::info!(key, form_id, "form imported"),
            Err(err) => tracing::warn!(key, error = %err, "form import failed"),
        }
        result
    }

    /// Overwrite live form `live_id` with the file stored under `key`.
    ///
    /// The file must have sync enabled and live form `live_id` must already
    /// hold the file's key, else [`Error::SyncDisabled`] or
    /// [`Error::KeyMismatch`].
    pub fn update(&self, key: &str, live_id: FormId) -> Result<FormId> {
        let mut form = self.files.read(key)?;
        let Some(file_key) = settings::get_key(&form).map(str::to_owned) else {
            tracing::warn!(key, form_id = live_id, "update refused, file has sync disabled");
            return Err(Error::SyncDisabled(key.to_string()));
        };
        let target = self.store.get_form(live_id)?;
        if settings::get_key(&target) != Some(file_key.as_str()) {
            tracing::warn!(key = %file_key, form_id = live_id, "update refused, live form holds another key");
            return Err(Error::KeyMismatch {
                key: file_key,
                form_id: live_id,
            });
        }

        form.id = Some(live_id);
        let form = self.hooks.before_sync(form);

        let result = self
            .store
            .update_form(live_id, form.clone())
            .map(|_| live_id)
            .map_err(Error::from);
        self.hooks.after_sync(&ApplyEvent {
            form: &form,
            result: &result,
        });

        match &result {
            Ok(_) => tracing::info!(key, form_id = live_id, "form updated from file"),
            Err(err) => tracing::warn!(key, form_id = live_id, error = %err, "form update failed"),
        }
        result
    }

    /// Enabled live forms by key. If two live forms share a key the first
    /// one listed wins.
    pub fn live_forms_by_key(&self) -> Result<LiveForms> {
        let mut by_key = LiveForms::new();
        for form in self.store.list_forms()? {
            let Some(key) = settings::get_key(&form).map(str::to_owned) else {
                continue;
            };
            if by_key.contains_key(&key) {
                tracing::warn!(key = %key, form_id = ?form.id, "duplicate form key in live store, ignoring");
                continue;
            }
            by_key.insert(key, form);
        }
        Ok(by_key)
    }

    /// One record per key across both stores: file keys in file name order,
    /// then live-only keys in key order.
    pub fn records(&self) -> Result<Vec<SyncRecord>> {
        let mut live = self.live_forms_by_key()?;
        let files = self.files.list_all()?;

        let mut records = Vec::with_capacity(files.len() + live.len());
        let mut seen = HashSet::new();
        for file in files {
            let Some(key) = settings::get_key(&file).map(str::to_owned) else {
                continue;
            };
            if !seen.insert(key.clone()) {
                tracing::warn!(key = %key, "duplicate form key in save point, ignoring");
                continue;
            }

            let diverged = can_sync(&live, &file);
            let action = if can_import(&live, &file) {
                SyncAction::Import
            } else if diverged {
                live.get(&key)
                    .and_then(|live| live.id)
                    .map_or(SyncAction::None, |live_id| SyncAction::Update { live_id })
            } else {
                SyncAction::None
            };
            let sides = match live.remove(&key) {
                Some(live) => Sides::Both {
                    file,
                    live,
                    diverged,
                },
                None => Sides::File(file),
            };
            records.push(SyncRecord { key, sides, action });
        }

        records.extend(live.into_iter().map(|(key, live)| SyncRecord {
            key,
            sides: Sides::Live(live),
            action: SyncAction::None,
        }));
        Ok(records)
    }

    /// The live form as it should be rendered for editing, `modified`
    /// stamped with the current time.
    pub fn prepare_for_edit(&self, form_id: FormId) -> Result<FormDefinition> {
        let form = self.store.get_form(form_id)?;
        Ok(settings::inject_modified_timestamp(form, self.now()))
    }

    pub fn form_status(&self, form_id: FormId) -> Result<FormStatus> {
        let live = self.store.get_form(form_id)?;
        let Some(key) = settings::get_key(&live).map(str::to_owned) else {
            return Ok(FormStatus::NotEnabled);
        };

        match self.files.read(&key) {
            Ok(file) => {
                let file_modified = settings::get_modified(&file);
                let live_modified = settings::get_modified(&live);
                if file_modified.unwrap_or(0) == live_modified.unwrap_or(0) {
                    Ok(FormStatus::Synced { key })
                } else {
                    Ok(FormStatus::Diverged {
                        key,
                        file_modified,
                        live_modified,
                    })
                }
            }
            Err(err) if err.is_not_found() => Ok(FormStatus::FileMissing { key }),
            Err(err) => Err(err),
        }
    }

    pub fn save_point_status(&self) -> SavePointStatus {
        let path = self.files.save_point_path().to_path_buf();
        let verdict = self.files.gate().check_write(&path);
        SavePointStatus { path, verdict }
    }
}
