//! Extension points a host can subscribe to.
//!
//! Filters take a value and return a (possibly changed) value; they run in
//! registration order, each seeing the previous one's output. Actions observe
//! an outcome and cannot change it.
//!
//! The permission checks are the other extension point and live on
//! [`PermissionGate`](crate::PermissionGate).

use crate::{error::Result, FormDefinition, FormFile, FormId};
use std::path::PathBuf;

type Filter<T> = Box<dyn Fn(T) -> T + Send + Sync>;
type SaveAction = Box<dyn for<'a> Fn(&SaveEvent<'a>) + Send + Sync>;
type ApplyAction = Box<dyn for<'a> Fn(&ApplyEvent<'a>) + Send + Sync>;

/// Outcome of an export, as seen by `after-save` handlers.
#[derive(Debug)]
pub struct SaveEvent<'a> {
    /// The form that triggered the export
    pub form: &'a FormDefinition,
    pub form_id: FormId,
    /// The JSON that was (or would have been) written
    pub payload: &'a str,
    /// Bytes written, or why the write failed
    pub result: &'a Result<usize>,
}

/// Outcome of an import or update, as seen by `after-import` / `after-sync`.
#[derive(Debug)]
pub struct ApplyEvent<'a> {
    /// The form as sent to the live store
    pub form: &'a FormDefinition,
    /// Live id on success
    pub result: &'a Result<FormId>,
}

/// Registry of filters and actions.
#[derive(Default)]
pub struct Hooks {
    before_save: Vec<Filter<FormFile>>,
    after_save: Vec<SaveAction>,
    before_import: Vec<Filter<FormDefinition>>,
    after_import: Vec<ApplyAction>,
    before_sync: Vec<Filter<FormDefinition>>,
    after_sync: Vec<ApplyAction>,
    save_point: Vec<Filter<PathBuf>>,
    key_prefix: Vec<Filter<String>>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("before_save", &self.before_save.len())
            .field("after_save", &self.after_save.len())
            .field("before_import", &self.before_import.len())
            .field("after_import", &self.after_import.len())
            .field("before_sync", &self.before_sync.len())
            .field("after_sync", &self.after_sync.len())
            .field("save_point", &self.save_point.len())
            .field("key_prefix", &self.key_prefix.len())
            .finish()
    }
}

impl Hooks {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Amend the document about to be written on export.
    pub fn on_before_save(
        mut self,
        f: impl Fn(FormFile) -> FormFile + Send + Sync + 'static,
    ) -> Self {
        self.before_save.push(Box::new(f));
        self
    }

    pub fn on_after_save(mut self, f: impl Fn(&SaveEvent<'_>) + Send + Sync + 'static) -> Self {
        self.after_save.push(Box::new(f));
        self
    }

    /// Amend a file form before it is created in the live store.
    pub fn on_before_import(
        mut self,
        f: impl Fn(FormDefinition) -> FormDefinition + Send + Sync + 'static,
    ) -> Self {
        self.before_import.push(Box::new(f));
        self
    }

    pub fn on_after_import(mut self, f: impl Fn(&ApplyEvent<'_>) + Send + Sync + 'static) -> Self {
        self.after_import.push(Box::new(f));
        self
    }

    /// Amend a file form before it overwrites a live form.
    pub fn on_before_sync(
        mut self,
        f: impl Fn(FormDefinition) -> FormDefinition + Send + Sync + 'static,
    ) -> Self {
        self.before_sync.push(Box::new(f));
        self
    }

    pub fn on_after_sync(mut self, f: impl Fn(&ApplyEvent<'_>) + Send + Sync + 'static) -> Self {
        self.after_sync.push(Box::new(f));
        self
    }

    /// Override the save point directory.
    pub fn on_save_point(
        mut self,
        f: impl Fn(PathBuf) -> PathBuf + Send + Sync + 'static,
    ) -> Self {
        self.save_point.push(Box::new(f));
        self
    }

    /// Override the key prefix.
    pub fn on_key_prefix(mut self, f: impl Fn(String) -> String + Send + Sync + 'static) -> Self {
        self.key_prefix.push(Box::new(f));
        self
    }

    pub(crate) fn before_save(&self, document: FormFile) -> FormFile {
        apply_filters(&self.before_save, document)
    }

    pub(crate) fn after_save(&self, event: &SaveEvent<'_>) {
        for action in &self.after_save {
            action(event);
        }
    }

    pub(crate) fn before_import(&self, form: FormDefinition) -> FormDefinition {
        apply_filters(&self.before_import, form)
    }

    pub(crate) fn after_import(&self, event: &ApplyEvent<'_>) {
        for action in &self.after_import {
            action(event);
        }
    }

    pub(crate) fn before_sync(&self, form: FormDefinition) -> FormDefinition {
        apply_filters(&self.before_sync, form)
    }

    pub(crate) fn after_sync(&self, event: &ApplyEvent<'_>) {
        for action in &self.after_sync {
            action(event);
        }
    }

    pub(crate) fn save_point(&self, default: PathBuf) -> PathBuf {
        apply_filters(&self.save_point, default)
    }

    pub(crate) fn key_prefix(&self, default: String) -> String {
        apply_filters(&self.key_prefix, default)
    }
}

fn apply_filters<T>(filters: &[Filter<T>], value: T) -> T {
    filters.iter().fold(value, |value, filter| filter(value))
}
