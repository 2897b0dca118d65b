//! The live side: a form store addressed by numeric id.
//!
//! [`FormStore`] is the boundary to whatever service owns live forms.
//! [`MemoryFormStore`] keeps them in process.

use crate::{FormDefinition, FormId, StoreError};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// CRUD access to live forms.
pub trait FormStore: Send + Sync {
    fn list_forms(&self) -> StoreResult<Vec<FormDefinition>>;

    fn get_form(&self, id: FormId) -> StoreResult<FormDefinition>;

    /// Create a form, returning its new id. Any id on `form` is ignored.
    fn create_form(&self, form: FormDefinition) -> StoreResult<FormId>;

    /// Replace the form stored under `id`, returning `id`.
    fn update_form(&self, id: FormId, form: FormDefinition) -> StoreResult<FormId>;

    /// Whether the live form is active. Forms that carry no flag count as
    /// active.
    fn is_active(&self, id: FormId) -> StoreResult<bool> {
        self.get_form(id).map(|form| form.is_active().unwrap_or(true))
    }
}

#[derive(Debug, Default)]
struct Inner {
    last_id: FormId,
    forms: BTreeMap<FormId, FormDefinition>,
}

/// Thread-safe in-memory store with sequential ids starting at 1.
#[derive(Debug, Default)]
pub struct MemoryFormStore {
    inner: RwLock<Inner>,
}

impl MemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live forms.
    pub fn len(&self) -> usize {
        self.read().map(|inner| inner.forms.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("form store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("form store lock poisoned".to_string()))
    }
}

fn validate(form: &FormDefinition) -> StoreResult<()> {
    if form.title.trim().is_empty() {
        return Err(StoreError::Rejected("form title is required".to_string()));
    }
    Ok(())
}

impl FormStore for MemoryFormStore {
    fn list_forms(&self) -> StoreResult<Vec<FormDefinition>> {
        Ok(self.read()?.forms.values().cloned().collect())
    }

    fn get_form(&self, id: FormId) -> StoreResult<FormDefinition> {
        self.read()?
            .forms
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn create_form(&self, mut form: FormDefinition) -> StoreResult<FormId> {
        validate(&form)?;
        let mut inner = self.write()?;

        inner.last_id += 1;
        let id = inner.last_id;
        form.id = Some(id);
        if form.is_active().is_none() {
            form.set_active(true);
        }
        inner.forms.insert(id, form);

        tracing::debug!(form_id = id, "live form created");
        Ok(id)
    }

    fn update_form(&self, id: FormId, mut form: FormDefinition) -> StoreResult<FormId> {
        validate(&form)?;
        let mut inner = self.write()?;

        let existing = inner.forms.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        form.id = Some(id);
        if form.is_active().is_none() {
            form.set_active(existing.is_active().unwrap_or(true));
        }
        *existing = form;

        tracing::debug!(form_id = id, "live form updated");
        Ok(id)
    }
}
