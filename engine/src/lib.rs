//! # Formsync Engine
//!
//! Keeps form definitions in a live form store and JSON files on disk in step.
//!
//! The live store identifies forms by numeric id; files are identified by a
//! stable string key kept inside each form's settings block. The engine
//! matches the two sides by key and uses the `modified` timestamp in that
//! block to detect drift.
//!
//! ## Design Principles
//!
//! - **Stateless**: every call reconciles the two stores fresh; nothing is cached
//! - **Key matching only**: live and file forms are paired by key, never by id or title
//! - **Value-level errors**: every failure is a [`Error`] returned to the caller
//! - **Pluggable**: hosts extend behaviour through [`Hooks`] and [`PermissionGate`] checks
//!
//! ## Core Concepts
//!
//! ### Forms
//!
//! A [`FormDefinition`] is opaque apart from its `id`, `title` and the
//! [`SyncSettings`] block (`enabled`, `key`, `modified`). Forms with sync
//! disabled take no part in any operation.
//!
//! ### Stores
//!
//! - [`FormStore`] - the live side (list / get / create / update)
//! - [`FileRepository`] - one `<key>.json` file per form under the save point
//!
//! ### Sync
//!
//! The [`SyncEngine`] exports live forms to files, imports new file forms and
//! updates live forms whose file copy has drifted. Listing produces one
//! [`SyncRecord`] per key with its [`SyncState`] and suggested [`SyncAction`].
//!
//! ## Quick Start
//!
//! ```rust
//! use formsync_engine::{
//!     FixedClock, FormStore, Hooks, MemoryFormStore, PermissionGate, SyncConfig, SyncEngine,
//!     SyncState,
//! };
//! use serde_json::json;
//!
//! let dir = std::env::temp_dir().join(format!("formsync-doc-{}", std::process::id()));
//! std::fs::create_dir_all(&dir).unwrap();
//!
//! // 1. Compose the engine
//! let store = MemoryFormStore::new();
//! let config = SyncConfig::default().with_save_point(&dir);
//! let engine = SyncEngine::new(store, config, PermissionGate::default(), Hooks::new())
//!     .with_clock(FixedClock::new(1_000));
//!
//! // 2. Create a live form with sync enabled and export it
//! let form = serde_json::from_value(json!({
//!     "title": "Contact",
//!     "local_json_for_gravity_forms": {"enabled": true, "key": "local_gf_contact"}
//! }))
//! .unwrap();
//! let id = engine.store().create_form(form).unwrap();
//! let written = engine.on_form_saved(id).unwrap();
//! assert!(written.is_some());
//!
//! // 3. Both sides now agree
//! let records = engine.records().unwrap();
//! assert_eq!(records[0].state(), SyncState::InSyncSame);
//! # std::fs::remove_dir_all(&dir).unwrap();
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod form;
pub mod format;
pub mod hooks;
pub mod permissions;
pub mod repository;
pub mod settings;
pub mod store;
pub mod sync;

// Re-export main types at crate root
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{SyncConfig, DEFAULT_KEY_PREFIX, DEFAULT_SAVE_POINT_DIR};
pub use error::{Error, PermissionError, StoreError};
pub use form::{FormDefinition, SyncSettings, SETTINGS_BLOCK};
pub use format::FormFile;
pub use hooks::{ApplyEvent, Hooks, SaveEvent};
pub use permissions::{PermissionGate, Verdict};
pub use repository::FileRepository;
pub use store::{FormStore, MemoryFormStore, StoreResult};
pub use sync::{
    can_import, can_sync, FormStatus, LiveForms, SavePointStatus, SyncAction, SyncEngine,
    SyncRecord, SyncState,
};

/// Type aliases for clarity
pub type FormId = u64;
pub type FormKey = String;
/// Seconds since the Unix epoch.
pub type Timestamp = i64;
