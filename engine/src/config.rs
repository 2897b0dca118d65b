//! Engine configuration.

use std::path::{Path, PathBuf};

/// Directory name of the default save point, relative to the base directory.
pub const DEFAULT_SAVE_POINT_DIR: &str = "gravity-forms-json";

/// Prefix of generated form keys.
pub const DEFAULT_KEY_PREFIX: &str = "local_gf_";

/// Where files live and how keys are minted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Directory holding one `<key>.json` per form
    pub save_point: PathBuf,
    /// Prefix for generated keys; also filters which files are listed
    pub key_prefix: String,
    /// Written to the `version` field of every exported file
    pub exporter_version: String,
}

impl SyncConfig {
    /// Config rooted at `base_dir`, with the save point at its default name.
    pub fn for_base_dir(base_dir: impl AsRef<Path>) -> Self {
        Self {
            save_point: base_dir.as_ref().join(DEFAULT_SAVE_POINT_DIR),
            ..Self::default()
        }
    }

    pub fn with_save_point(mut self, save_point: impl Into<PathBuf>) -> Self {
        self.save_point = save_point.into();
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_exporter_version(mut self, version: impl Into<String>) -> Self {
        self.exporter_version = version.into();
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            save_point: PathBuf::from(".").join(DEFAULT_SAVE_POINT_DIR),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            exporter_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
