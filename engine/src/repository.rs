//! The file side: one `<key>.json` per form under the save point.

use crate::{
    error::Result, settings, Error, FormDefinition, FormFile, Hooks, PermissionGate, SyncConfig,
};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Reads and writes form files under a save point directory.
#[derive(Debug)]
pub struct FileRepository {
    save_point: PathBuf,
    key_prefix: String,
    gate: PermissionGate,
}

impl FileRepository {
    /// Resolve the save point and key prefix from `config`, letting the
    /// `save-point` and `key-prefix` hooks override both.
    pub fn new(config: &SyncConfig, hooks: &Hooks, gate: PermissionGate) -> Self {
        let save_point = hooks.save_point(config.save_point.clone());
        let key_prefix = hooks.key_prefix(config.key_prefix.clone());
        tracing::debug!(
            path = %save_point.display(),
            prefix = %key_prefix,
            "file repository ready"
        );
        Self {
            save_point,
            key_prefix,
            gate,
        }
    }

    pub fn save_point_path(&self) -> &Path {
        &self.save_point
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    /// `<save point>/<key>.json`. Keys that could escape the save point are
    /// rejected.
    pub fn path_for_key(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.save_point.join(format!("{}.{}", key, EXTENSION)))
    }

    /// Read the form stored under `key`.
    pub fn read(&self, key: &str) -> Result<FormDefinition> {
        self.read_file(key).map(|file| file.form)
    }

    /// Read the whole file stored under `key`, envelope included.
    ///
    /// The read chain of the gate runs first and its failure is returned
    /// unchanged.
    pub fn read_file(&self, key: &str) -> Result<FormFile> {
        let path = self.path_for_key(key)?;
        self.gate.check_read(&path)?;

        let contents = fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => Error::FileNotFound {
                key: key.to_string(),
                path: path.clone(),
            },
            _ => Error::Unreadable {
                path: path.clone(),
                message: err.to_string(),
            },
        })?;

        let file = FormFile::from_json(&contents, &path)?;
        if settings::is_enabled(&file.form) && settings::get_key(&file.form).is_none() {
            return Err(Error::MissingKey { path });
        }
        Ok(file)
    }

    /// Write `contents` to the file for `key`, returning the bytes written.
    ///
    /// Contents go to a hidden temp file in the save point first and are then
    /// renamed over the target, so readers never see a partial file.
    pub fn write(&self, key: &str, contents: &str) -> Result<usize> {
        let path = self.path_for_key(key)?;
        if contents.is_empty() {
            return Err(Error::WriteFailed {
                path,
                message: "no bytes written".to_string(),
            });
        }

        let tmp_path = self
            .save_point
            .join(format!(".{}-{}.tmp", key, uuid::Uuid::new_v4().simple()));
        let failed = |err: std::io::Error| Error::WriteFailed {
            path: path.clone(),
            message: err.to_string(),
        };

        fs::write(&tmp_path, contents).map_err(failed)?;
        if let Err(err) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(failed(err));
        }

        tracing::debug!(key, path = %path.display(), bytes = contents.len(), "form file written");
        Ok(contents.len())
    }

    /// Every parseable form file under the save point whose name carries the
    /// key prefix, in file name order.
    ///
    /// A missing save point lists as empty. Files that fail to read or parse
    /// are logged and skipped.
    pub fn list_all(&self) -> Result<Vec<FormDefinition>> {
        let entries = match fs::read_dir(&self.save_point) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.save_point.display(), "save point missing, nothing to list");
                return Ok(Vec::new());
            }
            Err(_) if self.save_point.exists() && !self.save_point.is_dir() => {
                tracing::debug!(path = %self.save_point.display(), "save point is not a directory, nothing to list");
                return Ok(Vec::new());
            }
            Err(err) => {
                return Err(Error::Unreadable {
                    path: self.save_point.clone(),
                    message: err.to_string(),
                })
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| self.is_form_file(path))
            .collect();
        paths.sort();

        let mut forms = Vec::with_capacity(paths.len());
        for path in paths {
            let parsed = fs::read_to_string(&path)
                .map_err(|err| Error::Unreadable {
                    path: path.clone(),
                    message: err.to_string(),
                })
                .and_then(|contents| FormFile::from_json(&contents, &path));

            match parsed {
                Ok(file) => forms.push(file.form),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable form file");
                }
            }
        }
        Ok(forms)
    }

    fn is_form_file(&self, path: &Path) -> bool {
        let named = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(&self.key_prefix));
        let json = path.extension().is_some_and(|ext| ext == EXTENSION);
        named && json && path.is_file()
    }
}

/// Keys become file names, so they must be a single plain path component.
pub fn validate_key(key: &str) -> Result<()> {
    let invalid = key.is_empty()
        || key.starts_with('.')
        || key.contains("..")
        || key.contains(['/', '\\', '\0']);
    if invalid {
        Err(Error::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}
