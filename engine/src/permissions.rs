//! Permission checks run before touching the save point.
//!
//! The gate holds two ordered chains: write checks run against the save point
//! directory before an export, read checks run against a form file before it
//! is read. A chain stops at the first failing check and returns that failure
//! unchanged. Hosts append their own checks (quota, ownership, ...) after the
//! defaults.

use crate::{error::Result, Error, PermissionError};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Outcome of a single check or a whole chain.
pub type Verdict = Result<()>;

type Check = Box<dyn Fn(&Path) -> Verdict + Send + Sync>;

struct NamedCheck {
    name: String,
    check: Check,
}

/// Ordered read and write check chains.
pub struct PermissionGate {
    write_checks: Vec<NamedCheck>,
    read_checks: Vec<NamedCheck>,
}

impl std::fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGate")
            .field("write_checks", &self.write_check_names())
            .field("read_checks", &self.read_check_names())
            .finish()
    }
}

impl Default for PermissionGate {
    /// Directory-exists then writable for writes; readable for reads.
    fn default() -> Self {
        Self::empty()
            .with_write_check("directory-exists", directory_exists)
            .with_write_check("directory-writable", directory_writable)
            .with_read_check("file-readable", file_readable)
    }
}

impl PermissionGate {
    /// A gate with no checks; everything passes.
    pub fn empty() -> Self {
        Self {
            write_checks: Vec::new(),
            read_checks: Vec::new(),
        }
    }

    /// Append a check to the write chain.
    pub fn with_write_check(
        mut self,
        name: impl Into<String>,
        check: impl Fn(&Path) -> Verdict + Send + Sync + 'static,
    ) -> Self {
        self.write_checks.push(NamedCheck {
            name: name.into(),
            check: Box::new(check),
        });
        self
    }

    /// Append a check to the read chain.
    pub fn with_read_check(
        mut self,
        name: impl Into<String>,
        check: impl Fn(&Path) -> Verdict + Send + Sync + 'static,
    ) -> Self {
        self.read_checks.push(NamedCheck {
            name: name.into(),
            check: Box::new(check),
        });
        self
    }

    /// Run the write chain against the save point directory.
    pub fn check_write(&self, save_point: &Path) -> Verdict {
        run_chain(&self.write_checks, save_point)
    }

    /// Run the read chain against a form file.
    pub fn check_read(&self, file: &Path) -> Verdict {
        run_chain(&self.read_checks, file)
    }

    pub fn write_check_names(&self) -> Vec<&str> {
        self.write_checks.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn read_check_names(&self) -> Vec<&str> {
        self.read_checks.iter().map(|c| c.name.as_str()).collect()
    }
}

fn run_chain(checks: &[NamedCheck], path: &Path) -> Verdict {
    for named in checks {
        if let Err(err) = (named.check)(path) {
            tracing::debug!(
                check = %named.name,
                path = %path.display(),
                error = %err,
                "permission check failed"
            );
            return Err(err);
        }
    }
    Ok(())
}

/// The save point must exist and be a directory.
pub fn directory_exists(path: &Path) -> Verdict {
    if path.is_dir() {
        Ok(())
    } else {
        Err(PermissionError::NotADirectory(path.to_path_buf()).into())
    }
}

/// The save point must accept new files.
///
/// Probes by creating and removing a hidden file, since mode bits say nothing
/// about ACLs, read-only mounts or the effective user.
pub fn directory_writable(path: &Path) -> Verdict {
    let probe = path.join(format!(".formsync-probe-{}", uuid::Uuid::new_v4().simple()));
    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe)
    {
        Ok(_) => {
            if let Err(err) = fs::remove_file(&probe) {
                tracing::warn!(path = %probe.display(), error = %err, "could not remove write probe");
            }
            Ok(())
        }
        Err(_) => Err(PermissionError::NotWritable(path.to_path_buf()).into()),
    }
}

/// A form file must exist and open for reading.
pub fn file_readable(path: &Path) -> Verdict {
    match fs::metadata(path) {
        Err(err) if err.kind() == ErrorKind::NotFound => Err(Error::FileNotFound {
            key: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
        }),
        Ok(meta) if meta.is_file() && fs::File::open(path).is_ok() => Ok(()),
        _ => Err(PermissionError::NotReadable(path.to_path_buf()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn default_chain_order() {
        let gate = PermissionGate::default();
        assert_eq!(
            gate.write_check_names(),
            vec!["directory-exists", "directory-writable"]
        );
        assert_eq!(gate.read_check_names(), vec!["file-readable"]);
    }

    #[test]
    fn writable_directory_passes() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(PermissionGate::default().check_write(dir.path()), Ok(()));
        // probe is cleaned up
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_directory_fails_first_check() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(
            PermissionGate::default().check_write(&missing),
            Err(Error::Permission(PermissionError::NotADirectory(missing)))
        );
    }

    #[test]
    fn regular_file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            PermissionGate::default().check_write(&file),
            Err(Error::Permission(PermissionError::NotADirectory(_)))
        ));
    }

    #[test]
    fn writable_probe_fails_inside_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert_eq!(
            directory_writable(&file),
            Err(Error::Permission(PermissionError::NotWritable(file)))
        );
    }

    #[test]
    fn chain_stops_at_first_failure() {
        let reached = Arc::new(AtomicBool::new(false));
        let flag = reached.clone();
        let gate = PermissionGate::default().with_write_check("quota", move |_| {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        let dir = tempfile::tempdir().unwrap();
        assert!(gate.check_write(&dir.path().join("missing")).is_err());
        assert!(!reached.load(Ordering::SeqCst));

        assert!(gate.check_write(dir.path()).is_ok());
        assert!(reached.load(Ordering::SeqCst));
    }

    #[test]
    fn appended_check_can_reject() {
        let gate = PermissionGate::default().with_write_check("quota", |path| {
            Err(PermissionError::Rejected {
                path: path.to_path_buf(),
                reason: "disk quota exceeded".into(),
            }
            .into())
        });
        let dir = tempfile::tempdir().unwrap();
        let err = gate.check_write(dir.path()).unwrap_err();
        assert_eq!(
            err,
            Error::Permission(PermissionError::Rejected {
                path: dir.path().to_path_buf(),
                reason: "disk quota exceeded".into(),
            })
        );
    }

    #[test]
    fn readable_file_passes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("local_gf_a.json");
        fs::write(&file, "[]").unwrap();
        assert_eq!(file_readable(&file), Ok(()));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("local_gf_a.json");
        assert_eq!(
            file_readable(&file),
            Err(Error::FileNotFound {
                key: "local_gf_a".into(),
                path: file,
            })
        );
    }

    #[test]
    fn directory_is_not_readable_as_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("local_gf_a.json");
        fs::create_dir(&file).unwrap();
        assert_eq!(
            file_readable(&file),
            Err(Error::Permission(PermissionError::NotReadable(file)))
        );
    }

    #[test]
    fn empty_gate_passes_everything() {
        let gate = PermissionGate::empty();
        assert_eq!(gate.check_write(Path::new("/definitely/missing")), Ok(()));
        assert_eq!(gate.check_read(Path::new("/definitely/missing.json")), Ok(()));
    }
}
