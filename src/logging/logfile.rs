//! Per-run append-only log file.
//!
//! One file per install/remove run, named `<kind>-<package>-<version>-<ts>.log`
//! under the package metadata directory. When that directory is not writable
//! the log is relocated to the system temp directory. The file is removed at
//! the end of a clean run unless the keep-log policy flag is set.
use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::Level;

use super::facts::AuditSink;
use super::redact::now_iso;
use crate::types::report::RunKind;

pub struct RunLog {
    path: PathBuf,
    file: RefCell<File>,
}

impl RunLog {
    /// Open a fresh run log under `dir`, falling back to the system temp
    /// directory when `dir` cannot be created or written.
    pub fn create(kind: RunKind, package: &str, version: &str, dir: &Path) -> std::io::Result<Self> {
        let ts = now_iso().replace(':', "-");
        let name = format!("{}-{package}-{version}-{ts}.log", kind.as_str());
        let mut path = match std::fs::create_dir_all(dir) {
            Ok(()) => dir.join(&name),
            Err(_) => std::env::temp_dir().join(&name),
        };
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(f) => f,
            Err(_) => {
                // Metadata dir exists but is not writable for us; relocate.
                let alt = std::env::temp_dir().join(&name);
                let f = OpenOptions::new().create(true).append(true).open(&alt)?;
                path = alt;
                f
            }
        };
        Ok(Self {
            path,
            file: RefCell::new(file),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close out the run. The log is deleted after a clean run unless `keep`
    /// is set; failed runs always leave it behind for inspection.
    pub fn finish(self, success: bool, keep: bool) -> Option<PathBuf> {
        drop(self.file);
        if success && !keep {
            let _ = std::fs::remove_file(&self.path);
            None
        } else {
            Some(self.path)
        }
    }
}

impl AuditSink for RunLog {
    fn log(&self, level: Level, msg: &str) {
        let mut f = self.file.borrow_mut();
        let _ = writeln!(f, "{} {level:5} {msg}", now_iso());
    }
}
