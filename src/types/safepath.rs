use std::path::{Component, Path, PathBuf};

use super::errors::{Error, Result};

/// Data-only type for safe path handling.
///
/// Every action target resolves through a `SafePath` rooted at a fileset's
/// installation top, guaranteeing that no declared target can escape the top
/// via absolute-path tricks or `..` components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafePath {
    /// The root this path is confined to (the installation top).
    root: PathBuf,
    /// The relative component beneath the root.
    rel: PathBuf,
}

impl SafePath {
    /// Validate `candidate` against `root` and produce a `SafePath`.
    ///
    /// Absolute candidates must lie within `root`; relative candidates are
    /// interpreted beneath it. `..` components are rejected outright.
    pub fn from_rooted(root: &Path, candidate: &Path) -> Result<Self> {
        if !root.is_absolute() {
            return Err(Error::Path("root must be absolute".into()));
        }
        let effective = if candidate.is_absolute() {
            match candidate.strip_prefix(root) {
                Ok(p) => p.to_path_buf(),
                Err(_) => return Err(Error::Path("path escapes installation top".into())),
            }
        } else {
            candidate.to_path_buf()
        };

        let mut rel = PathBuf::new();
        for seg in effective.components() {
            match seg {
                Component::CurDir => {}
                Component::Normal(p) => rel.push(p),
                Component::ParentDir => return Err(Error::Path("dotdot".into())),
                _ => return Err(Error::Path("unsupported component".into())),
            }
        }
        Ok(SafePath {
            root: root.to_path_buf(),
            rel,
        })
    }

    /// The full path: root joined with the relative component.
    #[must_use]
    pub fn as_path(&self) -> PathBuf {
        self.root.join(&self.rel)
    }

    /// The relative component beneath the root.
    #[must_use]
    pub fn rel(&self) -> &Path {
        &self.rel
    }

    /// The confining root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}
