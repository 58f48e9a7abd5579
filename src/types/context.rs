//! The shared installation context.
//!
//! Every task and action receives this struct by reference; there is no
//! class-level or process-global installation state. Actions are inert until
//! resolved against a context, because a fileset's top directory is only
//! known once installation parameters are set.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::constants::{METAINF_DIR, PRESERVE_DIR, PROPERTIES_FILE, TOKEN_INSTALLATION_TOP, TOKEN_TOP};

use super::errors::Result;
use super::plan::Action;
use super::safepath::SafePath;

/// Per-fileset overrides for the installation top and ownership defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fileset {
    pub top: Option<PathBuf>,
    pub user: Option<String>,
    pub group: Option<String>,
}

/// Process-wide installation parameters, passed explicitly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstallationContext {
    /// The installation root. `None` means no top is configured and every
    /// create becomes a no-op (the context is inert).
    pub top: Option<PathBuf>,
    pub user: String,
    pub group: String,
    pub product: String,
    pub package: String,
    pub version: String,
    /// Free-form key/value parameters, including answers collected by
    /// interactive query tasks.
    pub parameters: BTreeMap<String, String>,
    /// Fileset name -> overrides. Actions with an unknown fileset use the
    /// context-level top/user/group.
    pub filesets: BTreeMap<String, Fileset>,
}

impl InstallationContext {
    /// Effective top directory for an action's fileset, if any is configured.
    #[must_use]
    pub fn top_for(&self, fileset: &str) -> Option<&Path> {
        self.filesets
            .get(fileset)
            .and_then(|f| f.top.as_deref())
            .or(self.top.as_deref())
    }

    /// Effective owner for an action: declared > fileset > context.
    #[must_use]
    pub fn owner_for(&self, action: &Action) -> String {
        action
            .owner
            .clone()
            .or_else(|| self.filesets.get(&action.fileset).and_then(|f| f.user.clone()))
            .unwrap_or_else(|| self.user.clone())
    }

    /// Effective group for an action: declared > fileset > context.
    #[must_use]
    pub fn group_for(&self, action: &Action) -> String {
        action
            .group
            .clone()
            .or_else(|| self.filesets.get(&action.fileset).and_then(|f| f.group.clone()))
            .unwrap_or_else(|| self.group.clone())
    }

    /// Resolve an action's declared target against its fileset top.
    /// Returns `None` when no top is configured (inert context).
    pub fn resolve_target(&self, action: &Action) -> Option<Result<SafePath>> {
        let top = self.top_for(&action.fileset)?;
        Some(SafePath::from_rooted(top, &action.target))
    }

    /// Metadata directory for this installation (`<top>/.meta-inf`).
    #[must_use]
    pub fn metadata_dir(&self) -> Option<PathBuf> {
        self.top.as_ref().map(|t| t.join(METAINF_DIR))
    }

    /// Root of the preserve tree (`<top>/.meta-inf/preserve`).
    #[must_use]
    pub fn preserve_root(&self) -> Option<PathBuf> {
        self.metadata_dir().map(|m| m.join(PRESERVE_DIR))
    }

    /// Path of the persisted properties document.
    #[must_use]
    pub fn properties_path(&self) -> Option<PathBuf> {
        self.metadata_dir().map(|m| m.join(PROPERTIES_FILE))
    }

    /// Substitute installation tokens in declarative text (symlink sources,
    /// generated content). Unknown tokens pass through untouched.
    #[must_use]
    pub fn substitute_tokens(&self, text: &str) -> String {
        let top = self
            .top
            .as_ref()
            .map(|t| t.to_string_lossy().into_owned())
            .unwrap_or_default();
        text.replace(TOKEN_INSTALLATION_TOP, &top)
            .replace(TOKEN_TOP, &top)
    }
}
