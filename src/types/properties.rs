//! Persisted installation properties.
//!
//! Written before the first mutation of an install run, so a later `remove`
//! invocation (a fresh process) can reconstruct the same addressing
//! information the install run had. Actions are transient and are never
//! persisted; only enough context to rebuild task execution is.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::context::{Fileset, InstallationContext};
use super::errors::{Error, Result};
use super::plan::Action;

/// Persisted per-fileset overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesetProperties {
    #[serde(default)]
    pub top: Option<PathBuf>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

/// The serialized record of an installation.
///
/// Round-trip invariant: `store` then `load` in a fresh process reproduces
/// identical top/user/group/parameters/filesets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub installation_top: Option<PathBuf>,
    pub installation_user: String,
    pub installation_group: String,
    #[serde(default)]
    pub installation_parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub installation_filesets: BTreeMap<String, FilesetProperties>,
    /// Cleared before persisting; carried only within a process.
    #[serde(skip)]
    pub installation_actions: Vec<Action>,
}

/// Parameter keys used to carry package identity through the properties map.
const PARAM_PRODUCT: &str = "product";
const PARAM_PACKAGE: &str = "package";
const PARAM_VERSION: &str = "version";

impl Properties {
    /// Capture the persistable portion of a context.
    #[must_use]
    pub fn from_context(ctx: &InstallationContext) -> Self {
        let mut parameters = ctx.parameters.clone();
        parameters.insert(PARAM_PRODUCT.into(), ctx.product.clone());
        parameters.insert(PARAM_PACKAGE.into(), ctx.package.clone());
        parameters.insert(PARAM_VERSION.into(), ctx.version.clone());
        let installation_filesets = ctx
            .filesets
            .iter()
            .map(|(name, f)| {
                (
                    name.clone(),
                    FilesetProperties {
                        top: f.top.clone(),
                        user: f.user.clone(),
                        group: f.group.clone(),
                    },
                )
            })
            .collect();
        Self {
            installation_top: ctx.top.clone(),
            installation_user: ctx.user.clone(),
            installation_group: ctx.group.clone(),
            installation_parameters: parameters,
            installation_filesets,
            installation_actions: Vec::new(),
        }
    }

    /// Rebuild an installation context from persisted state.
    #[must_use]
    pub fn into_context(self) -> InstallationContext {
        let mut parameters = self.installation_parameters;
        let product = parameters.remove(PARAM_PRODUCT).unwrap_or_default();
        let package = parameters.remove(PARAM_PACKAGE).unwrap_or_default();
        let version = parameters.remove(PARAM_VERSION).unwrap_or_default();
        let filesets = self
            .installation_filesets
            .into_iter()
            .map(|(name, f)| {
                (
                    name,
                    Fileset {
                        top: f.top,
                        user: f.user,
                        group: f.group,
                    },
                )
            })
            .collect();
        InstallationContext {
            top: self.installation_top,
            user: self.installation_user,
            group: self.installation_group,
            product,
            package,
            version,
            parameters,
            filesets,
        }
    }

    /// Serialize to `path` as pretty JSON, creating parent directories and
    /// syncing the file before returning.
    pub fn store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(self)
            .map_err(|e| Error::Config(format!("properties serialize: {e}")))?;
        std::fs::write(path, body)?;
        let f = std::fs::File::open(path)?;
        f.sync_all()?;
        Ok(())
    }

    /// Load a previously stored properties document.
    pub fn load(path: &Path) -> Result<Self> {
        let body = std::fs::read(path)?;
        serde_json::from_slice(&body)
            .map_err(|e| Error::Config(format!("properties parse {}: {e}", path.display())))
    }
}
