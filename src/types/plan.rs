//! Declarative plan types: actions, service calls, and the install plan.
//!
//! A plan is produced by the configuration loader (an external collaborator)
//! and consumed by the engine. Actions are inert data here; they acquire
//! meaning only when resolved against an [`InstallationContext`](super::context::InstallationContext).
use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Execution mode for an install run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ApplyMode {
    /// Resolve, check, and emit facts without mutating the filesystem.
    #[default]
    DryRun,
    /// Perform the mutations.
    Commit,
}

/// Classification of an on-disk filesystem node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
    Symlink,
    Missing,
    Unknown,
}

impl FileKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::File => "file",
            FileKind::Directory => "directory",
            FileKind::Symlink => "symlink",
            FileKind::Missing => "missing",
            FileKind::Unknown => "unknown",
        }
    }
}

/// The operation an action performs against its target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Copy `source` to the target. Existing `ar` archives are merged member-wise.
    Install,
    /// Create a symlink at the target. `link_source` undergoes token
    /// substitution (`@top@`, `@installation_top@`) before linking.
    Symlink { link_source: String },
    /// Create the target directory (and parents).
    Directory,
    /// Remove the target during a removal pass. Creates nothing.
    Remove,
    /// Remove the target only when its current on-disk kind is in `allowed`.
    ConditionalRemove { allowed: Vec<FileKind> },
    /// Expand an archive `source` into the target directory by piping it
    /// through a command chain derived from its extension suffixes.
    Expand,
    /// Write `text` (after token substitution) as the target's content.
    Generate { text: String },
    /// Read the target's existing content and rewrite it unchanged, forcing
    /// timestamp/ownership re-application without a content change.
    Touch,
}

/// A single declared, reversible filesystem mutation.
///
/// `target` is relative to the owning fileset's top (absolute targets are
/// accepted when they already lie beneath it). `source` is absolute, resolved
/// by the configuration loader against its base directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub target: PathBuf,
    #[serde(default)]
    pub source: Option<PathBuf>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub mode: Option<u32>,
    /// Skip creation when a compatible target already exists.
    #[serde(default)]
    pub keep: bool,
    /// Whether a removal pass may delete this target.
    #[serde(default = "default_true")]
    pub removable: bool,
    /// Name of the fileset this action belongs to, for top/owner lookup.
    #[serde(default)]
    pub fileset: String,
}

fn default_true() -> bool {
    true
}

impl Action {
    /// Minimal constructor; attributes default to unset, `removable` to true.
    #[must_use]
    pub fn new(kind: ActionKind, target: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            target: target.into(),
            source: None,
            owner: None,
            group: None,
            mode: None,
            keep: false,
            removable: true,
            fileset: String::new(),
        }
    }

    /// On-disk kinds considered compatible for the `keep` short-circuit.
    /// An existing target of a compatible kind satisfies the action without
    /// any mutation when `keep` is set.
    #[must_use]
    pub fn compatible_kinds(&self) -> &'static [FileKind] {
        match self.kind {
            ActionKind::Install | ActionKind::Touch | ActionKind::Generate { .. } => {
                &[FileKind::File]
            }
            ActionKind::Directory | ActionKind::Expand => &[FileKind::Directory],
            ActionKind::Symlink { .. } => &[FileKind::Symlink],
            ActionKind::Remove | ActionKind::ConditionalRemove { .. } => &[],
        }
    }

    /// Whether `create` computes an undo action before mutating.
    /// Remove-type actions mutate nothing at create time.
    #[must_use]
    pub fn is_undoable(&self) -> bool {
        !matches!(
            self.kind,
            ActionKind::Remove | ActionKind::ConditionalRemove { .. }
        )
    }
}

/// One configured service invocation: a name plus free-form parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCall {
    pub service: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl ServiceCall {
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Raw plan input from the configuration loader.
#[derive(Clone, Debug, Default)]
pub struct PlanInput {
    pub actions: Vec<Action>,
    pub services: Vec<ServiceCall>,
}

/// An ordered list of actions plus an ordered list of service calls.
/// Both execute strictly in declared order.
#[derive(Clone, Debug, Default)]
pub struct InstallPlan {
    pub actions: Vec<Action>,
    pub services: Vec<ServiceCall>,
}
