//! Policy governs remove compatibility, restore behavior, and run hygiene.
use crate::types::plan::FileKind;

/// Compatibility policy for unconditional `Remove` actions.
///
/// Conditional removes always carry their own allow-list; plain removes are
/// policy-driven because the intended check is a site decision, not a
/// property of the action kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RemoveCompat {
    /// Remove whatever is at the target path.
    #[default]
    Always,
    /// Remove only when the on-disk kind is one of these.
    MatchKinds(Vec<FileKind>),
}

#[derive(Clone, Debug)]
pub struct Policy {
    /// Compatibility check applied to plain `Remove` actions.
    pub remove_compat: RemoveCompat,
    /// Treat a missing preserved copy during restore as a no-op instead of
    /// an error.
    pub best_effort_restore: bool,
    /// Keep the run log file after a clean run.
    pub keep_log: bool,
    /// Record a SHA-256 of each preserved payload in its sidecar.
    pub preserve_payload_hash: bool,
    /// fsync preserved payloads and parent directories.
    pub durability: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            remove_compat: RemoveCompat::Always,
            best_effort_restore: false,
            keep_log: false,
            preserve_payload_hash: true,
            durability: true,
        }
    }
}

impl Policy {
    /// Hardened defaults for unattended production installs: logs are kept
    /// and restores never silently no-op.
    #[must_use]
    pub fn production_preset() -> Self {
        Self {
            keep_log: true,
            best_effort_restore: false,
            ..Self::default()
        }
    }
}
