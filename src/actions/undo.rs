//! Compensating operations.
//!
//! Undo operations form a small closed set executed by one interpreter. They
//! are computed at mutation time and are never themselves undoable, so undo
//! chains cannot recurse.
use std::path::PathBuf;

use crate::fs::meta::{set_mode, set_owner_numeric};
use crate::fs::restore::{remove_path, restore_file};
use crate::policy::Policy;
use crate::types::errors::Result;

/// One compensating step, recorded before its action mutates the filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UndoOp {
    /// Delete a target the action newly created.
    RemovePath { target: PathBuf },
    /// Move a preserved copy back over the target.
    RestoreFile {
        preserved: PathBuf,
        target: PathBuf,
    },
    /// The target directory pre-existed: reinstate its attributes only, not
    /// its contents.
    RestoreDirectory {
        target: PathBuf,
        mode: Option<u32>,
        uid: u32,
        gid: u32,
    },
    NoOp,
}

impl UndoOp {
    /// Short label for facts and log lines.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            UndoOp::RemovePath { .. } => "remove",
            UndoOp::RestoreFile { .. } => "restore",
            UndoOp::RestoreDirectory { .. } => "restore-directory",
            UndoOp::NoOp => "noop",
        }
    }
}

/// Execute one undo operation.
pub fn run_undo(op: &UndoOp, policy: &Policy) -> Result<()> {
    match op {
        UndoOp::RemovePath { target } => {
            remove_path(target)?;
            Ok(())
        }
        UndoOp::RestoreFile { preserved, target } => {
            restore_file(preserved, target, policy.best_effort_restore)?;
            Ok(())
        }
        UndoOp::RestoreDirectory { target, mode, uid, gid } => {
            std::fs::create_dir_all(target)?;
            if let Some(m) = mode {
                set_mode(target, *m)?;
            }
            // Ownership restore needs privileges we may not have.
            let _ = set_owner_numeric(target, *uid, *gid);
            Ok(())
        }
        UndoOp::NoOp => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_undo_deletes_created_target() {
        let td = tempfile::tempdir().unwrap();
        let target = td.path().join("made");
        std::fs::write(&target, b"x").unwrap();
        run_undo(
            &UndoOp::RemovePath { target: target.clone() },
            &Policy::default(),
        )
        .unwrap();
        assert!(!target.exists());
    }

    #[test]
    fn restore_directory_reinstates_mode() {
        let td = tempfile::tempdir().unwrap();
        let target = td.path().join("d");
        std::fs::create_dir(&target).unwrap();
        let (uid, gid) = crate::fs::meta::owner_of(&target).unwrap();
        crate::fs::meta::set_mode(&target, 0o700).unwrap();
        run_undo(
            &UndoOp::RestoreDirectory {
                target: target.clone(),
                mode: Some(0o755),
                uid,
                gid,
            },
            &Policy::default(),
        )
        .unwrap();
        assert_eq!(crate::fs::meta::mode_of(&target), Some(0o755));
    }
}
