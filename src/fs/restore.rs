//! Restore and removal primitives used by the undo interpreter.
use std::path::Path;

use crate::types::errors::is_not_found;
use crate::types::plan::FileKind;

use super::meta::{fsync_parent_dir, kind_of, set_mode, set_owner_numeric};
use super::preserve::{discard_preserved, read_sidecar};

/// Move a preserved copy back to `target`, reinstating recorded attributes,
/// and clear the preserve entry.
///
/// When no preserved copy exists: error, unless `best_effort` is set (no-op).
pub fn restore_file(preserved: &Path, target: &Path, best_effort: bool) -> std::io::Result<()> {
    let sc = match read_sidecar(preserved) {
        Ok(sc) => sc,
        Err(e) if is_not_found(&e) && best_effort => return Ok(()),
        Err(e) => return Err(e),
    };

    // Whatever the failed create left behind goes first.
    remove_path(target)?;
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match sc.prior_kind {
        FileKind::Symlink => {
            let dest = sc.link_dest.as_deref().ok_or_else(|| {
                std::io::Error::other("sidecar for symlink lacks link_dest")
            })?;
            std::os::unix::fs::symlink(dest, target)?;
        }
        FileKind::File => {
            // Same filesystem in the common case; fall back to copy across devices.
            if std::fs::rename(preserved, target).is_err() {
                std::fs::copy(preserved, target)?;
            }
            if let Some(mode_s) = sc.mode.as_deref() {
                if let Ok(m) = u32::from_str_radix(mode_s, 8) {
                    set_mode(target, m)?;
                }
            }
            if let (Some(uid), Some(gid)) = (sc.uid, sc.gid) {
                // Non-root restores may lack chown rights; attributes beat aborting.
                let _ = set_owner_numeric(target, uid, gid);
            }
        }
        other => {
            return Err(std::io::Error::other(format!(
                "cannot restore node of kind {}",
                other.as_str()
            )));
        }
    }
    fsync_parent_dir(target);
    discard_preserved(preserved)
}

/// Remove whatever is at `target`. Idempotent: an absent target is success.
/// Directories are removed recursively (undo of a created directory takes its
/// contents with it).
pub fn remove_path(target: &Path) -> std::io::Result<()> {
    match kind_of(target) {
        FileKind::Missing => Ok(()),
        FileKind::Directory => match std::fs::remove_dir_all(target) {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(e),
        },
        _ => match std::fs::remove_file(target) {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::preserve::{preserve_target, preserved_path, sidecar_path};

    #[test]
    fn remove_path_is_idempotent() {
        let td = tempfile::tempdir().unwrap();
        let gone = td.path().join("never-existed");
        remove_path(&gone).unwrap();
        remove_path(&gone).unwrap();
    }

    #[test]
    fn restore_reinstates_content_and_clears_preserve() {
        let td = tempfile::tempdir().unwrap();
        let root = td.path().join("preserve");
        let target = td.path().join("app");
        std::fs::write(&target, b"original").unwrap();
        crate::fs::meta::set_mode(&target, 0o750).unwrap();

        let preserved = preserve_target(&root, &target, true, false).unwrap();
        std::fs::write(&target, b"overwritten").unwrap();

        restore_file(&preserved, &target, false).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"original");
        assert_eq!(crate::fs::meta::mode_of(&target), Some(0o750));
        assert!(!preserved.exists());
        assert!(!sidecar_path(&preserved).exists());
    }

    #[test]
    fn restore_without_preserved_copy_errors_unless_best_effort() {
        let td = tempfile::tempdir().unwrap();
        let root = td.path().join("preserve");
        let target = td.path().join("app");
        let preserved = preserved_path(&root, &target);
        assert!(restore_file(&preserved, &target, false).is_err());
        restore_file(&preserved, &target, true).unwrap();
    }
}
