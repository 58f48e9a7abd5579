//! Filesystem metadata helpers: node classification, mode/ownership probes
//! and application, and durability syncs.
//!
//! These are conservative and non-mutating except for the explicit setters.
use std::path::Path;

use rustix::fs::{Gid, Mode, Uid};
use sha2::{Digest, Sha256};

use crate::types::plan::FileKind;

/// Classify the filesystem node at `path` without following symlinks.
#[must_use]
pub fn kind_of(path: &Path) -> FileKind {
    match std::fs::symlink_metadata(path) {
        Ok(md) => {
            let ft = md.file_type();
            if ft.is_symlink() {
                FileKind::Symlink
            } else if ft.is_file() {
                FileKind::File
            } else if ft.is_dir() {
                FileKind::Directory
            } else {
                FileKind::Unknown
            }
        }
        Err(_) => FileKind::Missing,
    }
}

/// Compute SHA-256 of a file at `path`, returning a lowercase hex string.
#[must_use]
pub fn sha256_hex_of(path: &Path) -> Option<String> {
    let mut f = std::fs::File::open(path).ok()?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut f, &mut hasher).ok()?;
    Some(hex::encode(hasher.finalize()))
}

/// Permission bits of the node at `path` (no symlink follow).
#[must_use]
pub fn mode_of(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::symlink_metadata(path)
        .ok()
        .map(|md| md.permissions().mode() & 0o7777)
}

/// Numeric owner of the node at `path` (no symlink follow).
#[must_use]
pub fn owner_of(path: &Path) -> Option<(u32, u32)> {
    use std::os::unix::fs::MetadataExt;
    std::fs::symlink_metadata(path).ok().map(|md| (md.uid(), md.gid()))
}

/// Apply permission bits to `path`.
pub fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    rustix::fs::chmod(path, Mode::from_bits_truncate(mode)).map_err(std::io::Error::from)
}

/// Apply a numeric owner/group to `path`. Used when restoring captured
/// attributes; name-based ownership goes through the OS driver.
pub fn set_owner_numeric(path: &Path, uid: u32, gid: u32) -> std::io::Result<()> {
    rustix::fs::chown(path, Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid)))
        .map_err(std::io::Error::from)
}

/// Best-effort fsync of the parent directory of `path`.
pub fn fsync_parent_dir(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Ok(f) = std::fs::File::open(parent) {
            let _ = f.sync_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_of_distinguishes_nodes() {
        let td = tempfile::tempdir().unwrap();
        let f = td.path().join("f");
        std::fs::write(&f, b"x").unwrap();
        let d = td.path().join("d");
        std::fs::create_dir(&d).unwrap();
        let l = td.path().join("l");
        std::os::unix::fs::symlink(&f, &l).unwrap();
        assert_eq!(kind_of(&f), FileKind::File);
        assert_eq!(kind_of(&d), FileKind::Directory);
        assert_eq!(kind_of(&l), FileKind::Symlink);
        assert_eq!(kind_of(&td.path().join("absent")), FileKind::Missing);
    }

    #[test]
    fn set_owner_numeric_accepts_current_owner() {
        let td = tempfile::tempdir().unwrap();
        let f = td.path().join("f");
        std::fs::write(&f, b"x").unwrap();
        let (uid, gid) = owner_of(&f).unwrap();
        set_owner_numeric(&f, uid, gid).unwrap();
        assert_eq!(owner_of(&f), Some((uid, gid)));
    }

    #[test]
    fn set_mode_round_trips() {
        let td = tempfile::tempdir().unwrap();
        let f = td.path().join("f");
        std::fs::write(&f, b"x").unwrap();
        set_mode(&f, 0o751).unwrap();
        assert_eq!(mode_of(&f), Some(0o751));
    }
}
