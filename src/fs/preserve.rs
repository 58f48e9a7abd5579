//! Preserve-before-overwrite storage.
//!
//! Originals about to be overwritten are stashed under a preserve root that
//! mirrors their absolute paths, one copy per original (idempotent). A JSON
//! sidecar next to each payload records the prior kind, mode, ownership, and
//! optionally a payload hash, so a later restore can reinstate attributes as
//! well as bytes.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{SIDECAR_SCHEMA_V1, SIDECAR_SCHEMA_V2, SIDECAR_SUFFIX};
use crate::types::errors::is_not_found;
use crate::types::plan::FileKind;

use super::meta::{fsync_parent_dir, kind_of, mode_of, owner_of, sha256_hex_of};

/// Metadata recorded alongside each preserved payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreserveSidecar {
    pub schema: String,
    pub prior_kind: FileKind,
    /// Octal string, e.g. "755".
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub uid: Option<u32>,
    #[serde(default)]
    pub gid: Option<u32>,
    /// Symlink destination when the prior node was a symlink.
    #[serde(default)]
    pub link_dest: Option<String>,
    #[serde(default)]
    pub payload_hash: Option<String>,
}

/// Deterministic location of the preserved copy for `target`: the preserve
/// root joined with the target's absolute path, leading separator stripped.
#[must_use]
pub fn preserved_path(preserve_root: &Path, target: &Path) -> PathBuf {
    let mut rel = PathBuf::new();
    for comp in target.components() {
        if let std::path::Component::Normal(p) = comp {
            rel.push(p);
        }
    }
    preserve_root.join(rel)
}

#[must_use]
pub fn sidecar_path(preserved: &Path) -> PathBuf {
    let mut s = preserved.as_os_str().to_os_string();
    s.push(SIDECAR_SUFFIX);
    PathBuf::from(s)
}

/// Whether a preserved copy for `target` already exists.
#[must_use]
pub fn is_preserved(preserve_root: &Path, target: &Path) -> bool {
    sidecar_path(&preserved_path(preserve_root, target)).exists()
}

pub fn write_sidecar(preserved: &Path, sc: &PreserveSidecar) -> std::io::Result<()> {
    let body = serde_json::to_vec_pretty(sc)
        .map_err(|e| std::io::Error::other(format!("sidecar serialize: {e}")))?;
    std::fs::write(sidecar_path(preserved), body)
}

pub fn read_sidecar(preserved: &Path) -> std::io::Result<PreserveSidecar> {
    let body = std::fs::read(sidecar_path(preserved))?;
    serde_json::from_slice(&body)
        .map_err(|e| std::io::Error::other(format!("sidecar parse: {e}")))
}

/// Stash the current node at `target` under the preserve root.
///
/// Idempotent: when a preserved copy already exists for this path the call is
/// a no-op and returns the existing payload location. Files are copied with
/// their mode/ownership captured in the sidecar; symlinks are re-created as
/// symlinks with their destination recorded.
pub fn preserve_target(
    preserve_root: &Path,
    target: &Path,
    hash_payload: bool,
    durable: bool,
) -> std::io::Result<PathBuf> {
    let preserved = preserved_path(preserve_root, target);
    if sidecar_path(&preserved).exists() {
        return Ok(preserved);
    }
    if let Some(parent) = preserved.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let kind = kind_of(target);
    match kind {
        FileKind::Symlink => {
            let dest = std::fs::read_link(target)?;
            let _ = std::fs::remove_file(&preserved);
            std::os::unix::fs::symlink(&dest, &preserved)?;
            let sc = PreserveSidecar {
                schema: SIDECAR_SCHEMA_V1.to_string(),
                prior_kind: FileKind::Symlink,
                mode: None,
                uid: None,
                gid: None,
                link_dest: Some(dest.to_string_lossy().into_owned()),
                payload_hash: None,
            };
            write_sidecar(&preserved, &sc)?;
        }
        FileKind::File => {
            std::fs::copy(target, &preserved)?;
            if durable {
                if let Ok(f) = std::fs::File::open(&preserved) {
                    let _ = f.sync_all();
                }
            }
            let payload_hash = if hash_payload {
                sha256_hex_of(&preserved)
            } else {
                None
            };
            let (uid, gid) = owner_of(target).map_or((None, None), |(u, g)| (Some(u), Some(g)));
            let sc = PreserveSidecar {
                schema: if payload_hash.is_some() {
                    SIDECAR_SCHEMA_V2.to_string()
                } else {
                    SIDECAR_SCHEMA_V1.to_string()
                },
                prior_kind: FileKind::File,
                mode: mode_of(target).map(|m| format!("{m:o}")),
                uid,
                gid,
                link_dest: None,
                payload_hash,
            };
            write_sidecar(&preserved, &sc)?;
        }
        FileKind::Missing => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "nothing to preserve",
            ));
        }
        other => {
            return Err(std::io::Error::other(format!(
                "cannot preserve node of kind {}",
                other.as_str()
            )));
        }
    }
    if durable {
        fsync_parent_dir(&preserved);
    }
    Ok(preserved)
}

/// Drop a single preserved entry (payload + sidecar). Missing entries are fine.
pub fn discard_preserved(preserved: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(preserved) {
        Ok(()) => {}
        Err(e) if is_not_found(&e) => {}
        Err(e) => return Err(e),
    }
    match std::fs::remove_file(sidecar_path(preserved)) {
        Ok(()) => Ok(()),
        Err(e) if is_not_found(&e) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Delete the whole preserve tree at the end of a run. The tree is owned by
/// the current run, so an absent tree is success.
pub fn remove_preserve_root(preserve_root: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(preserve_root) {
        Ok(()) => Ok(()),
        Err(e) if is_not_found(&e) => Ok(()),
        Err(e) => Err(e),
    }
}
