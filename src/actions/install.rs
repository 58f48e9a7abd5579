//! Install-kind target creation: copy, with member-wise merge for `ar` archives.
use std::path::Path;
use std::process::Command;

use crate::fs::restore::remove_path;
use crate::types::errors::{Error, Result};

/// Copy `source` to `target`. When both are static `ar` archives the source's
/// members are folded into the existing target instead of replacing it.
pub fn make_target(source: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if is_ar_archive(source) && is_ar_archive(target) && target.exists() {
        return merge_archives(source, target);
    }
    remove_path(target)?;
    std::fs::copy(source, target)?;
    Ok(())
}

fn is_ar_archive(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "a")
}

/// Extract the source archive's members into a scratch directory, then
/// re-add them to the target archive.
fn merge_archives(source: &Path, target: &Path) -> Result<()> {
    let scratch = scratch_dir_for(target);
    remove_path(&scratch)?;
    std::fs::create_dir_all(&scratch)?;
    let result = (|| -> Result<()> {
        run_ar(&["x", &source.to_string_lossy()], &scratch)?;
        let mut members: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(&scratch)? {
            members.push(entry?.file_name().to_string_lossy().into_owned());
        }
        members.sort();
        if members.is_empty() {
            return Ok(());
        }
        let mut args: Vec<String> = vec!["r".into(), target.to_string_lossy().into_owned()];
        args.extend(members);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        run_ar(&arg_refs, &scratch)
    })();
    let _ = std::fs::remove_dir_all(&scratch);
    result
}

fn scratch_dir_for(target: &Path) -> std::path::PathBuf {
    let mut s = target.as_os_str().to_os_string();
    s.push(".merge.tmp");
    std::path::PathBuf::from(s)
}

fn run_ar(args: &[&str], cwd: &Path) -> Result<()> {
    let out = Command::new("ar")
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| Error::Os(format!("ar: {e}")))?;
    if out.status.success() {
        Ok(())
    } else {
        Err(Error::Os(format!(
            "ar {} exited with {}: {}",
            args.join(" "),
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_copy_replaces_target() {
        let td = tempfile::tempdir().unwrap();
        let src = td.path().join("src");
        let dst = td.path().join("sub/dst");
        std::fs::write(&src, b"new").unwrap();
        make_target(&src, &dst).unwrap();
        assert_eq!(std::fs::read(&dst).unwrap(), b"new");

        std::fs::write(&src, b"newer").unwrap();
        make_target(&src, &dst).unwrap();
        assert_eq!(std::fs::read(&dst).unwrap(), b"newer");
    }

    #[test]
    fn copy_replaces_existing_symlink_not_its_referent() {
        let td = tempfile::tempdir().unwrap();
        let src = td.path().join("src");
        let other = td.path().join("other");
        let dst = td.path().join("dst");
        std::fs::write(&src, b"new").unwrap();
        std::fs::write(&other, b"keep").unwrap();
        std::os::unix::fs::symlink(&other, &dst).unwrap();
        make_target(&src, &dst).unwrap();
        assert_eq!(std::fs::read(&other).unwrap(), b"keep");
        assert!(std::fs::symlink_metadata(&dst).unwrap().file_type().is_file());
    }
}
