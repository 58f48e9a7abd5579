//! Default `OsDriver` backed by standard Unix administration commands.
//!
//! Each operation is a synchronous child process; stderr is folded into the
//! error message on a non-zero exit. Free space uses `statvfs` directly
//! rather than parsing `df` output.
use std::path::Path;
use std::process::Command;

use super::OsDriver;
use crate::types::errors::{Error, Result};

#[derive(Clone, Copy, Debug, Default)]
pub struct ShellOsDriver;

fn run(cmd: &str, args: &[&str]) -> Result<()> {
    let out = Command::new(cmd)
        .args(args)
        .output()
        .map_err(|e| Error::Os(format!("{cmd}: {e}")))?;
    if out.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&out.stderr);
        Err(Error::Os(format!(
            "{cmd} {} exited with {}: {}",
            args.join(" "),
            out.status,
            stderr.trim()
        )))
    }
}

fn probe(cmd: &str, args: &[&str]) -> bool {
    Command::new(cmd)
        .args(args)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

impl OsDriver for ShellOsDriver {
    fn add_user(&self, user: &str, group: &str, home: &Path) -> Result<()> {
        run(
            "useradd",
            &["-g", group, "-d", &home.to_string_lossy(), user],
        )
    }

    fn remove_user(&self, user: &str) -> Result<()> {
        run("userdel", &[user])
    }

    fn add_group(&self, group: &str) -> Result<()> {
        run("groupadd", &[group])
    }

    fn remove_group(&self, group: &str) -> Result<()> {
        run("groupdel", &[group])
    }

    fn user_exists(&self, user: &str) -> bool {
        probe("id", &["-u", user])
    }

    fn group_exists(&self, group: &str) -> bool {
        probe("getent", &["group", group])
    }

    fn free_space(&self, path: &Path) -> Result<u64> {
        let vfs = rustix::fs::statvfs(path).map_err(|e| Error::Io(e.into()))?;
        Ok(vfs.f_bavail.saturating_mul(vfs.f_frsize))
    }

    fn platform(&self) -> String {
        format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
    }

    fn chown(&self, path: &Path, user: &str, group: &str) -> Result<()> {
        run(
            "chown",
            &[&format!("{user}:{group}"), &path.to_string_lossy()],
        )
    }
}
