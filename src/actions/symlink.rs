//! Symlink-kind target creation.
use std::path::Path;

use crate::fs::meta::fsync_parent_dir;
use crate::fs::restore::remove_path;
use crate::types::context::InstallationContext;
use crate::types::errors::Result;

/// Replace whatever is at `target` with a symlink to the token-substituted
/// `link_source` text.
pub fn make_target(ctx: &InstallationContext, link_source: &str, target: &Path) -> Result<()> {
    let dest = ctx.substitute_tokens(link_source);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    remove_path(target)?;
    std::os::unix::fs::symlink(&dest, target)?;
    fsync_parent_dir(target);
    Ok(())
}
