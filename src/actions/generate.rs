//! Generate- and touch-kind target creation.
use std::path::Path;

use crate::types::context::InstallationContext;
use crate::types::errors::Result;

/// Write token-substituted text as the target's content.
pub fn make_generated(ctx: &InstallationContext, text: &str, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(target, ctx.substitute_tokens(text))?;
    Ok(())
}

/// A zero-output generator: read the existing content and rewrite it
/// unchanged. Forces a fresh timestamp and lets the engine re-apply
/// ownership and permissions without a content change. A missing target
/// becomes an empty file.
pub fn make_touched(target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let existing = match std::fs::read(target) {
        Ok(bytes) => bytes,
        Err(e) if crate::types::errors::is_not_found(&e) => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    std::fs::write(target, existing)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_substitutes_tokens() {
        let td = tempfile::tempdir().unwrap();
        let ctx = InstallationContext {
            top: Some(td.path().to_path_buf()),
            ..Default::default()
        };
        let target = td.path().join("app.conf");
        make_generated(&ctx, "home=@installation_top@\n", &target).unwrap();
        let body = std::fs::read_to_string(&target).unwrap();
        assert_eq!(body, format!("home={}\n", td.path().display()));
    }

    #[test]
    fn touch_preserves_content() {
        let td = tempfile::tempdir().unwrap();
        let target = td.path().join("data");
        std::fs::write(&target, b"payload").unwrap();
        make_touched(&target).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"payload");
    }

    #[test]
    fn touch_creates_missing_target_empty() {
        let td = tempfile::tempdir().unwrap();
        let target = td.path().join("new");
        make_touched(&target).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"");
    }
}
