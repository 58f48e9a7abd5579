//! Preserve-before-overwrite invariant and the install/reinstall scenario:
//! a pre-existing target is stashed at the deterministic preservation path
//! before overwrite, and undo restores it and clears the stash.
mod common;

use common::{ctx_with_top, RecordingOs, TestEmitter};
use roundhouse::actions::ActionEngine;
use roundhouse::fs::preserve::preserved_path;
use roundhouse::logging::{AuditCtx, AuditMode, StageLogger};
use roundhouse::policy::Policy;
use roundhouse::types::ids::plan_id;
use roundhouse::types::plan::{Action, ActionKind, InstallPlan};

#[test]
fn fresh_target_gets_remove_undo_and_no_preserve_entry() {
    let td = tempfile::tempdir().unwrap();
    let ctx = ctx_with_top(td.path());
    let src = td.path().join("build-app");
    std::fs::write(&src, b"v1").unwrap();

    let mut act = Action::new(ActionKind::Install, "bin/app");
    act.source = Some(src);
    act.mode = Some(0o755);

    let actions = vec![act];
    let pid = plan_id(&InstallPlan {
        actions: actions.clone(),
        services: Vec::new(),
    });
    let mut engine = ActionEngine::new(actions);
    let facts = TestEmitter::default();
    let tctx = AuditCtx::new(&facts, pid.to_string(), "r".into(), "ts".into(), AuditMode::default());
    let slog = StageLogger::new(&tctx);
    let os = RecordingOs::default();
    let policy = Policy::default();

    engine.create_all(&ctx, &os, &policy, &slog, &pid, false).unwrap();

    let target = td.path().join("bin/app");
    assert_eq!(std::fs::read(&target).unwrap(), b"v1");
    assert_eq!(roundhouse::fs::meta::mode_of(&target), Some(0o755));
    // Target did not pre-exist: nothing was preserved.
    let preserved = preserved_path(&ctx.preserve_root().unwrap(), &target);
    assert!(!preserved.exists());

    // Undo of a fresh create removes the target outright.
    let errors = engine.undo_all(&policy, &slog);
    assert!(errors.is_empty());
    assert!(!target.exists());
}

#[test]
fn reinstall_preserves_then_undo_restores_original() {
    let td = tempfile::tempdir().unwrap();
    let ctx = ctx_with_top(td.path());
    let target = td.path().join("bin/app");
    std::fs::create_dir_all(target.parent().unwrap()).unwrap();
    std::fs::write(&target, b"v1 original").unwrap();
    roundhouse::fs::meta::set_mode(&target, 0o750).unwrap();

    let src = td.path().join("build-app");
    std::fs::write(&src, b"v2 payload").unwrap();

    let mut act = Action::new(ActionKind::Install, "bin/app");
    act.source = Some(src);
    act.mode = Some(0o755);

    let actions = vec![act];
    let pid = plan_id(&InstallPlan {
        actions: actions.clone(),
        services: Vec::new(),
    });
    let mut engine = ActionEngine::new(actions);
    let facts = TestEmitter::default();
    let tctx = AuditCtx::new(&facts, pid.to_string(), "r".into(), "ts".into(), AuditMode::default());
    let slog = StageLogger::new(&tctx);
    let os = RecordingOs::default();
    let policy = Policy::default();

    engine.create_all(&ctx, &os, &policy, &slog, &pid, false).unwrap();

    // Overwritten in place, original stashed at the deterministic path.
    assert_eq!(std::fs::read(&target).unwrap(), b"v2 payload");
    let preserved = preserved_path(&ctx.preserve_root().unwrap(), &target);
    assert_eq!(std::fs::read(&preserved).unwrap(), b"v1 original");

    // Rollback restores content and attributes, and empties the stash.
    let errors = engine.undo_all(&policy, &slog);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(std::fs::read(&target).unwrap(), b"v1 original");
    assert_eq!(roundhouse::fs::meta::mode_of(&target), Some(0o750));
    assert!(!preserved.exists());
}

#[test]
fn expand_into_existing_directory_is_undoable() {
    let td = tempfile::tempdir().unwrap();
    let ctx = ctx_with_top(td.path());

    // A real archive, built out-of-band.
    let staging = td.path().join("staging");
    std::fs::create_dir_all(&staging).unwrap();
    std::fs::write(staging.join("payload.txt"), b"archived").unwrap();
    let archive = td.path().join("bundle.tar");
    let status = std::process::Command::new("tar")
        .args(["-cf"])
        .arg(&archive)
        .arg("-C")
        .arg(&staging)
        .arg("payload.txt")
        .status()
        .unwrap();
    assert!(status.success());

    // The destination directory already exists, as it does on a re-install.
    let dest = td.path().join("data");
    std::fs::create_dir_all(&dest).unwrap();
    roundhouse::fs::meta::set_mode(&dest, 0o700).unwrap();
    std::fs::write(dest.join("pre-existing"), b"keep").unwrap();

    let mut act = Action::new(ActionKind::Expand, "data");
    act.source = Some(archive);
    act.mode = Some(0o755);

    let actions = vec![act];
    let pid = plan_id(&InstallPlan {
        actions: actions.clone(),
        services: Vec::new(),
    });
    let mut engine = ActionEngine::new(actions);
    let facts = TestEmitter::default();
    let tctx = AuditCtx::new(&facts, pid.to_string(), "r".into(), "ts".into(), AuditMode::default());
    let slog = StageLogger::new(&tctx);
    let os = RecordingOs::default();
    let policy = Policy::default();

    engine.create_all(&ctx, &os, &policy, &slog, &pid, false).unwrap();
    assert_eq!(std::fs::read(dest.join("payload.txt")).unwrap(), b"archived");
    assert_eq!(roundhouse::fs::meta::mode_of(&dest), Some(0o755));

    // Undo restores the directory's attributes; contents were never captured.
    let errors = engine.undo_all(&policy, &slog);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(roundhouse::fs::meta::mode_of(&dest), Some(0o700));
    assert_eq!(std::fs::read(dest.join("pre-existing")).unwrap(), b"keep");
}

#[test]
fn directory_undo_restores_attributes_not_contents() {
    let td = tempfile::tempdir().unwrap();
    let ctx = ctx_with_top(td.path());
    let dir = td.path().join("var");
    std::fs::create_dir_all(&dir).unwrap();
    roundhouse::fs::meta::set_mode(&dir, 0o700).unwrap();
    std::fs::write(dir.join("data"), b"user data").unwrap();

    let mut act = Action::new(ActionKind::Directory, "var");
    act.mode = Some(0o755);

    let actions = vec![act];
    let pid = plan_id(&InstallPlan {
        actions: actions.clone(),
        services: Vec::new(),
    });
    let mut engine = ActionEngine::new(actions);
    let facts = TestEmitter::default();
    let tctx = AuditCtx::new(&facts, pid.to_string(), "r".into(), "ts".into(), AuditMode::default());
    let slog = StageLogger::new(&tctx);
    let os = RecordingOs::default();
    let policy = Policy::default();

    engine.create_all(&ctx, &os, &policy, &slog, &pid, false).unwrap();
    assert_eq!(roundhouse::fs::meta::mode_of(&dir), Some(0o755));

    let errors = engine.undo_all(&policy, &slog);
    assert!(errors.is_empty());
    // Mode came back; the pre-existing contents were never touched.
    assert_eq!(roundhouse::fs::meta::mode_of(&dir), Some(0o700));
    assert_eq!(std::fs::read(dir.join("data")).unwrap(), b"user data");
}
