//! Keep-flag semantics: an existing compatible target short-circuits the
//! mutation entirely; a missing target is always created.
mod common;

use common::{ctx_with_top, RecordingOs, TestEmitter};
use roundhouse::actions::{ActionEngine, Outcome};
use roundhouse::logging::{AuditCtx, AuditMode, StageLogger};
use roundhouse::policy::Policy;
use roundhouse::types::ids::plan_id;
use roundhouse::types::plan::{Action, ActionKind, InstallPlan};

fn engine_for(actions: Vec<Action>) -> (ActionEngine, uuid::Uuid) {
    let plan = InstallPlan {
        actions: actions.clone(),
        services: Vec::new(),
    };
    (ActionEngine::new(actions), plan_id(&plan))
}

#[test]
fn keep_skips_mutation_when_compatible_target_exists() {
    let td = tempfile::tempdir().unwrap();
    let ctx = ctx_with_top(td.path());
    let target = td.path().join("bin/app");
    std::fs::create_dir_all(target.parent().unwrap()).unwrap();
    std::fs::write(&target, b"existing").unwrap();

    let src = td.path().join("payload");
    std::fs::write(&src, b"new bits").unwrap();

    let mut act = Action::new(ActionKind::Install, "bin/app");
    act.source = Some(src);
    act.keep = true;

    let (mut engine, pid) = engine_for(vec![act]);
    let facts = TestEmitter::default();
    let tctx = AuditCtx::new(&facts, pid.to_string(), "r".into(), "ts".into(), AuditMode::default());
    let slog = StageLogger::new(&tctx);
    let os = RecordingOs::default();

    let outcome = engine
        .create_one(0, &ctx, &os, &Policy::default(), &slog, &pid, false)
        .unwrap();
    assert_eq!(outcome, Outcome::Kept);
    assert_eq!(std::fs::read(&target).unwrap(), b"existing");
    assert!(!engine.has_journal());
}

#[test]
fn keep_does_not_prevent_creation_of_missing_target() {
    let td = tempfile::tempdir().unwrap();
    let ctx = ctx_with_top(td.path());
    let src = td.path().join("payload");
    std::fs::write(&src, b"new bits").unwrap();

    let mut act = Action::new(ActionKind::Install, "bin/app");
    act.source = Some(src);
    act.keep = true;

    let (mut engine, pid) = engine_for(vec![act]);
    let facts = TestEmitter::default();
    let tctx = AuditCtx::new(&facts, pid.to_string(), "r".into(), "ts".into(), AuditMode::default());
    let slog = StageLogger::new(&tctx);
    let os = RecordingOs::default();

    let outcome = engine
        .create_one(0, &ctx, &os, &Policy::default(), &slog, &pid, false)
        .unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(std::fs::read(td.path().join("bin/app")).unwrap(), b"new bits");
}

#[test]
fn keep_with_incompatible_kind_still_replaces() {
    // A directory where Install expects a file is not compatible; the
    // existing node is preserved and replaced.
    let td = tempfile::tempdir().unwrap();
    let ctx = ctx_with_top(td.path());
    let target = td.path().join("bin/app");
    std::fs::create_dir_all(&target).unwrap();

    let src = td.path().join("payload");
    std::fs::write(&src, b"new bits").unwrap();

    let mut act = Action::new(ActionKind::Install, "bin/app");
    act.source = Some(src);
    act.keep = true;

    let (mut engine, pid) = engine_for(vec![act]);
    let facts = TestEmitter::default();
    let tctx = AuditCtx::new(&facts, pid.to_string(), "r".into(), "ts".into(), AuditMode::default());
    let slog = StageLogger::new(&tctx);
    let os = RecordingOs::default();

    // A pre-existing directory target cannot be preserved as a file payload;
    // the engine surfaces that rather than silently losing data.
    let result = engine.create_one(0, &ctx, &os, &Policy::default(), &slog, &pid, false);
    assert!(result.is_err());
}
