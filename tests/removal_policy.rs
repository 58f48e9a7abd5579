//! Removal-pass policy: conditional removes honor their allow-list, plain
//! removes honor the site policy, and non-removable targets are left alone.
mod common;

use common::{ctx_with_top, TestEmitter};
use roundhouse::actions::ActionEngine;
use roundhouse::logging::{AuditCtx, AuditMode, StageLogger};
use roundhouse::policy::{Policy, RemoveCompat};
use roundhouse::types::ids::plan_id;
use roundhouse::types::plan::{Action, ActionKind, FileKind, InstallPlan};

fn removal_pass(actions: Vec<Action>, ctx: &roundhouse::types::context::InstallationContext, policy: &Policy) -> Vec<String> {
    let pid = plan_id(&InstallPlan {
        actions: actions.clone(),
        services: Vec::new(),
    });
    let engine = ActionEngine::new(actions);
    let facts = TestEmitter::default();
    let tctx = AuditCtx::new(&facts, pid.to_string(), "r".into(), "ts".into(), AuditMode::default());
    let slog = StageLogger::new(&tctx);
    engine.remove_all(ctx, policy, &slog, &pid)
}

#[test]
fn conditional_remove_honors_the_allow_list() {
    let td = tempfile::tempdir().unwrap();
    let ctx = ctx_with_top(td.path());
    std::fs::write(td.path().join("a-file"), b"x").unwrap();
    std::fs::create_dir(td.path().join("a-dir")).unwrap();

    let actions = vec![
        Action::new(
            ActionKind::ConditionalRemove {
                allowed: vec![FileKind::File],
            },
            "a-file",
        ),
        Action::new(
            ActionKind::ConditionalRemove {
                allowed: vec![FileKind::File],
            },
            "a-dir",
        ),
    ];
    let errors = removal_pass(actions, &ctx, &Policy::default());
    assert!(errors.is_empty());
    assert!(!td.path().join("a-file").exists());
    // The directory is not in the allow-list, so it survives.
    assert!(td.path().join("a-dir").is_dir());
}

#[test]
fn plain_remove_follows_the_site_policy() {
    let td = tempfile::tempdir().unwrap();
    let ctx = ctx_with_top(td.path());
    std::fs::write(td.path().join("stale"), b"x").unwrap();

    let kinds_only_symlinks = Policy {
        remove_compat: RemoveCompat::MatchKinds(vec![FileKind::Symlink]),
        ..Policy::default()
    };
    let errors = removal_pass(
        vec![Action::new(ActionKind::Remove, "stale")],
        &ctx,
        &kinds_only_symlinks,
    );
    assert!(errors.is_empty());
    assert!(td.path().join("stale").is_file());

    // The default policy removes whatever is there.
    let errors = removal_pass(
        vec![Action::new(ActionKind::Remove, "stale")],
        &ctx,
        &Policy::default(),
    );
    assert!(errors.is_empty());
    assert!(!td.path().join("stale").exists());
}

#[test]
fn non_removable_targets_survive_the_pass() {
    let td = tempfile::tempdir().unwrap();
    let ctx = ctx_with_top(td.path());
    std::fs::write(td.path().join("keep-me"), b"x").unwrap();

    let mut act = Action::new(ActionKind::Install, "keep-me");
    act.removable = false;
    let errors = removal_pass(vec![act], &ctx, &Policy::default());
    assert!(errors.is_empty());
    assert!(td.path().join("keep-me").is_file());
}

#[test]
fn missing_targets_and_populated_directories_are_not_failures() {
    let td = tempfile::tempdir().unwrap();
    let ctx = ctx_with_top(td.path());
    let dir = td.path().join("shared");
    std::fs::create_dir(&dir).unwrap();
    std::fs::write(dir.join("other-owner"), b"x").unwrap();

    let actions = vec![
        Action::new(ActionKind::Remove, "never-existed"),
        Action::new(ActionKind::Directory, "shared"),
    ];
    let errors = removal_pass(actions, &ctx, &Policy::default());
    assert!(errors.is_empty());
    // A populated directory is someone else's too; it stays.
    assert!(dir.join("other-owner").is_file());
}
