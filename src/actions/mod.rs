//! The action engine: applies declared mutations in order, journals a
//! compensating [`UndoOp`] per mutation, and can walk the journal backwards
//! to return the filesystem to its prior state.
//!
//! Side-effects:
//! - Emits `apply.attempt`/`apply.result` facts per action and `rollback`
//!   facts per compensating step.
//! - Maintains the preserve tree beneath the installation metadata directory.
pub mod expand;
pub mod generate;
pub mod install;
pub mod symlink;
pub mod undo;

use uuid::Uuid;

use crate::adapters::OsDriver;
use crate::fs::meta::{kind_of, mode_of, owner_of, set_mode};
use crate::fs::preserve::{preserve_target, remove_preserve_root};
use crate::fs::restore::remove_path;
use crate::logging::StageLogger;
use crate::policy::{Policy, RemoveCompat};
use crate::types::context::InstallationContext;
use crate::types::errors::{is_not_found, Error, Result};
use crate::types::ids::action_id;
use crate::types::plan::{Action, ActionKind, FileKind};

use undo::{run_undo, UndoOp};

/// What `create` did for one action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The mutation was performed (or planned, in dry-run).
    Applied,
    /// `keep` was set and a compatible target already existed.
    Kept,
    /// Nothing to do: inert context or a remove-kind action.
    Skipped,
}

#[derive(Debug)]
struct UndoStep {
    index: usize,
    op: UndoOp,
}

/// Per-run mutable state: the pending actions and the undo journal.
pub struct ActionEngine {
    actions: Vec<Action>,
    journal: Vec<UndoStep>,
    applied: usize,
}

impl ActionEngine {
    #[must_use]
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            actions,
            journal: Vec::new(),
            applied: 0,
        }
    }

    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of actions whose `create` completed in this run.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.applied
    }

    #[must_use]
    pub fn has_journal(&self) -> bool {
        !self.journal.is_empty()
    }

    /// Apply every pending action in declared order. Stops at the first
    /// failure; the journal then covers everything applied so far plus the
    /// failing action's partial work.
    pub fn create_all(
        &mut self,
        ctx: &InstallationContext,
        os: &dyn OsDriver,
        policy: &Policy,
        slog: &StageLogger<'_>,
        pid: &Uuid,
        dry: bool,
    ) -> Result<()> {
        for idx in 0..self.actions.len() {
            self.create_one(idx, ctx, os, policy, slog, pid, dry)?;
        }
        Ok(())
    }

    /// Apply one action: keep short-circuit, undo computation (preserving any
    /// pre-existing target first), kind-specific mutation, then declared
    /// mode/ownership.
    pub fn create_one(
        &mut self,
        idx: usize,
        ctx: &InstallationContext,
        os: &dyn OsDriver,
        policy: &Policy,
        slog: &StageLogger<'_>,
        pid: &Uuid,
        dry: bool,
    ) -> Result<Outcome> {
        let act = self.actions[idx].clone();
        let aid = action_id(pid, &act, idx).to_string();

        let Some(resolved) = ctx.resolve_target(&act) else {
            // No installation top configured: the action is inert.
            slog.apply_result()
                .action(aid)
                .field("outcome", "skipped".into())
                .emit_success();
            return Ok(Outcome::Skipped);
        };
        let target = resolved?.as_path();

        slog.apply_attempt()
            .action(aid.clone())
            .path(target.display().to_string())
            .emit_success();

        if !act.is_undoable() {
            // Remove-kind actions create nothing.
            slog.apply_result()
                .action(aid)
                .path(target.display().to_string())
                .field("outcome", "noop".into())
                .emit_success();
            return Ok(Outcome::Skipped);
        }

        let kind_now = kind_of(&target);
        if act.keep && kind_now != FileKind::Missing && act.compatible_kinds().contains(&kind_now) {
            slog.apply_result()
                .action(aid)
                .path(target.display().to_string())
                .field("outcome", "kept".into())
                .emit_success();
            return Ok(Outcome::Kept);
        }

        if dry {
            slog.apply_result()
                .action(aid)
                .path(target.display().to_string())
                .field("outcome", "planned".into())
                .emit_success();
            self.applied += 1;
            return Ok(Outcome::Applied);
        }

        // The undo action is journaled before the mutation so a failing
        // make_target is still walked back.
        let op = self.compute_undo(&act, &target, kind_now, ctx, policy)?;
        self.journal.push(UndoStep { index: idx, op });

        let made = self.make_target(&act, &target, ctx);
        if let Err(e) = made {
            slog.apply_result()
                .action(aid)
                .path(target.display().to_string())
                .field("error", e.to_string().into())
                .emit_failure();
            return Err(e);
        }

        if let Some(mode) = act.mode {
            set_mode(&target, mode)?;
        }
        let owner = ctx.owner_for(&act);
        let group = ctx.group_for(&act);
        if !owner.is_empty() && !group.is_empty() {
            os.chown(&target, &owner, &group)?;
        }

        self.applied += 1;
        slog.apply_result()
            .action(aid)
            .path(target.display().to_string())
            .field("outcome", "applied".into())
            .emit_success();
        Ok(Outcome::Applied)
    }

    fn compute_undo(
        &self,
        act: &Action,
        target: &std::path::Path,
        kind_now: FileKind,
        ctx: &InstallationContext,
        policy: &Policy,
    ) -> Result<UndoOp> {
        if kind_now == FileKind::Missing {
            return Ok(UndoOp::RemovePath {
                target: target.to_path_buf(),
            });
        }
        if kind_now == FileKind::Directory && act.compatible_kinds().contains(&FileKind::Directory) {
            // Directory-targeted kinds (Directory, Expand) over an existing
            // directory: attributes only; the contents were not ours to capture.
            let (uid, gid) = owner_of(target).unwrap_or((0, 0));
            return Ok(UndoOp::RestoreDirectory {
                target: target.to_path_buf(),
                mode: mode_of(target),
                uid,
                gid,
            });
        }
        let preserve_root = ctx
            .preserve_root()
            .ok_or_else(|| Error::Config("no installation top for preserve directory".into()))?;
        let preserved = preserve_target(
            &preserve_root,
            target,
            policy.preserve_payload_hash,
            policy.durability,
        )?;
        Ok(UndoOp::RestoreFile {
            preserved,
            target: target.to_path_buf(),
        })
    }

    fn make_target(
        &self,
        act: &Action,
        target: &std::path::Path,
        ctx: &InstallationContext,
    ) -> Result<()> {
        match &act.kind {
            ActionKind::Install => {
                let source = required_source(act)?;
                install::make_target(source, target)
            }
            ActionKind::Symlink { link_source } => symlink::make_target(ctx, link_source, target),
            ActionKind::Directory => {
                std::fs::create_dir_all(target)?;
                Ok(())
            }
            ActionKind::Expand => {
                let source = required_source(act)?;
                expand::make_target(source, target)
            }
            ActionKind::Generate { text } => generate::make_generated(ctx, text, target),
            ActionKind::Touch => generate::make_touched(target),
            ActionKind::Remove | ActionKind::ConditionalRemove { .. } => Ok(()),
        }
    }

    /// Walk the journal in reverse, executing each compensating operation.
    /// Every step is attempted; failures are collected, not masking earlier
    /// ones. The journal is consumed.
    pub fn undo_all(&mut self, policy: &Policy, slog: &StageLogger<'_>) -> Vec<String> {
        let mut errors = Vec::new();
        while let Some(step) = self.journal.pop() {
            let label = step.op.label();
            match run_undo(&step.op, policy) {
                Ok(()) => {
                    slog.rollback()
                        .field("op", label.into())
                        .field("action_index", step.index.into())
                        .emit_success();
                }
                Err(e) => {
                    errors.push(format!("undo {label} (action {}) failed: {e}", step.index));
                    slog.rollback()
                        .field("op", label.into())
                        .field("action_index", step.index.into())
                        .emit_failure();
                }
            }
        }
        self.applied = 0;
        errors
    }

    /// Removal pass for an explicit `remove` run: walk actions in reverse
    /// declared order deleting removable targets. Missing targets are
    /// success; other failures are collected.
    pub fn remove_all(
        &self,
        ctx: &InstallationContext,
        policy: &Policy,
        slog: &StageLogger<'_>,
        pid: &Uuid,
    ) -> Vec<String> {
        let mut errors = Vec::new();
        for (idx, act) in self.actions.iter().enumerate().rev() {
            let aid = action_id(pid, act, idx).to_string();
            match remove_one(act, ctx, policy) {
                Ok(()) => slog.remove_result().action(aid).emit_success(),
                Err(e) => {
                    errors.push(format!("remove {} failed: {e}", act.target.display()));
                    slog.remove_result().action(aid).emit_failure();
                }
            }
        }
        errors
    }

    /// Delete the preserve tree. Runs at the end of every install, successful
    /// or reverted.
    pub fn cleanup(&self, ctx: &InstallationContext, slog: &StageLogger<'_>) {
        if let Some(root) = ctx.preserve_root() {
            match remove_preserve_root(&root) {
                Ok(()) => slog.cleanup().path(root.display().to_string()).emit_success(),
                Err(_) => slog.cleanup().path(root.display().to_string()).emit_warn(),
            }
        }
    }
}

fn required_source(act: &Action) -> Result<&std::path::Path> {
    act.source
        .as_deref()
        .ok_or_else(|| Error::Config(format!("action for {} lacks a source", act.target.display())))
}

/// Remove a single action's target, honoring the compatibility policy.
fn remove_one(act: &Action, ctx: &InstallationContext, policy: &Policy) -> Result<()> {
    if !act.removable {
        return Ok(());
    }
    let Some(resolved) = ctx.resolve_target(act) else {
        return Ok(());
    };
    let target = resolved?.as_path();
    let kind_now = kind_of(&target);
    if kind_now == FileKind::Missing {
        return Ok(());
    }

    match &act.kind {
        ActionKind::ConditionalRemove { allowed } => {
            if !allowed.contains(&kind_now) {
                return Ok(());
            }
        }
        ActionKind::Remove => {
            if let RemoveCompat::MatchKinds(kinds) = &policy.remove_compat {
                if !kinds.contains(&kind_now) {
                    return Ok(());
                }
            }
        }
        ActionKind::Directory => {
            // Only delete directories we plausibly own outright; a populated
            // directory stays.
            return match std::fs::remove_dir(&target) {
                Ok(()) => Ok(()),
                Err(e) if is_not_found(&e) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::DirectoryNotEmpty => Ok(()),
                Err(e) => Err(e.into()),
            };
        }
        _ => {}
    }
    remove_path(&target)?;
    Ok(())
}
