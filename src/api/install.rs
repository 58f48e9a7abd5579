//! Install stage: persists properties, executes the configured services
//! through the task manager, and rolls back on any failure.
//!
//! Side-effects:
//! - Writes the properties document before the first mutation.
//! - Opens a per-run log file beneath the metadata directory (Commit only).
//! - Emits facts for plan, properties, task, apply, and rollback stages.
use std::time::Instant;

use log::Level;
use serde_json::json;

use crate::actions::ActionEngine;
use crate::api::errors::{error_id_for, exit_code_for, id_str, rollback_error_id};
use crate::logging::{new_run_id, ts_for_mode, AuditCtx, AuditMode, AuditSink, FactsEmitter, RunLog, StageLogger};
use crate::tasks::{TaskEnv, TaskManager};
use crate::types::context::InstallationContext;
use crate::types::errors::{Error, Result};
use crate::types::ids::plan_id;
use crate::types::plan::{ApplyMode, InstallPlan};
use crate::types::properties::Properties;
use crate::types::report::{RunKind, RunReport};

use super::Installer;

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Installer<E, A>,
    plan: &InstallPlan,
    ctx: &mut InstallationContext,
    mode: ApplyMode,
) -> Result<RunReport> {
    let t0 = Instant::now();
    let dry = matches!(mode, ApplyMode::DryRun);
    let pid = plan_id(plan);
    let run_id = new_run_id();
    let tctx = AuditCtx::new(
        &api.facts,
        pid.to_string(),
        run_id,
        ts_for_mode(mode),
        AuditMode {
            dry_run: dry,
            redact: dry,
        },
    );
    let slog = StageLogger::new(&tctx);

    api.audit.log(Level::Info, "install: starting");
    slog.plan()
        .field("actions", plan.actions.len().into())
        .field("services", plan.services.len().into())
        .emit_success();

    // Fail fast on unresolved services before any persistence or mutation.
    let manager = TaskManager::new(&api.registry, &plan.services);
    manager.resolve_all()?;

    // Run log and persisted properties precede the first mutation, so a
    // later remove run can reconstruct this installation.
    let run_log = if dry {
        None
    } else if let Some(meta) = ctx.metadata_dir() {
        Some(RunLog::create(RunKind::Install, &ctx.package, &ctx.version, &meta)?)
    } else {
        None
    };
    if let Some(rl) = &run_log {
        rl.log(Level::Info, &format!("installing {} {}", ctx.package, ctx.version));
    }
    if !dry {
        if let Some(path) = ctx.properties_path() {
            Properties::from_context(ctx).store(&path)?;
            slog.properties().path(path.display().to_string()).emit_success();
        }
    }

    let mut engine = ActionEngine::new(plan.actions.clone());
    let result = {
        let mut env = TaskEnv {
            ctx,
            engine: &mut engine,
            os: api.os.as_ref(),
            comm: api.comm.as_ref(),
            policy: &api.policy,
            slog: &slog,
            plan_id: &pid,
            dry,
        };
        manager.execute(&mut env, true)
    };

    let duration_ms = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);
    match result {
        Ok(()) => {
            if let Some(rl) = &run_log {
                rl.log(Level::Info, "install: complete");
            }
            let log_path = run_log.and_then(|rl| rl.finish(true, api.policy.keep_log));
            api.audit.log(Level::Info, "install: complete");
            Ok(RunReport {
                kind: RunKind::Install,
                plan_id: pid,
                executed: engine.applied(),
                errors: Vec::new(),
                rollback_errors: Vec::new(),
                rolled_back: false,
                duration_ms,
                log_path,
            })
        }
        Err(e) => {
            let id = error_id_for(&e);
            let mut fields = json!({
                "error_id": id_str(id),
                "exit_code": exit_code_for(id),
                "error": e.to_string(),
                "duration_ms": duration_ms,
            });
            if let Some(rb) = rollback_error_id(&e) {
                fields["rollback_error_id"] = json!(id_str(rb));
            }
            slog.rollback_summary().merge(&fields).emit_failure();

            // A reverted install leaves no trace: the properties document
            // written above goes too. The run log stays for inspection.
            if !dry {
                if let Some(path) = ctx.properties_path() {
                    let _ = std::fs::remove_file(path);
                }
            }
            if let Some(rl) = run_log {
                rl.log(Level::Error, &format!("install failed: {e}"));
                let _ = rl.finish(false, api.policy.keep_log);
            }
            api.audit.log(Level::Error, &format!("install failed: {e}"));
            Err(e)
        }
    }
}

/// Attach rollback context to a report-style summary of a failed run.
/// Used by callers that want counts without re-parsing the error chain.
#[must_use]
pub fn failure_report(plan: &InstallPlan, e: &Error, duration_ms: u64) -> RunReport {
    let rollback_errors = match e {
        Error::Reverted { rollback_errors, .. } => rollback_errors.clone(),
        _ => Vec::new(),
    };
    RunReport {
        kind: RunKind::Install,
        plan_id: plan_id(plan),
        executed: 0,
        errors: vec![e.to_string()],
        rollback_errors,
        rolled_back: matches!(e, Error::Reverted { .. }),
        duration_ms,
        log_path: None,
    }
}
