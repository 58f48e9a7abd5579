//! Remove stage: a standalone reversal pass in a fresh process.
//!
//! The persisted properties document supplies the addressing information the
//! install run had; the configuration loader supplies the action list again.
//! Tasks are reverted in reverse declared order, the package's files are
//! removed, and finally the metadata directory itself is deleted.
use std::path::Path;
use std::time::Instant;

use log::Level;

use crate::actions::ActionEngine;
use crate::logging::{new_run_id, now_iso, AuditCtx, AuditMode, AuditSink, FactsEmitter, RunLog, StageLogger};
use crate::tasks::{TaskEnv, TaskManager};
use crate::types::context::InstallationContext;
use crate::types::errors::{Error, Result};
use crate::types::ids::plan_id;
use crate::types::plan::InstallPlan;
use crate::types::properties::Properties;
use crate::types::report::{RunKind, RunReport};

use super::Installer;

/// Rebuild the installation context persisted under `top`.
pub(crate) fn load_context(top: &Path) -> Result<InstallationContext> {
    let props_path = top.join(crate::constants::METAINF_DIR).join(crate::constants::PROPERTIES_FILE);
    if !props_path.exists() {
        return Err(Error::Config(format!(
            "no installed package found under {}",
            top.display()
        )));
    }
    Ok(Properties::load(&props_path)?.into_context())
}

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Installer<E, A>,
    plan: &InstallPlan,
    top: &Path,
) -> Result<RunReport> {
    let t0 = Instant::now();
    let mut ctx = load_context(top)?;
    let pid = plan_id(plan);
    let tctx = AuditCtx::new(
        &api.facts,
        pid.to_string(),
        new_run_id(),
        now_iso(),
        AuditMode::default(),
    );
    let slog = StageLogger::new(&tctx);
    api.audit.log(Level::Info, "remove: starting");

    let run_log = ctx
        .metadata_dir()
        .map(|meta| RunLog::create(RunKind::Remove, &ctx.package, &ctx.version, &meta))
        .transpose()?;

    let manager = TaskManager::new(&api.registry, &plan.services);
    let mut engine = ActionEngine::new(plan.actions.clone());
    let result = {
        let mut env = TaskEnv {
            ctx: &mut ctx,
            engine: &mut engine,
            os: api.os.as_ref(),
            comm: api.comm.as_ref(),
            policy: &api.policy,
            slog: &slog,
            plan_id: &pid,
            dry: false,
        };
        manager.revert(&mut env)
    };

    let duration_ms = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);
    match result {
        Ok(()) => {
            // The package is gone; its metadata directory goes with it. The
            // run log lives there, so close it out first.
            let log_path = run_log.and_then(|rl| rl.finish(true, api.policy.keep_log));
            if let Some(meta) = ctx.metadata_dir() {
                let _ = std::fs::remove_dir_all(meta);
            }
            api.audit.log(Level::Info, "remove: complete");
            slog.remove_result().emit_success();
            Ok(RunReport {
                kind: RunKind::Remove,
                plan_id: pid,
                executed: 0,
                errors: Vec::new(),
                rollback_errors: Vec::new(),
                rolled_back: false,
                duration_ms,
                log_path: log_path.filter(|p| p.exists()),
            })
        }
        Err(e) => {
            if let Some(rl) = run_log {
                rl.log(Level::Error, &format!("remove failed: {e}"));
                let _ = rl.finish(false, api.policy.keep_log);
            }
            api.audit.log(Level::Error, &format!("remove failed: {e}"));
            slog.remove_result().field("error", e.to_string().into()).emit_failure();
            Err(e)
        }
    }
}
