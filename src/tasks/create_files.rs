//! The file-creation task: drives the action engine over the pending actions.
use std::collections::BTreeMap;

use crate::types::errors::{Error, Result};

use super::{Task, TaskEnv, SERVICE_CREATE_FILES};

/// Applies every pending action in declared order. On revert, walks the undo
/// journal backwards; when no journal exists (a fresh `remove` process) it
/// falls back to the removal pass over the declared actions.
pub struct CreateFiles;

impl Task for CreateFiles {
    fn provides(&self) -> &'static str {
        SERVICE_CREATE_FILES
    }

    fn execute(&mut self, env: &mut TaskEnv<'_>, _params: &BTreeMap<String, String>) -> Result<()> {
        let mut progress = env.comm.progress("installing files");
        let total = env.engine.actions().len();
        for idx in 0..total {
            env.engine
                .create_one(idx, env.ctx, env.os, env.policy, env.slog, env.plan_id, env.dry)?;
            progress.advance();
        }
        progress.done();
        Ok(())
    }

    fn revert(&mut self, env: &mut TaskEnv<'_>, _params: &BTreeMap<String, String>) -> Result<()> {
        let failures = if env.engine.has_journal() {
            env.engine.undo_all(env.policy, env.slog)
        } else {
            env.engine
                .remove_all(env.ctx, env.policy, env.slog, env.plan_id)
        };
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Removal { failures })
        }
    }
}
