//! The task manager: sequences service tasks in declared order and drives
//! reverse-order compensation on any failure.
//!
//! Failure semantics:
//! - every configured service must resolve before anything executes;
//! - a task is pushed onto the undo stack before its `execute` runs, so a
//!   task that fails mid-way is included in its own rollback;
//! - reversal errors are collected, never masking the original cause;
//! - the preserve directory is removed at the end regardless of outcome.
use crate::types::errors::{Error, Result};
use crate::types::plan::ServiceCall;

use super::{Task, TaskEnv, TaskRegistry};

pub struct TaskManager<'a> {
    registry: &'a TaskRegistry,
    services: &'a [ServiceCall],
}

impl<'a> TaskManager<'a> {
    #[must_use]
    pub fn new(registry: &'a TaskRegistry, services: &'a [ServiceCall]) -> Self {
        Self { registry, services }
    }

    /// Fail fast: every configured service name must resolve to at least one
    /// registered task before execution begins.
    pub fn resolve_all(&self) -> Result<()> {
        for call in self.services {
            if !self.registry.contains(&call.service) {
                return Err(Error::Config(format!(
                    "no task provides service `{}`",
                    call.service
                )));
            }
        }
        Ok(())
    }

    /// Execute all configured services in declared order. On failure, revert
    /// the undo stack in reverse order (when `perform_undo` is set) and
    /// return the aggregated error.
    pub fn execute(&self, env: &mut TaskEnv<'_>, perform_undo: bool) -> Result<()> {
        let result = self.execute_inner(env, perform_undo);
        env.engine.cleanup(env.ctx, env.slog);
        result
    }

    fn execute_inner(&self, env: &mut TaskEnv<'_>, perform_undo: bool) -> Result<()> {
        self.resolve_all()?;

        let mut undo_stack: Vec<(Box<dyn Task>, &ServiceCall)> = Vec::new();
        let mut original: Option<Error> = None;

        'services: for call in self.services {
            for task in self.registry.resolve(&call.service)? {
                env.slog.task_attempt().service(&call.service).emit_success();
                undo_stack.push((task, call));
                let pushed = undo_stack.len() - 1;
                match undo_stack[pushed].0.execute(env, &call.params) {
                    Ok(()) => {
                        env.slog.task_result().service(&call.service).emit_success();
                    }
                    Err(e) => {
                        env.slog
                            .task_result()
                            .service(&call.service)
                            .field("error", e.to_string().into())
                            .emit_failure();
                        original = Some(Error::Task {
                            service: call.service.clone(),
                            source: Box::new(e),
                        });
                        break 'services;
                    }
                }
            }
        }

        let Some(original) = original else {
            return Ok(());
        };

        env.comm.error("problem detected, reverting");
        if !perform_undo {
            return Err(original);
        }

        let mut rollback_errors = Vec::new();
        for (task, call) in undo_stack.iter_mut().rev() {
            match task.revert(env, &call.params) {
                Ok(()) => {
                    env.slog.rollback().service(&call.service).emit_success();
                }
                Err(e) => {
                    rollback_errors.push(format!("revert of `{}` failed: {e}", call.service));
                    env.slog.rollback().service(&call.service).emit_failure();
                }
            }
        }
        if rollback_errors.is_empty() {
            env.slog.rollback_summary().emit_success();
        } else {
            env.slog.rollback_summary().emit_failure();
        }
        Err(Error::Reverted {
            original: Box::new(original),
            rollback_errors,
        })
    }

    /// Standalone reversal for an explicit `remove` run: there is no
    /// in-process undo stack, so the full task list is rebuilt from the
    /// configured services and reverted in reverse declared order. Failures
    /// are collected, not fatal to the pass.
    pub fn revert(&self, env: &mut TaskEnv<'_>) -> Result<()> {
        self.resolve_all()?;
        let mut failures = Vec::new();
        for call in self.services.iter().rev() {
            for mut task in self.registry.resolve(&call.service)?.into_iter().rev() {
                match task.revert(env, &call.params) {
                    Ok(()) => {
                        env.slog.rollback().service(&call.service).emit_success();
                    }
                    Err(e) => {
                        failures.push(format!("revert of `{}` failed: {e}", call.service));
                        env.slog.rollback().service(&call.service).emit_failure();
                    }
                }
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Removal { failures })
        }
    }
}
