// Facade for the public API; delegates to submodules under src/api/

use std::path::Path;

use crate::adapters::{Communicator, ConsoleCommunicator, OsDriver, ShellOsDriver};
use crate::logging::{AuditSink, FactsEmitter};
use crate::policy::Policy;
use crate::tasks::{Task, TaskRegistry};
use crate::types::context::InstallationContext;
use crate::types::errors::Result;
use crate::types::plan::{ApplyMode, InstallPlan, PlanInput};
use crate::types::report::RunReport;

pub mod errors;
mod install;
mod remove;

pub use install::failure_report;

/// The installation engine facade.
///
/// Owns the policy, the task registry, and the collaborator adapters; every
/// run goes through [`plan`](Installer::plan) followed by
/// [`install`](Installer::install) or [`remove`](Installer::remove).
pub struct Installer<E: FactsEmitter, A: AuditSink> {
    pub(crate) facts: E,
    pub(crate) audit: A,
    pub(crate) policy: Policy,
    pub(crate) registry: TaskRegistry,
    pub(crate) os: Box<dyn OsDriver>,
    pub(crate) comm: Box<dyn Communicator>,
}

impl<E: FactsEmitter, A: AuditSink> Installer<E, A> {
    /// Construct with the built-in task registry and shell-backed defaults.
    pub fn new(facts: E, audit: A, policy: Policy) -> Self {
        Self {
            facts,
            audit,
            policy,
            registry: TaskRegistry::builtin(),
            os: Box::new(ShellOsDriver),
            comm: Box::new(ConsoleCommunicator),
        }
    }

    #[must_use]
    pub fn with_os_driver(mut self, os: Box<dyn OsDriver>) -> Self {
        self.os = os;
        self
    }

    #[must_use]
    pub fn with_communicator(mut self, comm: Box<dyn Communicator>) -> Self {
        self.comm = comm;
        self
    }

    /// Replace the task registry wholesale (e.g. to start from empty).
    #[must_use]
    pub fn with_registry(mut self, registry: TaskRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register a package-shipped task alongside the built-ins.
    pub fn register_task<F>(&mut self, service: &str, factory: F)
    where
        F: Fn() -> Box<dyn Task> + 'static,
    {
        self.registry.register(service, factory);
    }

    /// Build an install plan from configuration output. Order is preserved
    /// exactly; both actions and services execute as declared.
    #[must_use]
    pub fn plan(&self, input: PlanInput) -> InstallPlan {
        InstallPlan {
            actions: input.actions,
            services: input.services,
        }
    }

    /// Execute an install run. On any task failure the run is rolled back in
    /// reverse order and the aggregated error is returned; the filesystem is
    /// left in its pre-install state.
    pub fn install(
        &self,
        plan: &InstallPlan,
        ctx: &mut InstallationContext,
        mode: ApplyMode,
    ) -> Result<RunReport> {
        install::run(self, plan, ctx, mode)
    }

    /// Execute a standalone removal run against a previously installed top
    /// directory, reconstructing the context from persisted properties.
    pub fn remove(&self, plan: &InstallPlan, top: &Path) -> Result<RunReport> {
        remove::run(self, plan, top)
    }

    /// Load the persisted installation context under `top` without mutating
    /// anything.
    pub fn load_context(&self, top: &Path) -> Result<InstallationContext> {
        remove::load_context(top)
    }
}
