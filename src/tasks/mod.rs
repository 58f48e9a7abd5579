//! Service tasks: named units of installation-time work.
//!
//! Tasks are discovered through an explicit registry (service name mapped to
//! factory functions) rather than any implicit registration hook. A service
//! name may resolve to several task implementations; all run in registration
//! order. Every task pairs `execute` with an equivalent `revert`, and tasks
//! that provision external resources track exactly what they created so a
//! revert removes only that.
pub mod check_platform;
pub mod check_space;
pub mod create_files;
pub mod create_group;
pub mod create_user;
pub mod manager;
pub mod query;

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::actions::ActionEngine;
use crate::adapters::{Communicator, OsDriver};
use crate::logging::StageLogger;
use crate::policy::Policy;
use crate::types::context::InstallationContext;
use crate::types::errors::{Error, Result};

pub use manager::TaskManager;

/// Built-in service names.
pub const SERVICE_CHECK_PLATFORM: &str = "system-check-platform";
pub const SERVICE_CHECK_SPACE: &str = "system-check-space";
pub const SERVICE_CREATE_FILES: &str = "system-create-files";
pub const SERVICE_CREATE_USER: &str = "system-create-user";
pub const SERVICE_CREATE_GROUP: &str = "system-create-group";
pub const SERVICE_QUERY_USER: &str = "system-query-user";
pub const SERVICE_QUERY_PASSWORD: &str = "system-query-password";

/// Everything a task may touch during one run, passed explicitly.
pub struct TaskEnv<'a> {
    pub ctx: &'a mut InstallationContext,
    pub engine: &'a mut ActionEngine,
    pub os: &'a dyn OsDriver,
    pub comm: &'a dyn Communicator,
    pub policy: &'a Policy,
    pub slog: &'a StageLogger<'a>,
    pub plan_id: &'a Uuid,
    pub dry: bool,
}

/// A named unit of work with paired execute/revert.
pub trait Task {
    /// The service name this task satisfies.
    fn provides(&self) -> &'static str;
    fn execute(&mut self, env: &mut TaskEnv<'_>, params: &BTreeMap<String, String>) -> Result<()>;
    fn revert(&mut self, env: &mut TaskEnv<'_>, params: &BTreeMap<String, String>) -> Result<()>;
}

type TaskFactory = Box<dyn Fn() -> Box<dyn Task>>;

/// Explicit service-name -> factory map.
#[derive(Default)]
pub struct TaskRegistry {
    factories: BTreeMap<String, Vec<TaskFactory>>,
}

impl TaskRegistry {
    /// An empty registry; packages register their own tasks into it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in tasks.
    #[must_use]
    pub fn builtin() -> Self {
        let mut r = Self::new();
        r.register(SERVICE_CHECK_PLATFORM, || {
            Box::new(check_platform::CheckPlatform)
        });
        r.register(SERVICE_CHECK_SPACE, || Box::new(check_space::CheckSpace));
        r.register(SERVICE_CREATE_FILES, || {
            Box::new(create_files::CreateFiles)
        });
        r.register(SERVICE_CREATE_USER, || {
            Box::new(create_user::CreateUser::default())
        });
        r.register(SERVICE_CREATE_GROUP, || {
            Box::new(create_group::CreateGroup::default())
        });
        r.register(SERVICE_QUERY_USER, || Box::new(query::QueryUser));
        r.register(SERVICE_QUERY_PASSWORD, || Box::new(query::QueryPassword));
        r
    }

    /// Register a task factory for a service name. Later registrations for
    /// the same name run after earlier ones.
    pub fn register<F>(&mut self, service: &str, factory: F)
    where
        F: Fn() -> Box<dyn Task> + 'static,
    {
        self.factories
            .entry(service.to_string())
            .or_default()
            .push(Box::new(factory));
    }

    #[must_use]
    pub fn contains(&self, service: &str) -> bool {
        self.factories.contains_key(service)
    }

    /// Instantiate every task registered for `service`.
    pub fn resolve(&self, service: &str) -> Result<Vec<Box<dyn Task>>> {
        let factories = self
            .factories
            .get(service)
            .ok_or_else(|| Error::Config(format!("no task provides service `{service}`")))?;
        Ok(factories.iter().map(|f| f()).collect())
    }
}
