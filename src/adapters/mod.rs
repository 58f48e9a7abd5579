//! Collaborator seams: the engine depends on these call contracts only.
//!
//! - [`OsDriver`]: synchronous, shell-command-backed OS operations (user and
//!   group management, free space, platform identity, ownership).
//! - [`Communicator`]: interactive confirmation and human-readable status.
pub mod console;
pub mod os;

use std::path::Path;

use crate::types::errors::Result;

pub use console::ConsoleCommunicator;
pub use os::ShellOsDriver;

/// Blocking OS operations. All commands run to completion; a non-zero exit
/// status surfaces as an error.
pub trait OsDriver {
    fn add_user(&self, user: &str, group: &str, home: &Path) -> Result<()>;
    fn remove_user(&self, user: &str) -> Result<()>;
    fn add_group(&self, group: &str) -> Result<()>;
    fn remove_group(&self, group: &str) -> Result<()>;
    fn user_exists(&self, user: &str) -> bool;
    fn group_exists(&self, group: &str) -> bool;
    /// Free bytes available to unprivileged writers under `path`.
    fn free_space(&self, path: &Path) -> Result<u64>;
    /// Platform identity string, e.g. `linux-x86_64`.
    fn platform(&self) -> String;
    /// Apply a name-based owner/group to a path.
    fn chown(&self, path: &Path, user: &str, group: &str) -> Result<()>;
}

/// One running progress indicator.
pub trait Progress {
    fn advance(&mut self);
    fn done(&mut self);
}

/// Interactive channel to the operator.
pub trait Communicator {
    /// Prompt for a line of input; an empty response yields `default`.
    fn ask(&self, prompt: &str, default: Option<&str>) -> String;
    fn report(&self, msg: &str);
    fn warning(&self, msg: &str);
    fn error(&self, msg: &str);
    fn progress(&self, label: &str) -> Box<dyn Progress>;
}
