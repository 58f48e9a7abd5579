//! Run reports returned by the install/remove entry points.
use std::path::PathBuf;

use uuid::Uuid;

/// What kind of run produced a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunKind {
    Install,
    Remove,
}

impl RunKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunKind::Install => "install",
            RunKind::Remove => "remove",
        }
    }
}

/// Summary of a completed (or rolled-back) run.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub kind: RunKind,
    pub plan_id: Uuid,
    /// Actions whose `create` completed in this run.
    pub executed: usize,
    pub errors: Vec<String>,
    pub rollback_errors: Vec<String>,
    pub rolled_back: bool,
    pub duration_ms: u64,
    /// The run's log file, when one survives the run.
    pub log_path: Option<PathBuf>,
}

impl RunReport {
    #[must_use]
    pub fn ok(&self) -> bool {
        self.errors.is_empty() && self.rollback_errors.is_empty()
    }
}
