//! Shared test helpers for the roundhouse crate integration tests.
#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use log::Level;
use serde_json::Value;

use roundhouse::adapters::{Communicator, OsDriver, Progress};
use roundhouse::logging::{AuditSink, FactsEmitter};
use roundhouse::types::context::InstallationContext;
use roundhouse::types::errors::Result;

/// A simple in-memory emitter to capture facts during tests.
#[derive(Clone, Default)]
pub struct TestEmitter {
    pub events: Arc<Mutex<Vec<(String, String, String, Value)>>>,
}

impl FactsEmitter for TestEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        self.events
            .lock()
            .unwrap()
            .push((subsystem.into(), event.into(), decision.into(), fields));
    }
}

/// A no-op audit sink for tests.
#[derive(Clone, Default)]
pub struct TestAudit;

impl AuditSink for TestAudit {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// An `OsDriver` double that records every call and answers from canned
/// state instead of shelling out.
#[derive(Clone)]
pub struct RecordingOs {
    pub free: u64,
    pub platform: String,
    pub users: Arc<Mutex<HashSet<String>>>,
    pub groups: Arc<Mutex<HashSet<String>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl Default for RecordingOs {
    fn default() -> Self {
        Self {
            free: u64::MAX,
            platform: "linux-x86_64".into(),
            users: Arc::default(),
            groups: Arc::default(),
            calls: Arc::default(),
        }
    }
}

impl RecordingOs {
    pub fn with_free_space(free: u64) -> Self {
        Self {
            free,
            ..Self::default()
        }
    }

    pub fn recorded(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl OsDriver for RecordingOs {
    fn add_user(&self, user: &str, group: &str, home: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("add_user {user} {group} {}", home.display()));
        self.users.lock().unwrap().insert(user.to_string());
        Ok(())
    }

    fn remove_user(&self, user: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("remove_user {user}"));
        self.users.lock().unwrap().remove(user);
        Ok(())
    }

    fn add_group(&self, group: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("add_group {group}"));
        self.groups.lock().unwrap().insert(group.to_string());
        Ok(())
    }

    fn remove_group(&self, group: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("remove_group {group}"));
        self.groups.lock().unwrap().remove(group);
        Ok(())
    }

    fn user_exists(&self, user: &str) -> bool {
        self.users.lock().unwrap().contains(user)
    }

    fn group_exists(&self, group: &str) -> bool {
        self.groups.lock().unwrap().contains(group)
    }

    fn free_space(&self, _path: &Path) -> Result<u64> {
        Ok(self.free)
    }

    fn platform(&self) -> String {
        self.platform.clone()
    }

    fn chown(&self, path: &Path, user: &str, group: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("chown {user}:{group} {}", path.display()));
        Ok(())
    }
}

struct NullProgress;

impl Progress for NullProgress {
    fn advance(&mut self) {}
    fn done(&mut self) {}
}

/// A communicator double: answers come from a script, output is recorded.
#[derive(Clone, Default)]
pub struct ScriptedComm {
    pub answers: Arc<Mutex<VecDeque<String>>>,
    pub reports: Arc<Mutex<Vec<String>>>,
    pub errors: Arc<Mutex<Vec<String>>>,
}

impl ScriptedComm {
    pub fn with_answers<I: IntoIterator<Item = &'static str>>(answers: I) -> Self {
        let s = Self::default();
        s.answers
            .lock()
            .unwrap()
            .extend(answers.into_iter().map(String::from));
        s
    }
}

impl Communicator for ScriptedComm {
    fn ask(&self, _prompt: &str, default: Option<&str>) -> String {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| default.unwrap_or_default().to_string())
    }

    fn report(&self, msg: &str) {
        self.reports.lock().unwrap().push(msg.to_string());
    }

    fn warning(&self, msg: &str) {
        self.reports.lock().unwrap().push(format!("warning: {msg}"));
    }

    fn error(&self, msg: &str) {
        self.errors.lock().unwrap().push(msg.to_string());
    }

    fn progress(&self, _label: &str) -> Box<dyn Progress> {
        Box::new(NullProgress)
    }
}

/// An installation context rooted at a temp directory.
pub fn ctx_with_top(top: &Path) -> InstallationContext {
    InstallationContext {
        top: Some(top.to_path_buf()),
        product: "prod".into(),
        package: "prod-core".into(),
        version: "1.0".into(),
        ..Default::default()
    }
}
