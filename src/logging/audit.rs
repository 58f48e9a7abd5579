//! Stage-scoped fact emission.
//!
//! Every engine step emits a JSON fact through [`FactsEmitter`] with a
//! minimal envelope: `schema_version`, `ts`, `run_id`, `plan_id`, `stage`,
//! and `decision`. Dry-run facts are redacted for determinism.
use serde_json::{json, Value};
use uuid::Uuid;

use super::facts::FactsEmitter;
use super::redact::redact_event;

pub(crate) const SCHEMA_VERSION: i64 = 1;
const SUBSYSTEM: &str = "roundhouse";

/// Fresh random identifier for one install/remove run.
#[must_use]
pub fn new_run_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Clone, Debug, Default)]
pub struct AuditMode {
    pub dry_run: bool,
    pub redact: bool,
}

/// Shared emission context for one run.
pub struct AuditCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub plan_id: String,
    pub run_id: String,
    pub ts: String,
    pub mode: AuditMode,
}

impl<'a> AuditCtx<'a> {
    #[must_use]
    pub fn new(
        facts: &'a dyn FactsEmitter,
        plan_id: String,
        run_id: String,
        ts: String,
        mode: AuditMode,
    ) -> Self {
        Self {
            facts,
            plan_id,
            run_id,
            ts,
            mode,
        }
    }
}

/// Stage for typed audit emission.
#[derive(Clone, Copy, Debug)]
pub enum Stage {
    Plan,
    Properties,
    TaskAttempt,
    TaskResult,
    ApplyAttempt,
    ApplyResult,
    Rollback,
    RollbackSummary,
    RemoveResult,
    Cleanup,
}

impl Stage {
    fn as_event(self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::Properties => "properties",
            Stage::TaskAttempt => "task.attempt",
            Stage::TaskResult => "task.result",
            Stage::ApplyAttempt => "apply.attempt",
            Stage::ApplyResult => "apply.result",
            Stage::Rollback => "rollback",
            Stage::RollbackSummary => "rollback.summary",
            Stage::RemoveResult => "remove.result",
            Stage::Cleanup => "cleanup",
        }
    }
}

/// Decision severity for audit events.
#[derive(Clone, Copy, Debug)]
pub enum Decision {
    Success,
    Failure,
    Warn,
}

impl Decision {
    fn as_str(self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
            Decision::Warn => "warn",
        }
    }
}

/// Builder facade over audit emission with a centralized envelope.
pub struct StageLogger<'a> {
    ctx: &'a AuditCtx<'a>,
}

impl<'a> StageLogger<'a> {
    #[must_use]
    pub fn new(ctx: &'a AuditCtx<'a>) -> Self {
        Self { ctx }
    }

    pub fn plan(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Plan)
    }
    pub fn properties(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Properties)
    }
    pub fn task_attempt(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::TaskAttempt)
    }
    pub fn task_result(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::TaskResult)
    }
    pub fn apply_attempt(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::ApplyAttempt)
    }
    pub fn apply_result(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::ApplyResult)
    }
    pub fn rollback(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Rollback)
    }
    pub fn rollback_summary(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::RollbackSummary)
    }
    pub fn remove_result(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::RemoveResult)
    }
    pub fn cleanup(&'a self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Cleanup)
    }
}

pub struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, fields }
    }

    #[must_use]
    pub fn action(mut self, action_id: impl Into<String>) -> Self {
        self.fields
            .insert("action_id".into(), json!(action_id.into()));
        self
    }

    #[must_use]
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.fields.insert("service".into(), json!(service.into()));
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.fields.insert("path".into(), json!(path.into()));
        self
    }

    #[must_use]
    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    #[must_use]
    pub fn merge(mut self, extra: &Value) -> Self {
        if let Some(obj) = extra.as_object() {
            for (k, v) in obj.iter() {
                self.fields.insert(k.clone(), v.clone());
            }
        }
        self
    }

    pub fn emit_success(self) {
        self.emit(Decision::Success);
    }

    pub fn emit_failure(self) {
        self.emit(Decision::Failure);
    }

    pub fn emit_warn(self) {
        self.emit(Decision::Warn);
    }

    pub fn emit(self, decision: Decision) {
        let stage = self
            .fields
            .get("stage")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let mut fields = self.fields;
        fields.insert("schema_version".into(), json!(SCHEMA_VERSION));
        fields.insert("ts".into(), json!(self.ctx.ts.clone()));
        fields.insert("plan_id".into(), json!(self.ctx.plan_id.clone()));
        fields.insert("run_id".into(), json!(self.ctx.run_id.clone()));
        fields.insert("decision".into(), json!(decision.as_str()));
        fields.insert("dry_run".into(), json!(self.ctx.mode.dry_run));
        let mut value = Value::Object(fields);
        if self.ctx.mode.redact {
            value = redact_event(value);
        }
        self.ctx
            .facts
            .emit(SUBSYSTEM, &stage, decision.as_str(), value);
    }
}
