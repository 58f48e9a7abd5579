use log::Level;
use serde_json::Value;

/// Structured fact emission: one JSON event per engine step.
pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Sequential human-readable audit log.
pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// No-op sink used as the default in dev and tests.
#[derive(Default)]
pub struct JsonlSink;

impl FactsEmitter for JsonlSink {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, _fields: Value) {}
}

impl AuditSink for JsonlSink {
    fn log(&self, _level: Level, _msg: &str) {}
}
