pub mod audit;
pub mod facts;
pub mod logfile;
pub mod redact;

pub use audit::{new_run_id, AuditCtx, AuditMode, Decision, EventBuilder, Stage, StageLogger};
pub use facts::{AuditSink, FactsEmitter, JsonlSink};
pub use logfile::RunLog;
pub use redact::{now_iso, redact_event, ts_for_mode, TS_ZERO};
