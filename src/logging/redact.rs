use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::types::plan::ApplyMode;

pub const TS_ZERO: &str = "1970-01-01T00:00:00Z";

pub fn now_iso() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| TS_ZERO.to_string())
}

/// Return a timestamp for facts emission based on mode.
/// - DryRun: constant zero timestamp for determinism.
/// - Commit: real, current timestamp in RFC3339.
pub fn ts_for_mode(mode: ApplyMode) -> String {
    match mode {
        ApplyMode::DryRun => TS_ZERO.to_string(),
        ApplyMode::Commit => now_iso(),
    }
}

/// Apply redactions to a fact event for comparison and safe logging.
/// Zeroes timestamps and removes volatile timing fields; masks answers
/// captured from interactive queries.
pub fn redact_event(mut v: Value) -> Value {
    if let Some(obj) = v.as_object_mut() {
        obj.insert("ts".into(), Value::String(TS_ZERO.to_string()));
        obj.remove("duration_ms");
        if obj.contains_key("answer") {
            obj.insert("answer".into(), Value::String("***".into()));
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redact_masks_and_removes_expected_fields() {
        let input = json!({
            "ts": "2025-01-01T12:00:00Z",
            "duration_ms": 123,
            "answer": "s3cret",
            "path": "/opt/prod/bin/app"
        });
        let out = redact_event(input);
        assert_eq!(out.get("ts").and_then(|v| v.as_str()), Some(TS_ZERO));
        assert!(out.get("duration_ms").is_none());
        assert_eq!(out.get("answer").and_then(|v| v.as_str()), Some("***"));
        assert_eq!(
            out.get("path").and_then(|v| v.as_str()),
            Some("/opt/prod/bin/app")
        );
    }
}
