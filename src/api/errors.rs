//! Stable error identifiers and exit codes surfaced in failure facts.
use crate::types::errors::Error;

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorId {
    E_CONFIG,
    E_POLICY,
    E_OS,
    E_PLATFORM,
    E_SPACE,
    E_TASK_FAILED,
    E_RESTORE_FAILED,
    E_REMOVE_FAILED,
}

#[must_use]
pub fn id_str(id: ErrorId) -> &'static str {
    match id {
        ErrorId::E_CONFIG => "E_CONFIG",
        ErrorId::E_POLICY => "E_POLICY",
        ErrorId::E_OS => "E_OS",
        ErrorId::E_PLATFORM => "E_PLATFORM",
        ErrorId::E_SPACE => "E_SPACE",
        ErrorId::E_TASK_FAILED => "E_TASK_FAILED",
        ErrorId::E_RESTORE_FAILED => "E_RESTORE_FAILED",
        ErrorId::E_REMOVE_FAILED => "E_REMOVE_FAILED",
    }
}

#[must_use]
pub fn exit_code_for(id: ErrorId) -> i32 {
    match id {
        ErrorId::E_CONFIG => 10,
        ErrorId::E_POLICY => 20,
        ErrorId::E_OS => 30,
        ErrorId::E_PLATFORM => 40,
        ErrorId::E_SPACE => 50,
        ErrorId::E_TASK_FAILED => 60,
        ErrorId::E_RESTORE_FAILED => 70,
        ErrorId::E_REMOVE_FAILED => 80,
    }
}

/// Classify an engine error by its root cause.
#[must_use]
pub fn error_id_for(e: &Error) -> ErrorId {
    match e.original() {
        Error::Config(_) => ErrorId::E_CONFIG,
        Error::Path(_) => ErrorId::E_POLICY,
        Error::Os(_) => ErrorId::E_OS,
        Error::UnsupportedPlatform { .. } => ErrorId::E_PLATFORM,
        Error::InsufficientSpace { .. } => ErrorId::E_SPACE,
        Error::Removal { .. } => ErrorId::E_REMOVE_FAILED,
        Error::Task { source, .. } => match source.as_ref() {
            Error::UnsupportedPlatform { .. } => ErrorId::E_PLATFORM,
            Error::InsufficientSpace { .. } => ErrorId::E_SPACE,
            _ => ErrorId::E_TASK_FAILED,
        },
        _ => ErrorId::E_TASK_FAILED,
    }
}

/// Rollback-specific classification: reversal failures always map to
/// `E_RESTORE_FAILED` regardless of the original cause.
#[must_use]
pub fn rollback_error_id(e: &Error) -> Option<ErrorId> {
    match e {
        Error::Reverted { rollback_errors, .. } if !rollback_errors.is_empty() => {
            Some(ErrorId::E_RESTORE_FAILED)
        }
        _ => None,
    }
}
