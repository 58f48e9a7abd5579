//! Shared crate-wide constants for Roundhouse.
//!
//! Centralizes magic values and default labels used across modules.
//! Adjusting these here will propagate through the crate.

/// Name of the per-package metadata directory created beneath the installation top.
/// Holds the persisted properties document, run logs, and the preserve tree.
pub const METAINF_DIR: &str = ".meta-inf";

/// Name of the preserve directory beneath the metadata directory. Originals about
/// to be overwritten are stashed here, mirroring their absolute paths.
pub const PRESERVE_DIR: &str = "preserve";

/// File name of the persisted properties document beneath the metadata directory.
pub const PROPERTIES_FILE: &str = "properties.json";

/// Suffix appended to a preserved payload to name its metadata sidecar.
/// Example: `preserve/opt/prod/bin/app` and `preserve/opt/prod/bin/app.meta.json`.
pub const SIDECAR_SUFFIX: &str = ".meta.json";

/// Tokens substituted in symlink sources and generated file content.
pub const TOKEN_TOP: &str = "@top@";
pub const TOKEN_INSTALLATION_TOP: &str = "@installation_top@";

/// UUIDv5 namespace tag for deterministic plan/action IDs.
pub const NS_TAG: &str = "https://roundhouse/install-engine";

/// Schema labels written into preserve sidecars. v2 adds a payload hash.
pub const SIDECAR_SCHEMA_V1: &str = "preserve_meta.v1";
pub const SIDECAR_SCHEMA_V2: &str = "preserve_meta.v2";
