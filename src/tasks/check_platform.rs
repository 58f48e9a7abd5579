//! Platform compatibility gate.
use std::collections::BTreeMap;

use crate::types::errors::{Error, Result};

use super::{Task, TaskEnv, SERVICE_CHECK_PLATFORM};

/// Fails the install when the host platform is not in the declared set.
/// Reverting a check is a no-op by design.
pub struct CheckPlatform;

impl CheckPlatform {
    fn supported(params: &BTreeMap<String, String>) -> Vec<String> {
        params
            .get("platforms")
            .or_else(|| params.get("platform"))
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Task for CheckPlatform {
    fn provides(&self) -> &'static str {
        SERVICE_CHECK_PLATFORM
    }

    fn execute(&mut self, env: &mut TaskEnv<'_>, params: &BTreeMap<String, String>) -> Result<()> {
        let supported = Self::supported(params);
        if supported.is_empty() {
            // No declared constraint: every platform passes.
            return Ok(());
        }
        let found = env.os.platform();
        if supported.iter().any(|p| *p == found) {
            Ok(())
        } else {
            Err(Error::UnsupportedPlatform { found, supported })
        }
    }

    fn revert(&mut self, _env: &mut TaskEnv<'_>, _params: &BTreeMap<String, String>) -> Result<()> {
        Ok(())
    }
}
