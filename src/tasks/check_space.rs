//! Free-space gate.
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::types::errors::{Error, Result};

use super::{Task, TaskEnv, SERVICE_CHECK_SPACE};

/// Fails the install when the filesystem holding the installation top has
/// less free space than the package declares it needs.
pub struct CheckSpace;

/// Parse a size declaration: plain bytes or a `k`/`m`/`g` suffix.
pub(crate) fn parse_size(s: &str) -> Option<u64> {
    let s = s.trim();
    let (num, mult) = match s.chars().last()? {
        'k' | 'K' => (&s[..s.len() - 1], 1u64 << 10),
        'm' | 'M' => (&s[..s.len() - 1], 1u64 << 20),
        'g' | 'G' => (&s[..s.len() - 1], 1u64 << 30),
        _ => (s, 1),
    };
    num.trim().parse::<u64>().ok().map(|n| n.saturating_mul(mult))
}

impl Task for CheckSpace {
    fn provides(&self) -> &'static str {
        SERVICE_CHECK_SPACE
    }

    fn execute(&mut self, env: &mut TaskEnv<'_>, params: &BTreeMap<String, String>) -> Result<()> {
        let declared = params
            .get("space")
            .or_else(|| params.get("bytes"))
            .ok_or_else(|| Error::Config("check-space requires a `space` parameter".into()))?;
        let needed = parse_size(declared)
            .ok_or_else(|| Error::Config(format!("unparsable space declaration `{declared}`")))?;
        let path: PathBuf = match params.get("path") {
            Some(p) => PathBuf::from(p),
            None => env
                .ctx
                .top
                .clone()
                .ok_or_else(|| Error::Config("check-space with no installation top".into()))?,
        };
        let available = env.os.free_space(&path)?;
        if available < needed {
            return Err(Error::InsufficientSpace {
                path,
                needed,
                available,
            });
        }
        Ok(())
    }

    fn revert(&mut self, _env: &mut TaskEnv<'_>, _params: &BTreeMap<String, String>) -> Result<()> {
        Ok(())
    }
}
