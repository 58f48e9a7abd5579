//! Installation-group provisioning.
use std::collections::BTreeMap;

use crate::types::errors::Result;

use super::{Task, TaskEnv, SERVICE_CREATE_GROUP};

/// Creates the installation group when it does not already exist; revert
/// removes it only when this run created it.
#[derive(Default)]
pub struct CreateGroup {
    created: Option<String>,
}

impl Task for CreateGroup {
    fn provides(&self) -> &'static str {
        SERVICE_CREATE_GROUP
    }

    fn execute(&mut self, env: &mut TaskEnv<'_>, params: &BTreeMap<String, String>) -> Result<()> {
        let group = params
            .get("group")
            .cloned()
            .unwrap_or_else(|| env.ctx.group.clone());
        if group.is_empty() || env.os.group_exists(&group) {
            return Ok(());
        }
        if !env.dry {
            env.os.add_group(&group)?;
            self.created = Some(group);
        }
        Ok(())
    }

    fn revert(&mut self, env: &mut TaskEnv<'_>, _params: &BTreeMap<String, String>) -> Result<()> {
        if let Some(group) = self.created.take() {
            env.os.remove_group(&group)?;
        }
        Ok(())
    }
}
