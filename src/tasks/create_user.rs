//! Installation-user provisioning.
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::types::errors::Result;

use super::{Task, TaskEnv, SERVICE_CREATE_USER};

/// Creates the installation user when it does not already exist. Tracks
/// whether this run created it, so revert removes only what this run added
/// and never a pre-existing account.
#[derive(Default)]
pub struct CreateUser {
    created: Option<String>,
}

impl Task for CreateUser {
    fn provides(&self) -> &'static str {
        SERVICE_CREATE_USER
    }

    fn execute(&mut self, env: &mut TaskEnv<'_>, params: &BTreeMap<String, String>) -> Result<()> {
        let user = params
            .get("user")
            .cloned()
            .unwrap_or_else(|| env.ctx.user.clone());
        if user.is_empty() {
            return Ok(());
        }
        let group = params
            .get("group")
            .cloned()
            .unwrap_or_else(|| env.ctx.group.clone());
        let home = params
            .get("home")
            .map(PathBuf::from)
            .or_else(|| env.ctx.top.clone())
            .unwrap_or_else(|| PathBuf::from("/"));
        if env.os.user_exists(&user) {
            return Ok(());
        }
        if !env.dry {
            env.os.add_user(&user, &group, &home)?;
            self.created = Some(user);
        }
        Ok(())
    }

    fn revert(&mut self, env: &mut TaskEnv<'_>, _params: &BTreeMap<String, String>) -> Result<()> {
        if let Some(user) = self.created.take() {
            env.os.remove_user(&user)?;
        }
        Ok(())
    }
}
