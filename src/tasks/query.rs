//! Interactive query tasks: collect values from the operator into the
//! installation parameters before any mutation depends on them.
use std::collections::BTreeMap;

use crate::types::errors::{Error, Result};

use super::{Task, TaskEnv, SERVICE_QUERY_PASSWORD, SERVICE_QUERY_USER};

/// Asks for a user name and records it under the configured parameter key
/// (default `user`). An empty answer with no default is fatal.
pub struct QueryUser;

impl Task for QueryUser {
    fn provides(&self) -> &'static str {
        SERVICE_QUERY_USER
    }

    fn execute(&mut self, env: &mut TaskEnv<'_>, params: &BTreeMap<String, String>) -> Result<()> {
        let key = params.get("parameter").map_or("user", String::as_str);
        let prompt = params.get("prompt").map_or("Installation user", String::as_str);
        let answer = env.comm.ask(prompt, params.get("default").map(String::as_str));
        if answer.is_empty() {
            return Err(Error::MissingParameter(key.to_string()));
        }
        if key == "user" {
            env.ctx.user = answer.clone();
        }
        env.ctx.parameters.insert(key.to_string(), answer);
        Ok(())
    }

    fn revert(&mut self, env: &mut TaskEnv<'_>, params: &BTreeMap<String, String>) -> Result<()> {
        let key = params.get("parameter").map_or("user", String::as_str);
        env.ctx.parameters.remove(key);
        Ok(())
    }
}

/// Asks for a password; no default is honored and an empty answer is fatal.
/// The value lands in the parameters map only; facts never carry it.
pub struct QueryPassword;

impl Task for QueryPassword {
    fn provides(&self) -> &'static str {
        SERVICE_QUERY_PASSWORD
    }

    fn execute(&mut self, env: &mut TaskEnv<'_>, params: &BTreeMap<String, String>) -> Result<()> {
        let key = params.get("parameter").map_or("password", String::as_str);
        let prompt = params.get("prompt").map_or("Password", String::as_str);
        let answer = env.comm.ask(prompt, None);
        if answer.is_empty() {
            return Err(Error::MissingParameter(key.to_string()));
        }
        env.ctx.parameters.insert(key.to_string(), answer);
        Ok(())
    }

    fn revert(&mut self, env: &mut TaskEnv<'_>, params: &BTreeMap<String, String>) -> Result<()> {
        let key = params.get("parameter").map_or("password", String::as_str);
        env.ctx.parameters.remove(key);
        Ok(())
    }
}
