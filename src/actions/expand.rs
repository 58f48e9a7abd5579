//! Expand-kind target creation: pipe an archive through a command chain
//! derived from its extension suffixes, extracting into the target directory.
//!
//! Examples: `x.tar.gz` runs `gzip -dc | tar xf -`, `x.cpio` runs
//! `cpio -idum`, `x.gz` decompresses to a file named after the stem. All
//! commands are synchronous child processes; any non-zero exit status is a
//! hard failure.
use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::types::errors::{Error, Result};

/// One stage of an expansion pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandStep {
    pub program: &'static str,
    pub args: Vec<String>,
}

impl ExpandStep {
    fn new(program: &'static str, args: &[&str]) -> Self {
        Self {
            program,
            args: args.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Derive the command chain for an archive file name.
///
/// Returns the pipeline stages plus, for chains ending in a bare
/// decompressor, the output file name to capture stdout into. `None` when no
/// suffix rule matches.
#[must_use]
pub fn command_chain(name: &str) -> Option<(Vec<ExpandStep>, Option<String>)> {
    let mut steps: Vec<ExpandStep> = Vec::new();
    let mut rest = name.to_string();

    // Peel compression suffixes first.
    loop {
        if let Some(stripped) = rest.strip_suffix(".gz") {
            steps.push(ExpandStep::new("gzip", &["-dc"]));
            rest = stripped.to_string();
        } else if let Some(stripped) = rest.strip_suffix(".tgz") {
            steps.push(ExpandStep::new("gzip", &["-dc"]));
            rest = format!("{stripped}.tar");
        } else if let Some(stripped) = rest.strip_suffix(".bz2") {
            steps.push(ExpandStep::new("bzip2", &["-dc"]));
            rest = stripped.to_string();
        } else if let Some(stripped) = rest.strip_suffix(".tbz2") {
            steps.push(ExpandStep::new("bzip2", &["-dc"]));
            rest = format!("{stripped}.tar");
        } else if let Some(stripped) = rest.strip_suffix(".Z") {
            steps.push(ExpandStep::new("uncompress", &["-c"]));
            rest = stripped.to_string();
        } else {
            break;
        }
    }

    // Then the archive format itself.
    if let Some(stripped) = rest.strip_suffix(".tar") {
        steps.push(ExpandStep::new("tar", &["xf", "-"]));
        rest = stripped.to_string();
        let _ = rest;
        return Some((steps, None));
    }
    if let Some(stripped) = rest.strip_suffix(".cpio") {
        steps.push(ExpandStep::new("cpio", &["-idum"]));
        rest = stripped.to_string();
        let _ = rest;
        return Some((steps, None));
    }

    if steps.is_empty() {
        return None;
    }
    // Pure decompression: stdout becomes a file named after the stem.
    Some((steps, Some(rest)))
}

/// Expand `source` into `dest_dir`.
pub fn make_target(source: &Path, dest_dir: &Path) -> Result<()> {
    let name = source
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (steps, capture) = command_chain(&name)
        .ok_or_else(|| Error::Config(format!("no expansion rule for `{name}`")))?;
    std::fs::create_dir_all(dest_dir)?;

    let mut children = Vec::new();
    let mut input = Stdio::from(File::open(source)?);
    let last_idx = steps.len() - 1;
    for (i, step) in steps.iter().enumerate() {
        let stdout = if i < last_idx || capture.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        };
        let mut child = Command::new(step.program)
            .args(&step.args)
            .current_dir(dest_dir)
            .stdin(input)
            .stdout(stdout)
            .spawn()
            .map_err(|e| Error::Os(format!("{}: {e}", step.program)))?;
        input = if i < last_idx {
            match child.stdout.take() {
                Some(out) => Stdio::from(out),
                None => Stdio::null(),
            }
        } else {
            Stdio::null()
        };
        children.push(child);
    }

    if let Some(fname) = capture {
        if let Some(out) = children[last_idx].stdout.take() {
            let mut out = out;
            let mut f = File::create(dest_dir.join(fname))?;
            std::io::copy(&mut out, &mut f)?;
        }
    }

    for (child, step) in children.into_iter().zip(steps.iter()) {
        let status = child
            .wait_with_output()
            .map_err(|e| Error::Os(format!("{}: {e}", step.program)))?
            .status;
        if !status.success() {
            return Err(Error::Os(format!(
                "{} {} exited with {status}",
                step.program,
                step.args.join(" ")
            )));
        }
    }
    Ok(())
}
