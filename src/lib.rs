#![forbid(unsafe_code)]
//! Roundhouse: transactional package installation with reversible actions.
//!
//! Model highlights:
//! - A plan is an ordered list of declarative filesystem actions (install,
//!   symlink, directory, remove, expand, generate, touch) plus an ordered
//!   list of named service tasks.
//! - Every mutation journals a compensating undo operation first; originals
//!   about to be overwritten are preserved under the package metadata
//!   directory so a failed run restores the prior filesystem state exactly.
//! - A task manager sequences services in declared order and reverts them in
//!   reverse order on any failure, collecting reversal errors without
//!   masking the original cause.
//! - Installation properties are persisted before the first mutation, so a
//!   later `remove` run in a fresh process can reverse the installation.
//!
//! Execution is single-threaded and strictly ordered; this crate forbids
//! `unsafe` and uses `rustix` for metadata syscalls.

pub mod constants;

pub mod actions;
pub mod adapters;
pub mod api;
pub mod fs;
pub mod logging;
pub mod policy;
pub mod tasks;
pub mod types;

pub use api::*;
