//! Uninstall command implementation.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, UninstallOpts};
use crate::logging::Logger;
use crate::tasks;

/// Run the uninstall command.
///
/// # Errors
///
/// Returns an error if a preflight check fails or any task fails.
pub fn run(global: &GlobalOpts, opts: &UninstallOpts, log: &Arc<Logger>) -> Result<()> {
    let tasks = tasks::all_uninstall_tasks();
    super::run_command(global, log, |s| s.with_uninstall(opts), &tasks)
}
