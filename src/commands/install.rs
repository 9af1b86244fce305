//! Install command implementation.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::logging::Logger;
use crate::tasks;

/// Run the install command.
///
/// # Errors
///
/// Returns an error if a preflight check fails or any required task fails.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    let tasks = tasks::all_install_tasks();
    super::run_command(global, log, |s| s.with_install(opts), &tasks)
}
