//! Install the shell framework and its plugins.
use std::path::PathBuf;

use anyhow::Result;

use super::{Context, Task, TaskResult, process_resources};
use crate::resources::git_clone::GitCloneResource;

fn framework_dir(ctx: &Context) -> PathBuf {
    ctx.target_root().join(&ctx.manifest.shell.dir)
}

/// `Some(skipped)` when git is missing, after warning about it.
fn missing_git(ctx: &Context) -> Option<TaskResult> {
    if ctx.executor.which("git") {
        return None;
    }
    ctx.log.warn("git not found on PATH");
    Some(TaskResult::Skipped("git not found".to_string()))
}

/// Clone the shell framework into the target root.
#[derive(Debug)]
pub struct InstallShellFramework;

impl Task for InstallShellFramework {
    fn name(&self) -> &'static str {
        "Install shell framework"
    }

    fn optional(&self) -> bool {
        true
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if let Some(skipped) = missing_git(ctx) {
            return Ok(skipped);
        }
        let resource = GitCloneResource::new(
            ctx.manifest.shell.framework.as_str(),
            &framework_dir(ctx),
            &*ctx.executor,
        );
        process_resources(ctx, std::iter::once(resource), "clone")
    }
}

/// Clone framework plugins into `<framework>/custom/plugins/`.
#[derive(Debug)]
pub struct InstallShellPlugins;

impl Task for InstallShellPlugins {
    fn name(&self) -> &'static str {
        "Install shell plugins"
    }

    fn optional(&self) -> bool {
        true
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.manifest.shell.plugins.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if let Some(skipped) = missing_git(ctx) {
            return Ok(skipped);
        }
        let fw = framework_dir(ctx);
        if !fw.is_dir() && !ctx.dry_run {
            return Ok(TaskResult::Skipped(format!(
                "{} is not installed",
                fw.display()
            )));
        }
        let plugins_dir = fw.join("custom").join("plugins");
        let resources = ctx.manifest.shell.plugins.iter().map(|p| {
            GitCloneResource::new(p.url.as_str(), &plugins_dir.join(&p.name), &*ctx.executor)
        });
        process_resources(ctx, resources, "clone")
    }
}
