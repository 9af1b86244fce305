//! Install system packages, the font and the prompt.
use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats};
use crate::config::manifest::PackageSpec;
use crate::resources::Applicable as _;
use crate::resources::package::{
    PackageManager, PackageResource, batch_install, get_installed_packages,
};

/// Install the manifest's base package list.
#[derive(Debug)]
pub struct InstallPackages;

impl Task for InstallPackages {
    fn name(&self) -> &'static str {
        "Install packages"
    }

    fn optional(&self) -> bool {
        true
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.settings.pkg_install
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(manager) = ctx.platform.package_manager else {
            return Ok(TaskResult::Skipped("no supported package manager".to_string()));
        };

        let mut stats = TaskStats::new();
        let mut wanted = Vec::new();
        for spec in &ctx.manifest.packages.base {
            let Some(name) = spec.name_for(manager) else {
                ctx.log.debug(&format!("no {manager} name for {spec:?}"));
                stats.skipped += 1;
                continue;
            };
            if spec.bin().is_some_and(|bin| ctx.executor.which(bin)) {
                ctx.log.debug(&format!("ok: {name} (on PATH)"));
                stats.already_ok += 1;
                continue;
            }
            wanted.push(name);
        }

        ctx.log.debug(&format!(
            "batch-checking {} packages with a single query",
            wanted.len()
        ));
        let installed = get_installed_packages(manager, &*ctx.executor)?;
        let (present, missing): (Vec<&str>, Vec<&str>) =
            wanted.into_iter().partition(|n| installed.contains(*n));
        stats.already_ok += u32::try_from(present.len()).unwrap_or(u32::MAX);

        if missing.is_empty() {
            return Ok(stats.finish(ctx));
        }

        let list = missing.join(" ");
        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would install with {manager}: {list}"));
            stats.changed += u32::try_from(missing.len()).unwrap_or(u32::MAX);
            return Ok(stats.finish(ctx));
        }

        if !ctx.confirm(&format!("Install {list} with {manager}?")) {
            return Ok(TaskResult::Skipped("installation declined".to_string()));
        }
        batch_install(manager, &missing, &*ctx.executor)?;
        ctx.log.info(&format!("installed: {list}"));
        stats.changed += u32::try_from(missing.len()).unwrap_or(u32::MAX);
        Ok(stats.finish(ctx))
    }
}

/// Install the font package.
#[derive(Debug)]
pub struct InstallFont;

impl Task for InstallFont {
    fn name(&self) -> &'static str {
        "Install font"
    }

    fn optional(&self) -> bool {
        true
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.settings.pkg_install
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        install_optional(ctx, "font", ctx.manifest.optional.font.as_ref())
    }
}

/// Install the prompt utility.
#[derive(Debug)]
pub struct InstallPrompt;

impl Task for InstallPrompt {
    fn name(&self) -> &'static str {
        "Install prompt"
    }

    fn optional(&self) -> bool {
        true
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.settings.pkg_install
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        install_optional(ctx, "prompt", ctx.manifest.optional.prompt.as_ref())
    }
}

/// Install a single optional tool unless one of its probes finds it.
fn install_optional(ctx: &Context, what: &str, spec: Option<&PackageSpec>) -> Result<TaskResult> {
    let Some(spec) = spec else {
        return Ok(TaskResult::Skipped(format!("no {what} configured")));
    };
    let Some(manager) = ctx.platform.package_manager else {
        return Ok(TaskResult::Skipped("no supported package manager".to_string()));
    };
    let Some(name) = spec.name_for(manager) else {
        return Ok(TaskResult::Skipped(format!("no {what} package for {manager}")));
    };

    if is_present(ctx, spec, name, manager)? {
        ctx.log.info(&format!("{what} already installed: {name}"));
        return Ok(TaskResult::Ok);
    }

    let resource = PackageResource::new(name.to_string(), manager, &*ctx.executor);
    if ctx.dry_run {
        ctx.log
            .dry_run(&format!("would install {what}: {}", resource.description()));
        return Ok(TaskResult::DryRun);
    }
    if !ctx.confirm(&format!("Install {what} {name} with {manager}?")) {
        return Ok(TaskResult::Skipped("installation declined".to_string()));
    }
    resource.apply()?;
    ctx.log.info(&format!("installed {what}: {name}"));
    Ok(TaskResult::Ok)
}

/// Probe in order: executable on `PATH`, font family in `fc-list`, then the
/// manager's installed set.
fn is_present(
    ctx: &Context,
    spec: &PackageSpec,
    name: &str,
    manager: PackageManager,
) -> Result<bool> {
    if let Some(bin) = spec.bin() {
        return Ok(ctx.executor.which(bin));
    }
    if let Some(family) = spec.family()
        && ctx.executor.which("fc-list")
    {
        let out = ctx.executor.run_unchecked("fc-list", &[":", "family"])?;
        if out.success && out.stdout.lines().any(|l| l.contains(family)) {
            return Ok(true);
        }
    }
    let installed = get_installed_packages(manager, &*ctx.executor)?;
    Ok(PackageResource::new(name.to_string(), manager, &*ctx.executor)
        .state_from_installed(&installed)
        == crate::resources::ResourceState::Correct)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::logging::TaskStatus;
    use crate::platform::{Os, Platform};
    use crate::prompt::MockPrompt;
    use crate::resources::test_helpers::MockExecutor;
    use crate::tasks::execute;
    use crate::tasks::test_helpers::ContextBuilder;

    fn apt() -> Platform {
        Platform::new(Os::Linux, Some(PackageManager::Apt))
    }

    fn builder(exec: &Arc<MockExecutor>) -> ContextBuilder {
        ContextBuilder::new()
            .platform(apt())
            .settings(|s| s.pkg_install = true)
            .executor(Arc::clone(exec) as Arc<dyn crate::exec::Executor>)
    }

    #[test]
    fn gated_by_pkg_install() {
        let b = ContextBuilder::new();
        let ctx = b.build();
        assert!(!InstallPackages.should_run(&ctx));
        assert!(!InstallFont.should_run(&ctx));
        assert!(!InstallPrompt.should_run(&ctx));
    }

    #[test]
    fn skipped_without_package_manager() {
        let b = ContextBuilder::new().settings(|s| s.pkg_install = true);
        let result = InstallPackages.run(&b.build()).unwrap();
        assert!(matches!(result, TaskResult::Skipped(_)));
    }

    #[test]
    fn installs_only_missing_packages_in_one_batch() {
        let exec = Arc::new(MockExecutor::with_responses(vec![
            (true, "git\nzsh\n".to_string()),
            (true, String::new()),
        ]));
        let b = builder(&exec);
        let result = InstallPackages.run(&b.build()).unwrap();
        assert!(matches!(result, TaskResult::Ok));
        let calls = exec.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("dpkg-query"));
        assert_eq!(calls[1], "sudo apt-get install -y stow curl");
    }

    #[test]
    fn nothing_to_install_runs_only_the_query() {
        let exec = Arc::new(MockExecutor::ok("git\nstow\nzsh\ncurl\n"));
        let b = builder(&exec);
        InstallPackages.run(&b.build()).unwrap();
        assert_eq!(exec.call_count(), 1);
    }

    #[test]
    fn dry_run_does_not_install() {
        let exec = Arc::new(MockExecutor::ok(""));
        let b = builder(&exec).dry_run(true);
        let result = InstallPackages.run(&b.build()).unwrap();
        assert!(matches!(result, TaskResult::DryRun));
        assert_eq!(exec.call_count(), 1, "only the installed-set query");
    }

    #[test]
    fn declined_prompt_skips_install() {
        let exec = Arc::new(MockExecutor::ok(""));
        let mut prompt = MockPrompt::new();
        prompt.expect_confirm().times(1).returning(|_| Ok(false));
        let b = builder(&exec).prompt(Arc::new(prompt));
        let result = InstallPackages.run(&b.build()).unwrap();
        assert!(matches!(result, TaskResult::Skipped(_)));
        assert_eq!(exec.call_count(), 1);
    }

    #[test]
    fn yes_flag_bypasses_prompt() {
        let exec = Arc::new(MockExecutor::with_responses(vec![
            (true, String::new()),
            (true, String::new()),
        ]));
        let mut prompt = MockPrompt::new();
        prompt.expect_confirm().never();
        let b = builder(&exec)
            .settings(|s| s.yes = true)
            .prompt(Arc::new(prompt));
        InstallPackages.run(&b.build()).unwrap();
        assert_eq!(exec.call_count(), 2);
    }

    #[test]
    fn failed_install_is_recorded_as_skipped() {
        let exec = Arc::new(MockExecutor::with_responses(vec![
            (true, String::new()),
            (false, String::new()),
        ]));
        let b = builder(&exec);
        execute(&InstallPackages, &b.build());
        let entries = b.log().task_entries();
        assert_eq!(entries[0].status, TaskStatus::Skipped);
    }

    #[test]
    fn prompt_found_on_path_is_not_reinstalled() {
        let exec = Arc::new(MockExecutor::with_responses(vec![]).with_which_programs(&["starship"]));
        let b = builder(&exec);
        let result = InstallPrompt.run(&b.build()).unwrap();
        assert!(matches!(result, TaskResult::Ok));
        assert_eq!(exec.call_count(), 0);
    }

    #[test]
    fn missing_prompt_is_installed() {
        let exec = Arc::new(MockExecutor::ok(""));
        let b = builder(&exec);
        InstallPrompt.run(&b.build()).unwrap();
        assert_eq!(exec.calls(), vec!["sudo apt-get install -y starship".to_string()]);
    }

    #[test]
    fn font_family_probe_through_fc_list() {
        let exec = Arc::new(
            MockExecutor::ok("DejaVu Sans\nFira Code,Fira Code Light\n")
                .with_which_programs(&["fc-list"]),
        );
        let b = builder(&exec);
        let result = InstallFont.run(&b.build()).unwrap();
        assert!(matches!(result, TaskResult::Ok));
        assert_eq!(exec.calls(), vec!["fc-list : family".to_string()]);
    }

    #[test]
    fn font_falls_back_to_installed_set() {
        let exec = Arc::new(MockExecutor::with_responses(vec![
            (true, String::new()),
            (true, String::new()),
        ]));
        let b = builder(&exec);
        InstallFont.run(&b.build()).unwrap();
        assert_eq!(exec.calls()[1], "sudo apt-get install -y fonts-firacode");
    }

    #[test]
    fn unconfigured_font_is_skipped() {
        let exec = Arc::new(MockExecutor::with_responses(vec![]));
        let b = builder(&exec).manifest(|m| m.optional.font = None);
        let result = InstallFont.run(&b.build()).unwrap();
        assert!(matches!(result, TaskResult::Skipped(_)));
    }
}
