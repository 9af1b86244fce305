//! Test command implementation.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Logger;
use crate::resources::stow::StowPackage;
use crate::tasks::{Context, Task, TaskResult};

/// Run the test/validation command.
///
/// Every check is read-only; `stow` is only ever run in simulation mode.
///
/// # Errors
///
/// Returns an error if a preflight check fails or any validation task fails.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let settings = Settings::resolve(global)?;
    let setup = super::CommandSetup::init(settings, &*executor, log)?;
    let ctx = setup.into_context(log, executor);

    let tasks: Vec<Box<dyn Task>> = vec![
        Box::new(ValidateRepository),
        Box::new(CheckStow),
        Box::new(SimulateLinks),
    ];

    super::run_tasks_to_completion(tasks.iter().map(Box::as_ref), &ctx, log)
}

// ---------------------------------------------------------------------------
// Validation tasks
// ---------------------------------------------------------------------------

/// The repository holds at least one package.
#[derive(Debug)]
struct ValidateRepository;

impl Task for ValidateRepository {
    fn name(&self) -> &'static str {
        "Validate repository"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.packages.is_empty() {
            anyhow::bail!("no packages found in {}", ctx.repo().display());
        }
        for pkg in &*ctx.packages {
            let markers = pkg
                .markers
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            ctx.log.debug(&format!("{}: {markers}", pkg.name));
        }
        ctx.log
            .info(&format!("{} package(s) detected", ctx.packages.len()));
        Ok(TaskResult::Ok)
    }
}

/// `stow` is installed.
#[derive(Debug)]
struct CheckStow;

impl Task for CheckStow {
    fn name(&self) -> &'static str {
        "Check stow"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if !ctx.executor.which("stow") {
            anyhow::bail!("stow not found on PATH");
        }
        let out = ctx.executor.run_unchecked("stow", &["--version"])?;
        if let Some(line) = out.stdout.lines().next() {
            ctx.log.info(line.trim());
        }
        Ok(TaskResult::Ok)
    }
}

/// Every package simulates without unresolvable conflicts.
#[derive(Debug)]
struct SimulateLinks;

impl Task for SimulateLinks {
    fn name(&self) -> &'static str {
        "Simulate links"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.packages.is_empty() && ctx.executor.which("stow")
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut blocking = 0u32;
        for root in ctx.settings.link_roots() {
            if !root.is_dir() {
                ctx.log
                    .debug(&format!("{} does not exist yet", root.display()));
                continue;
            }
            for pkg in &*ctx.packages {
                let stow = StowPackage::new(pkg.name.as_str(), ctx.repo(), &root, &*ctx.executor);
                let sim = stow.simulate()?;
                for conflict in &sim.conflicts {
                    if conflict.is_resolvable() {
                        ctx.log.warn(&format!(
                            "{}: {} would be backed up and replaced",
                            pkg.name,
                            conflict.path.display()
                        ));
                    } else {
                        ctx.log.error(&format!("{}: {}", pkg.name, conflict.detail));
                        blocking += 1;
                    }
                }
            }
        }
        if blocking > 0 {
            anyhow::bail!("{blocking} unresolvable conflict(s)");
        }
        ctx.log.info("all packages can be linked");
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::{MockExecutor, result};
    use crate::tasks::test_helpers::ContextBuilder;

    #[test]
    fn empty_repository_fails_validation() {
        let b = ContextBuilder::new();
        let err = ValidateRepository.run(&b.build()).unwrap_err();
        assert!(err.to_string().starts_with("no packages found"));
    }

    #[test]
    fn repository_with_package_passes() {
        let b = ContextBuilder::new().package("zsh", &[(".zshrc", "")]);
        assert!(matches!(
            ValidateRepository.run(&b.build()).unwrap(),
            TaskResult::Ok
        ));
    }

    #[test]
    fn check_stow_fails_without_stow() {
        let b = ContextBuilder::new();
        assert!(CheckStow.run(&b.build()).is_err());
    }

    #[test]
    fn check_stow_reports_version() {
        let exec = MockExecutor::ok("stow (GNU Stow) version 2.3.1\n").with_which(true);
        let b = ContextBuilder::new().executor(Arc::new(exec));
        assert!(matches!(CheckStow.run(&b.build()).unwrap(), TaskResult::Ok));
    }

    #[test]
    fn unresolvable_conflict_fails_simulation() {
        let exec = MockExecutor::with_results(vec![result(
            false,
            "",
            "  * existing target is stowed to a different package: .zshrc => x/.zshrc\n",
        )])
        .with_which(true);
        let b = ContextBuilder::new()
            .executor(Arc::new(exec))
            .package("zsh", &[(".zshrc", "")]);
        let err = SimulateLinks.run(&b.build()).unwrap_err();
        assert_eq!(err.to_string(), "1 unresolvable conflict(s)");
    }

    #[test]
    fn resolvable_conflict_is_only_a_warning() {
        let exec = MockExecutor::with_results(vec![result(
            false,
            "",
            "  * existing target is neither a link nor a directory: .zshrc\n",
        )])
        .with_which(true);
        let b = ContextBuilder::new()
            .executor(Arc::new(exec))
            .package("zsh", &[(".zshrc", "")]);
        assert!(matches!(SimulateLinks.run(&b.build()).unwrap(), TaskResult::Ok));
    }
}
