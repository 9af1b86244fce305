//! Top-level subcommand orchestration.
pub mod install;
pub mod test;
pub mod uninstall;

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::config::manifest::Manifest;
use crate::error::{PreflightError, ScanError};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::platform::{self, Platform};
use crate::prompt::{AutoConfirm, Prompt, TerminalPrompt};
use crate::resources::package::batch_install;
use crate::scanner::{self, Package};
use crate::tasks::{self, Context, Task};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates the preflight checks, manifest loading, package scanning
/// and platform detection so that each command does not have to repeat the
/// boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Resolved settings.
    pub settings: Settings,
    /// Repository manifest.
    pub manifest: Manifest,
    /// Packages selected for this run.
    pub packages: Vec<Package>,
    /// Detected platform.
    pub platform: Platform,
}

impl CommandSetup {
    /// Run the preflight checks and gather everything a command needs.
    ///
    /// # Errors
    ///
    /// Returns an error if running as the superuser, if the repository does
    /// not exist, if the manifest is invalid, or if `--package` names an
    /// unknown package.
    pub fn init(settings: Settings, executor: &dyn Executor, log: &Logger) -> Result<Self> {
        if platform::is_superuser(executor) {
            return Err(PreflightError::RunningAsRoot.into());
        }
        if !settings.repo.is_dir() {
            return Err(ScanError::RepoNotFound(settings.repo.clone()).into());
        }

        log.stage("Scanning repository");
        let manifest = Manifest::load(&settings.repo)?;
        let found = scanner::scan(&settings.repo, &manifest.scan.ignore)?;
        log.debug(&format!(
            "detected packages: {}",
            found
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
        let packages = scanner::select(found, settings.package.as_deref())?;
        log.info(&format!(
            "{} package(s) in {}",
            packages.len(),
            settings.repo.display()
        ));

        let platform = Platform::detect(executor);
        match platform.package_manager {
            Some(pm) => log.debug(&format!("platform: {}, package manager: {pm}", platform.os)),
            None => log.debug(&format!(
                "platform: {}, no supported package manager found",
                platform.os
            )),
        }

        Ok(Self {
            settings,
            manifest,
            packages,
            platform,
        })
    }

    /// Make sure `stow` is on `PATH`, installing it first when package
    /// installation is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`PreflightError::MissingTool`] if stow is absent and cannot
    /// be installed.
    pub fn ensure_stow(&self, executor: &dyn Executor, log: &Logger) -> Result<()> {
        if executor.which("stow") {
            return Ok(());
        }
        if let Some(pm) = self.platform.package_manager
            && self.settings.pkg_install
            && !self.settings.dry_run
        {
            log.info(&format!("stow not found, installing it with {pm}"));
            batch_install(pm, &["stow"], executor).context("install stow")?;
            if executor.which("stow") {
                return Ok(());
            }
        }
        Err(PreflightError::MissingTool("stow".to_string()).into())
    }

    /// Build the task context for this run.
    #[must_use]
    pub fn into_context(self, log: &Arc<Logger>, executor: Arc<dyn Executor>) -> Context {
        let prompt: Arc<dyn Prompt> = if self.settings.yes {
            Arc::new(AutoConfirm)
        } else {
            Arc::new(TerminalPrompt)
        };
        Context::new(
            self.settings,
            self.manifest,
            self.packages,
            self.platform,
            Arc::clone(log) as Arc<dyn Log>,
            executor,
            prompt,
        )
    }
}

/// Resolve settings, run the setup sequence and execute `tasks`.
///
/// `configure` applies the subcommand's own options to the settings.
///
/// # Errors
///
/// Returns an error if a preflight check fails or any task fails.
pub fn run_command(
    global: &GlobalOpts,
    log: &Arc<Logger>,
    configure: impl FnOnce(Settings) -> Settings,
    tasks: &[Box<dyn Task>],
) -> Result<()> {
    let version = option_env!("DOTSTOW_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("dotstow {version}"));

    let settings = configure(Settings::resolve(global)?);
    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let setup = CommandSetup::init(settings, &*executor, log)?;
    setup.ensure_stow(&*executor, log)?;

    if setup.settings.dry_run {
        log.info("dry run: no changes will be made");
    }
    let ctx = setup.into_context(log, executor);
    let selected = tasks
        .iter()
        .filter(|t| ctx.settings.task_selected(t.name()))
        .map(Box::as_ref);
    run_tasks_to_completion(selected, &ctx, log)
}

/// Execute every task in order, print the summary, and bail if any task failed.
///
/// # Errors
///
/// Returns an error if one or more tasks recorded a failure.
pub fn run_tasks_to_completion<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    for task in tasks {
        tasks::execute(task, ctx);
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} task(s) failed");
    }
    Ok(())
}
