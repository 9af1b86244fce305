use std::path::Path;
use std::sync::Arc;

use crate::backup::BackupArchive;
use crate::config::Settings;
use crate::config::manifest::Manifest;
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;
use crate::prompt::Prompt;
use crate::scanner::Package;

/// Shared context for task execution.
pub struct Context {
    /// Resolved run settings.
    pub settings: Arc<Settings>,
    /// Repository manifest.
    pub manifest: Arc<Manifest>,
    /// Packages selected for this run (after `--package`).
    pub packages: Arc<Vec<Package>>,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Confirmation prompt.
    pub prompt: Arc<dyn Prompt>,
    /// Backup archive for this run.
    pub backup: Arc<BackupArchive>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings)
            .field("packages", &self.packages.len())
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("executor", &self.executor)
            .field("prompt", &"<dyn Prompt>")
            .field("backup", &self.backup)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Creates a new context for task execution.
    ///
    /// The backup archive is opened at `settings.backup_root` with a run
    /// stamp taken now.
    #[must_use]
    pub fn new(
        settings: Settings,
        manifest: Manifest,
        packages: Vec<Package>,
        platform: Platform,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        prompt: Arc<dyn Prompt>,
    ) -> Self {
        let backup = BackupArchive::new(&settings.backup_root, &settings.target_root);
        Self {
            dry_run: settings.dry_run,
            settings: Arc::new(settings),
            manifest: Arc::new(manifest),
            packages: Arc::new(packages),
            platform: Arc::new(platform),
            log,
            executor,
            prompt,
            backup: Arc::new(backup),
        }
    }

    /// Root of the configuration repository.
    #[must_use]
    pub fn repo(&self) -> &Path {
        &self.settings.repo
    }

    /// Root under which links are placed.
    #[must_use]
    pub fn target_root(&self) -> &Path {
        &self.settings.target_root
    }

    /// Ask the user to confirm `question`, unless `--yes` was given.
    ///
    /// A prompt that cannot be answered (closed terminal) counts as "no".
    #[must_use]
    pub fn confirm(&self, question: &str) -> bool {
        if self.settings.yes {
            return true;
        }
        match self.prompt.confirm(question) {
            Ok(answer) => answer,
            Err(e) => {
                self.log.warn(&format!("cannot read answer: {e:#}"));
                false
            }
        }
    }
}
