//! Run settings and the repository manifest.
//!
//! [`Settings`] is resolved once per invocation from command-line flags and
//! environment variables; [`manifest::Manifest`] comes from the optional
//! `dotstow.toml` at the repository root.
pub mod manifest;
pub mod toml_loader;

use std::path::PathBuf;

use crate::cli::{GlobalOpts, InstallOpts, LinkTarget, UninstallOpts};
use crate::error::PreflightError;

/// Name of the backup directory under the target root.
pub const DEFAULT_BACKUP_DIR: &str = ".dotfiles_backup";

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Configuration repository (the stow directory).
    pub repo: PathBuf,
    /// Root under which links are placed and backups are made relative to.
    pub target_root: PathBuf,
    /// Directory holding timestamped backup runs.
    pub backup_root: PathBuf,
    /// Which link roots to stow into.
    pub link_target: LinkTarget,
    /// Restrict the run to this package.
    pub package: Option<String>,
    /// Preview only.
    pub dry_run: bool,
    /// Auto-confirm prompts.
    pub yes: bool,
    /// Replace conflicting files without asking.
    pub force: bool,
    /// Install system packages, font and prompt.
    pub pkg_install: bool,
    /// Restore the latest backup after unlinking.
    pub restore_last: bool,
    /// Task name filters (`--skip`).
    pub skip: Vec<String>,
    /// Task name filters (`--only`).
    pub only: Vec<String>,
    /// `--log` file.
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from flags and the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`PreflightError::NoHome`] if `HOME` is unset.
    pub fn resolve(global: &GlobalOpts) -> Result<Self, PreflightError> {
        Self::resolve_with(global, |key| std::env::var(key).ok())
    }

    /// Resolve settings using `env` to look up environment variables.
    ///
    /// Empty values count as unset. Lookup order:
    ///
    /// - repository: `--repo`, `$DOTFILES_DIR`, `$HOME/dotfiles`
    /// - target root: `$DOTFILES_TARGET`, `$HOME`
    /// - backup root: `$DOTFILES_BACKUP_DIR`, `<target root>/.dotfiles_backup`
    ///
    /// # Errors
    ///
    /// Returns [`PreflightError::NoHome`] if `HOME` is unset.
    pub fn resolve_with(
        global: &GlobalOpts,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, PreflightError> {
        let var = |key: &str| env(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        let home = var("HOME").ok_or(PreflightError::NoHome)?;

        let repo = global
            .repo
            .clone()
            .or_else(|| var("DOTFILES_DIR"))
            .unwrap_or_else(|| home.join("dotfiles"));
        let target_root = var("DOTFILES_TARGET").unwrap_or(home);
        let backup_root =
            var("DOTFILES_BACKUP_DIR").unwrap_or_else(|| target_root.join(DEFAULT_BACKUP_DIR));

        Ok(Self {
            repo: canonical(repo),
            target_root: canonical(target_root),
            backup_root,
            link_target: global.target,
            package: global.package.clone(),
            dry_run: global.dry_run,
            yes: global.yes,
            force: false,
            pkg_install: false,
            restore_last: false,
            skip: Vec::new(),
            only: Vec::new(),
            log_file: global.log.clone(),
        })
    }

    /// Apply `install` options.
    #[must_use]
    pub fn with_install(mut self, opts: &InstallOpts) -> Self {
        self.force = opts.force;
        self.pkg_install = opts.pkg_install.enabled();
        self.skip.clone_from(&opts.skip);
        self.only.clone_from(&opts.only);
        self
    }

    /// Apply `uninstall` options.
    #[must_use]
    pub const fn with_uninstall(mut self, opts: &UninstallOpts) -> Self {
        self.restore_last = opts.restore_last;
        self
    }

    /// Directories passed to stow as `--target`, in order.
    #[must_use]
    pub fn link_roots(&self) -> Vec<PathBuf> {
        let config = self.target_root.join(".config");
        match self.link_target {
            LinkTarget::Home => vec![self.target_root.clone()],
            LinkTarget::Config => vec![config],
            LinkTarget::Both => vec![self.target_root.clone(), config],
        }
    }

    /// Return `true` if the task named `name` passes `--skip`/`--only`.
    ///
    /// Matching is a case-insensitive substring test on the task name.
    #[must_use]
    pub fn task_selected(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        let hit = |filters: &[String]| {
            filters
                .iter()
                .any(|f| lower.contains(&f.to_lowercase()))
        };
        if hit(&self.skip) {
            return false;
        }
        self.only.is_empty() || hit(&self.only)
    }
}

fn canonical(path: PathBuf) -> PathBuf {
    dunce::canonicalize(&path).unwrap_or(path)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_derive_from_home() {
        let s = Settings::resolve_with(
            &GlobalOpts::default(),
            env_of(&[("HOME", "/nonexistent/home")]),
        )
        .unwrap();
        assert_eq!(s.repo, PathBuf::from("/nonexistent/home/dotfiles"));
        assert_eq!(s.target_root, PathBuf::from("/nonexistent/home"));
        assert_eq!(
            s.backup_root,
            PathBuf::from("/nonexistent/home/.dotfiles_backup")
        );
        assert!(!s.pkg_install);
    }

    #[test]
    fn environment_overrides() {
        let s = Settings::resolve_with(
            &GlobalOpts::default(),
            env_of(&[
                ("HOME", "/nonexistent/home"),
                ("DOTFILES_DIR", "/nonexistent/dots"),
                ("DOTFILES_TARGET", "/nonexistent/target"),
                ("DOTFILES_BACKUP_DIR", ""),
            ]),
        )
        .unwrap();
        assert_eq!(s.repo, PathBuf::from("/nonexistent/dots"));
        assert_eq!(s.target_root, PathBuf::from("/nonexistent/target"));
        assert_eq!(
            s.backup_root,
            PathBuf::from("/nonexistent/target/.dotfiles_backup"),
            "empty value counts as unset"
        );
    }

    #[test]
    fn repo_flag_wins_over_environment() {
        let global = GlobalOpts {
            repo: Some(PathBuf::from("/nonexistent/flag")),
            ..GlobalOpts::default()
        };
        let s = Settings::resolve_with(
            &global,
            env_of(&[("HOME", "/h"), ("DOTFILES_DIR", "/nonexistent/env")]),
        )
        .unwrap();
        assert_eq!(s.repo, PathBuf::from("/nonexistent/flag"));
    }

    #[test]
    fn missing_home_is_error() {
        let err = Settings::resolve_with(&GlobalOpts::default(), env_of(&[])).unwrap_err();
        assert!(matches!(err, PreflightError::NoHome));
    }

    #[test]
    fn link_roots_follow_target_flag() {
        let mut s =
            Settings::resolve_with(&GlobalOpts::default(), env_of(&[("HOME", "/nonexistent")]))
                .unwrap();
        assert_eq!(s.link_roots(), vec![PathBuf::from("/nonexistent")]);
        s.link_target = LinkTarget::Config;
        assert_eq!(s.link_roots(), vec![PathBuf::from("/nonexistent/.config")]);
        s.link_target = LinkTarget::Both;
        assert_eq!(s.link_roots().len(), 2);
    }

    #[test]
    fn task_filters_are_case_insensitive_substrings() {
        let s = Settings::resolve_with(&GlobalOpts::default(), env_of(&[("HOME", "/h")]))
            .unwrap()
            .with_install(&InstallOpts {
                skip: vec!["FONT".to_string()],
                ..InstallOpts::default()
            });
        assert!(!s.task_selected("Install font"));
        assert!(s.task_selected("Link packages"));

        let only = Settings {
            only: vec!["link".to_string()],
            skip: Vec::new(),
            ..s
        };
        assert!(only.task_selected("Link packages"));
        assert!(!only.task_selected("Install prompt"));
    }
}
