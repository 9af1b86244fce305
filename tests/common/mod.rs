// Shared helpers for integration tests.
//
// Provides a temporary home directory and configuration repository, plus a
// builder for `dotstow` invocations that points every path-related
// environment variable into the sandbox.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// An isolated home directory and dotfiles repository backed by a
/// [`tempfile::TempDir`].
pub struct Sandbox {
    /// Temporary directory holding `home/` and `repo/`.
    pub root: tempfile::TempDir,
}

impl Sandbox {
    /// Create empty `home/` and `repo/` directories.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("home")).expect("create home");
        std::fs::create_dir_all(root.path().join("repo")).expect("create repo");
        Self { root }
    }

    /// Link-target root.
    pub fn home(&self) -> PathBuf {
        dunce::canonicalize(self.root.path().join("home")).expect("canonical home")
    }

    /// Configuration repository.
    pub fn repo(&self) -> PathBuf {
        dunce::canonicalize(self.root.path().join("repo")).expect("canonical repo")
    }

    /// Default backup root.
    pub fn backups(&self) -> PathBuf {
        self.home().join(".dotfiles_backup")
    }

    /// `dotstow` with `args`, confined to the sandbox.
    pub fn dotstow(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_dotstow"))
            .args(args)
            .env("HOME", self.home())
            .env("DOTFILES_DIR", self.repo())
            .env_remove("DOTFILES_TARGET")
            .env_remove("DOTFILES_BACKUP_DIR")
            .output()
            .expect("run dotstow")
    }

    /// Every backup run directory, oldest first.
    pub fn backup_runs(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(self.backups()) else {
            return Vec::new();
        };
        let mut runs: Vec<PathBuf> = entries.map(|e| e.expect("entry").path()).collect();
        runs.sort();
        runs
    }
}

/// Fluent builder for [`Sandbox`].
pub struct SandboxBuilder {
    sandbox: Sandbox,
}

impl SandboxBuilder {
    /// Begin building an empty sandbox.
    pub fn new() -> Self {
        Self {
            sandbox: Sandbox::new(),
        }
    }

    /// Add package `name` with `files` (paths relative to the package).
    pub fn with_package(self, name: &str, files: &[(&str, &str)]) -> Self {
        let dir = self.sandbox.repo().join(name);
        write_files(&dir, files);
        self
    }

    /// Write a real file under the home directory.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        write_files(&self.sandbox.home(), &[(rel, content)]);
        self
    }

    /// Write `dotstow.toml` at the repository root.
    pub fn with_manifest(self, content: &str) -> Self {
        std::fs::write(self.sandbox.repo().join("dotstow.toml"), content)
            .expect("write manifest");
        self
    }

    /// Finish building and return the sandbox.
    pub fn build(self) -> Sandbox {
        self.sandbox
    }
}

fn write_files(dir: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, content).expect("write file");
    }
}

/// Whether the tests run as the superuser, which `dotstow` refuses.
pub fn running_as_root() -> bool {
    Command::new("id")
        .arg("-u")
        .output()
        .is_ok_and(|o| String::from_utf8_lossy(&o.stdout).trim() == "0")
}

/// Whether end-to-end runs are possible: GNU Stow on `PATH` and an
/// unprivileged user.
pub fn can_deploy() -> bool {
    which::which("stow").is_ok() && !running_as_root()
}

/// Combined stdout and stderr of a run.
pub fn output_text(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}
