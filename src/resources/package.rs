//! System package installation resource.
use std::collections::HashSet;

use anyhow::Result;

use super::{Applicable, ResourceState};
use crate::exec::Executor;

/// Supported package managers, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    /// Debian/Ubuntu (`apt-get`).
    Apt,
    /// Fedora/RHEL (`dnf`).
    Dnf,
    /// Arch Linux (`pacman`).
    Pacman,
    /// openSUSE (`zypper`).
    Zypper,
    /// Alpine (`apk`).
    Apk,
    /// Homebrew on macOS or Linux (`brew`).
    Brew,
}

impl PackageManager {
    /// All managers in the order they are probed.
    pub const ALL: [Self; 6] = [
        Self::Apt,
        Self::Dnf,
        Self::Pacman,
        Self::Zypper,
        Self::Apk,
        Self::Brew,
    ];

    /// Key used for this manager in `dotstow.toml` package tables.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Pacman => "pacman",
            Self::Zypper => "zypper",
            Self::Apk => "apk",
            Self::Brew => "brew",
        }
    }

    /// Executable probed on `PATH` to detect this manager.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            other => other.key(),
        }
    }

    /// Return the first manager whose executable is on `PATH`.
    #[must_use]
    pub fn detect(executor: &dyn Executor) -> Option<Self> {
        Self::ALL.into_iter().find(|m| executor.which(m.program()))
    }

    /// Full install command line (program first) for `names`.
    ///
    /// Every manager except Homebrew is run through `sudo`; all of them are
    /// passed their non-interactive flag.
    #[must_use]
    pub fn install_command<'a>(self, names: &[&'a str]) -> Vec<&'a str> {
        let mut cmd: Vec<&str> = match self {
            Self::Apt => vec!["sudo", "apt-get", "install", "-y"],
            Self::Dnf => vec!["sudo", "dnf", "install", "-y"],
            Self::Pacman => vec!["sudo", "pacman", "-S", "--needed", "--noconfirm"],
            Self::Zypper => vec!["sudo", "zypper", "--non-interactive", "install"],
            Self::Apk => vec!["sudo", "apk", "add"],
            Self::Brew => vec!["brew", "install"],
        };
        cmd.extend_from_slice(names);
        cmd
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A system package resource that can be checked and installed.
#[derive(Debug)]
pub struct PackageResource<'a> {
    /// Package name as known to `manager`.
    pub name: String,
    /// Package manager to use.
    pub manager: PackageManager,
    executor: &'a dyn Executor,
}

impl<'a> PackageResource<'a> {
    /// Create a new package resource.
    #[must_use]
    pub const fn new(name: String, manager: PackageManager, executor: &'a dyn Executor) -> Self {
        Self {
            name,
            manager,
            executor,
        }
    }

    /// Determine the resource state from a pre-fetched set of installed package names.
    #[must_use]
    pub fn state_from_installed(&self, installed: &HashSet<String>) -> ResourceState {
        if installed.contains(&self.name) {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        }
    }
}

impl Applicable for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.name, self.manager)
    }

    fn apply(&self) -> Result<()> {
        batch_install(self.manager, &[self.name.as_str()], self.executor)
    }
}

/// Query the full set of installed package names for a given manager.
///
/// Runs a **single** command regardless of how many packages need to be
/// checked.  A failing query yields an empty set, so every package is then
/// treated as missing and handed to the (idempotent) install command.
///
/// # Errors
///
/// Returns an error if the query program cannot be spawned.
pub fn get_installed_packages(
    manager: PackageManager,
    executor: &dyn Executor,
) -> Result<HashSet<String>> {
    let (program, args): (&str, &[&str]) = match manager {
        PackageManager::Apt => ("dpkg-query", &["-W", "-f=${Package}\n"][..]),
        PackageManager::Dnf | PackageManager::Zypper => ("rpm", &["-qa", "--qf", "%{NAME}\n"][..]),
        PackageManager::Pacman => ("pacman", &["-Qq"][..]),
        PackageManager::Apk => ("apk", &["info"][..]),
        PackageManager::Brew => ("brew", &["list", "-1"][..]),
    };
    let result = executor.run_unchecked(program, args)?;
    let mut set = HashSet::new();
    if result.success {
        for line in result.stdout.lines() {
            if let Some(name) = line.split_whitespace().next() {
                set.insert(name.to_string());
            }
        }
    }
    Ok(set)
}

/// Install a batch of packages with a single manager invocation.
///
/// # Errors
///
/// Returns an error if the install command fails.
pub fn batch_install(
    manager: PackageManager,
    names: &[&str],
    executor: &dyn Executor,
) -> Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    let cmd = manager.install_command(names);
    if let Some((program, args)) = cmd.split_first() {
        executor.run(program, args)?;
    }
    Ok(())
}
