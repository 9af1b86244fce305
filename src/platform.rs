//! Host detection: operating system, package manager and privilege level.
use std::fmt;

use crate::exec::Executor;
use crate::resources::package::PackageManager;

/// Detected operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux and other non-macOS Unix systems.
    Linux,
    /// macOS.
    MacOs,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Operating system family.
    pub os: Os,
    /// First package manager found on `PATH`, if any.
    pub package_manager: Option<PackageManager>,
}

impl Platform {
    /// Detect the current platform, probing `PATH` through `executor`.
    #[must_use]
    pub fn detect(executor: &dyn Executor) -> Self {
        Self {
            os: Self::detect_os(),
            package_manager: PackageManager::detect(executor),
        }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(os: Os, package_manager: Option<PackageManager>) -> Self {
        Self {
            os,
            package_manager,
        }
    }

    const fn detect_os() -> Os {
        if cfg!(target_os = "macos") {
            Os::MacOs
        } else {
            Os::Linux
        }
    }
}

/// Return `true` if the effective user is the superuser.
///
/// Asks `id -u`; if `id` cannot be run the user is assumed unprivileged.
#[must_use]
pub fn is_superuser(executor: &dyn Executor) -> bool {
    executor
        .run_unchecked("id", &["-u"])
        .is_ok_and(|r| r.success && r.stdout.trim() == "0")
}
