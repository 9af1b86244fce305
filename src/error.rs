//! Domain-specific error types for the dotstow engine.
//!
//! Internal modules return typed errors (e.g., [`ScanError`], [`StowError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DotstowError
//! ├── Preflight(PreflightError) — unsafe or unsatisfiable preconditions
//! ├── Config(ConfigError)       — repository manifest loading
//! ├── Scan(ScanError)           — package discovery
//! ├── Stow(StowError)           — symlink-farm manager invocations
//! └── Backup(BackupError)       — backup archive and restore
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the dotstow engine.
#[derive(Error, Debug)]
pub enum DotstowError {
    /// A precondition for running the command is not met.
    #[error("Preflight check failed: {0}")]
    Preflight(#[from] PreflightError),

    /// The repository manifest could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Package discovery failed.
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// A stow invocation failed or reported conflicts that cannot be resolved.
    #[error("Stow error: {0}")]
    Stow(#[from] StowError),

    /// A backup or restore operation failed.
    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),
}

/// Conditions that abort a command before any task runs.
#[derive(Error, Debug)]
pub enum PreflightError {
    /// The process is running with superuser privileges.
    #[error("refusing to run as root; run as the user who owns the dotfiles")]
    RunningAsRoot,

    /// A tool the command cannot work without is not on `PATH`.
    #[error("required tool not found on PATH: {0}")]
    MissingTool(String),

    /// The `HOME` environment variable is not set.
    #[error("HOME environment variable is not set")]
    NoHome,
}

/// Errors that arise from loading `dotstow.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The manifest file could not be read.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest contains invalid TOML or unexpected keys.
    #[error("Invalid TOML in {file}: {message}")]
    InvalidSyntax {
        /// File that failed to parse.
        file: String,
        /// Parser message.
        message: String,
    },
}

/// Errors that arise while scanning the configuration repository.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The configuration repository does not exist or is not a directory.
    #[error("configuration repository not found: {}", .0.display())]
    RepoNotFound(PathBuf),

    /// A directory listing failed.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        /// Directory that could not be listed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// `--package` named a directory that is not a detected package.
    #[error("unknown package '{name}' (detected: {available})")]
    UnknownPackage {
        /// The requested package name.
        name: String,
        /// Comma-separated list of detected packages.
        available: String,
    },
}

/// Errors reported by the symlink-farm manager.
#[derive(Error, Debug)]
pub enum StowError {
    /// Stow exited non-zero without reporting conflicts.
    #[error("stow {action} '{package}' failed: {stderr}")]
    Failed {
        /// The attempted action (`simulate`, `restow`, `delete`).
        action: &'static str,
        /// Package name.
        package: String,
        /// Trimmed stderr of the stow process.
        stderr: String,
    },

    /// Stow reported a conflict that cannot be resolved by backing up a file.
    #[error("unresolvable conflict in '{package}': {detail}")]
    Unresolvable {
        /// Package name.
        package: String,
        /// Conflict description as reported by stow.
        detail: String,
    },
}

/// Errors that arise from the backup archive.
#[derive(Error, Debug)]
pub enum BackupError {
    /// Copying a file or directory into the backup run failed.
    #[error("cannot back up {}: {source}", .path.display())]
    Copy {
        /// Path being backed up.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The backup copy does not match the original byte-for-byte.
    #[error("backup of {} does not match the original", .0.display())]
    Mismatch(PathBuf),

    /// The path is not below the target root, so a backup of it could not
    /// be restored.
    #[error("refusing to back up {}: outside the target root", .0.display())]
    OutsideTarget(PathBuf),

    /// No previous backup run exists to restore from.
    #[error("no backup found under {}", .0.display())]
    NothingToRestore(PathBuf),
}
