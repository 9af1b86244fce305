//! GNU Stow package resource.
//!
//! Wraps the `stow` command line for a single package: a dry-run
//! simulation that reports pending links and conflicts, a restow that
//! creates or refreshes links, and a delete that removes them.
use std::path::{Path, PathBuf};

use crate::error::StowError;
use crate::exec::Executor;

/// Why stow refused to place a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// A real file (or directory where a file is expected) is in the way.
    NotLinkOrDir,
    /// A symlink not managed by stow is in the way.
    NotOwned,
    /// The path is already stowed from another package.
    OtherPackage,
    /// A conflict line this parser does not understand.
    Unknown,
}

/// A single conflict reported by a stow simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Conflicting path, relative to the stow target directory.
    pub path: PathBuf,
    /// Conflict classification.
    pub kind: ConflictKind,
    /// The raw conflict line as printed by stow.
    pub detail: String,
}

impl Conflict {
    /// Whether backing up and removing the path lets stow proceed.
    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        matches!(self.kind, ConflictKind::NotLinkOrDir | ConflictKind::NotOwned)
            && !self.path.as_os_str().is_empty()
    }
}

/// Outcome of `stow --no`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Simulation {
    /// Conflicts that would abort the real run.
    pub conflicts: Vec<Conflict>,
    /// Filesystem operations stow would perform (`LINK: …`, `MKDIR: …`).
    pub pending: Vec<String>,
}

/// One package of the configuration repository, stowed into one target directory.
#[derive(Debug)]
pub struct StowPackage<'a> {
    /// Package (top-level directory) name.
    pub package: String,
    /// Stow directory (the configuration repository).
    pub dir: PathBuf,
    /// Directory the links are placed in.
    pub target: PathBuf,
    executor: &'a dyn Executor,
}

impl<'a> StowPackage<'a> {
    /// Create a new stow package resource.
    #[must_use]
    pub fn new(
        package: impl Into<String>,
        dir: &Path,
        target: &Path,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            package: package.into(),
            dir: dir.to_path_buf(),
            target: target.to_path_buf(),
            executor,
        }
    }

    /// `<package> -> <target>`, for log messages.
    #[must_use]
    pub fn description(&self) -> String {
        format!("{} -> {}", self.package, self.target.display())
    }

    fn invoke(
        &self,
        action: &'static str,
        mode: &[&str],
    ) -> Result<crate::exec::ExecResult, StowError> {
        let dir = self.dir.to_string_lossy();
        let target = self.target.to_string_lossy();
        let mut args: Vec<&str> = mode.to_vec();
        args.extend(["--dir", &dir, "--target", &target, &self.package]);
        self.executor
            .run_unchecked("stow", &args)
            .map_err(|e| StowError::Failed {
                action,
                package: self.package.clone(),
                stderr: format!("{e:#}"),
            })
    }

    /// Ask stow what it would do, without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`StowError::Failed`] if stow cannot be run, or exits
    /// non-zero without reporting any conflict.
    pub fn simulate(&self) -> Result<Simulation, StowError> {
        let result = self.invoke("simulate", &["--no", "--verbose=1"])?;
        let simulation = Simulation {
            conflicts: parse_conflicts(&result.stderr),
            pending: parse_pending(&result.stderr),
        };
        if !result.success && simulation.conflicts.is_empty() {
            return Err(StowError::Failed {
                action: "simulate",
                package: self.package.clone(),
                stderr: result.stderr.trim().to_string(),
            });
        }
        Ok(simulation)
    }

    /// Create or refresh every link of the package.
    ///
    /// # Errors
    ///
    /// Returns [`StowError::Failed`] if stow exits non-zero.
    pub fn restow(&self) -> Result<(), StowError> {
        self.checked("restow", &["--restow"])
    }

    /// Remove every link of the package.
    ///
    /// # Errors
    ///
    /// Returns [`StowError::Failed`] if stow exits non-zero.
    pub fn unstow(&self) -> Result<(), StowError> {
        self.checked("delete", &["--delete"])
    }

    fn checked(&self, action: &'static str, mode: &[&str]) -> Result<(), StowError> {
        let result = self.invoke(action, mode)?;
        if result.success {
            Ok(())
        } else {
            Err(StowError::Failed {
                action,
                package: self.package.clone(),
                stderr: result.stderr.trim().to_string(),
            })
        }
    }
}

/// Extract conflict reports from stow's stderr.
///
/// Understands both the Stow 2.3 wording
/// (`* existing target is neither a link nor a directory: PATH`) and the
/// Stow 2.4 wording (`* cannot stow SRC over existing target PATH since …`).
#[must_use]
pub fn parse_conflicts(stderr: &str) -> Vec<Conflict> {
    stderr
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("* "))
        .map(parse_conflict_item)
        .collect()
}

fn parse_conflict_item(item: &str) -> Conflict {
    let conflict = |path: &str, kind| Conflict {
        path: PathBuf::from(path.trim()),
        kind,
        detail: item.to_string(),
    };

    if let Some(rest) = item.strip_prefix("cannot stow ")
        && let Some((_, after)) = rest.split_once(" over existing target ")
    {
        let (path, reason) = after.split_once(" since ").unwrap_or((after, ""));
        let kind = if reason.contains("neither a link nor a directory") {
            ConflictKind::NotLinkOrDir
        } else if reason.contains("not owned by stow") {
            ConflictKind::NotOwned
        } else if reason.contains("different package") {
            ConflictKind::OtherPackage
        } else {
            ConflictKind::Unknown
        };
        return conflict(path, kind);
    }

    if let Some(rest) = item.strip_prefix("existing target is stowed to a different package: ") {
        let path = rest.split_once(" => ").map_or(rest, |(p, _)| p);
        return conflict(path, ConflictKind::OtherPackage);
    }
    if let Some(path) = item.strip_prefix("existing target is neither a link nor a directory: ") {
        return conflict(path, ConflictKind::NotLinkOrDir);
    }
    if let Some(path) = item.strip_prefix("existing target is not owned by stow: ") {
        return conflict(path, ConflictKind::NotOwned);
    }
    conflict("", ConflictKind::Unknown)
}

/// Extract pending operations from stow's verbose stderr.
#[must_use]
pub fn parse_pending(stderr: &str) -> Vec<String> {
    const OPS: [&str; 4] = ["LINK: ", "UNLINK: ", "MKDIR: ", "RMDIR: "];
    stderr
        .lines()
        .map(str::trim)
        .filter(|line| OPS.iter().any(|op| line.starts_with(op)))
        .map(String::from)
        .collect()
}
