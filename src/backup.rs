//! Timestamped backup archive.
//!
//! Every run that has to overwrite or remove a real file first copies it
//! into `<backup root>/<YYYYMMDD_HHMMSS>/<path relative to the target root>`.
//! The run directory is created on first use, so runs that change nothing
//! leave no trace. Old runs are never pruned.
use std::path::{Component, Path, PathBuf};

use chrono::{Local, NaiveDateTime, TimeDelta};

use crate::error::BackupError;
use crate::resources::helpers::fs::{
    copy_dir_recursive, copy_symlink, files_identical, is_symlink, walk_files,
};

/// `strftime` format of run directory names.
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Outcome of restoring a backup run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    /// Files copied back (or that would be, in dry-run), relative to the target root.
    pub restored: Vec<PathBuf>,
    /// Files already identical to their backup.
    pub unchanged: Vec<PathBuf>,
    /// Files not restored because a directory on the way to them is a
    /// symlink, so writing would land outside the target root.
    pub blocked: Vec<PathBuf>,
}

/// Backup archive for one run of the tool.
#[derive(Debug, Clone)]
pub struct BackupArchive {
    root: PathBuf,
    target_root: PathBuf,
    stamp: String,
}

impl BackupArchive {
    /// Open the archive at `root` for a run starting now.
    ///
    /// If a run directory with the current stamp already exists (two runs in
    /// the same second), the stamp is moved forward until it is free.
    #[must_use]
    pub fn new(root: &Path, target_root: &Path) -> Self {
        let mut when = Local::now().naive_local();
        let mut stamp = when.format(STAMP_FORMAT).to_string();
        while root.join(&stamp).exists() {
            when += TimeDelta::seconds(1);
            stamp = when.format(STAMP_FORMAT).to_string();
        }
        Self::with_stamp(root, target_root, stamp)
    }

    /// Open the archive with an explicit run stamp.
    #[must_use]
    pub fn with_stamp(root: &Path, target_root: &Path, stamp: impl Into<String>) -> Self {
        Self {
            root: root.to_path_buf(),
            target_root: target_root.to_path_buf(),
            stamp: stamp.into(),
        }
    }

    /// Backup root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of the current run. May not exist yet.
    #[must_use]
    pub fn run_dir(&self) -> PathBuf {
        self.root.join(&self.stamp)
    }

    /// Where `path` is stored inside a run directory: its path relative to
    /// the target root.
    ///
    /// `None` for paths outside the target root, which cannot be restored.
    #[must_use]
    pub fn relative_path<'p>(&self, path: &'p Path) -> Option<&'p Path> {
        path.strip_prefix(&self.target_root)
            .ok()
            .filter(|rel| {
                rel.components().next().is_some()
                    && rel.components().all(|c| matches!(c, Component::Normal(_)))
            })
    }

    /// Copy the real file or directory at `path` into the current run.
    ///
    /// Returns the location of the copy, or `None` when `path` is a symlink
    /// (links are never archived). Symlinks inside a directory are copied
    /// as links. Every copied file is verified against its original before
    /// this returns.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::OutsideTarget`] if `path` is not below the
    /// target root, [`BackupError::Copy`] if reading or writing fails and
    /// [`BackupError::Mismatch`] if a copy differs from its original.
    pub fn store(&self, path: &Path) -> Result<Option<PathBuf>, BackupError> {
        let copy_err = |source| BackupError::Copy {
            path: path.to_path_buf(),
            source,
        };
        let meta = path.symlink_metadata().map_err(copy_err)?;
        if meta.is_symlink() {
            return Ok(None);
        }
        let rel = self
            .relative_path(path)
            .ok_or_else(|| BackupError::OutsideTarget(path.to_path_buf()))?;

        let dest = self.run_dir().join(rel);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(copy_err)?;
        }

        if meta.is_dir() {
            copy_dir_recursive(path, &dest).map_err(copy_err)?;
            for rel in walk_files(path).map_err(copy_err)? {
                let original = path.join(&rel);
                if !is_symlink(&original) {
                    verify(&original, &dest.join(&rel))?;
                }
            }
        } else {
            std::fs::copy(path, &dest).map_err(copy_err)?;
            verify(path, &dest)?;
        }
        Ok(Some(dest))
    }

    /// Most recent run directory other than the current one.
    ///
    /// Only directories whose name parses as a run stamp are considered.
    #[must_use]
    pub fn latest(&self) -> Option<PathBuf> {
        let entries = std::fs::read_dir(&self.root).ok()?;
        entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_dir())
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                let stamp = NaiveDateTime::parse_from_str(&name, STAMP_FORMAT).ok()?;
                (name != self.stamp).then_some((stamp, e.path()))
            })
            .max_by_key(|(stamp, _)| *stamp)
            .map(|(_, path)| path)
    }

    /// Copy every file of `run` back under the target root.
    ///
    /// Symlinks in the way are removed. A differing real file in the way is
    /// first stored in the current run. Identical files are left alone.
    /// Links saved inside a backed-up directory are recreated as links.
    /// Nothing is ever written through a symlinked directory: such files
    /// are listed in [`RestoreReport::blocked`] and left alone. With
    /// `dry_run` nothing is written and the report lists what would be
    /// restored.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::NothingToRestore`] if `run` is not a directory
    /// and [`BackupError::Copy`] if a file cannot be restored.
    pub fn restore(&self, run: &Path, dry_run: bool) -> Result<RestoreReport, BackupError> {
        if !run.is_dir() {
            return Err(BackupError::NothingToRestore(run.to_path_buf()));
        }
        let files = walk_files(run).map_err(|source| BackupError::Copy {
            path: run.to_path_buf(),
            source,
        })?;

        let mut report = RestoreReport::default();
        for rel in files {
            let src = run.join(&rel);
            let dest = self.target_root.join(&rel);

            if self.through_symlink(&rel) {
                report.blocked.push(rel);
                continue;
            }
            if is_unchanged(&src, &dest) {
                report.unchanged.push(rel);
                continue;
            }
            if !dry_run {
                self.place(&src, &dest)?;
            }
            report.restored.push(rel);
        }
        Ok(report)
    }

    /// Whether any directory between the target root and `rel` is a symlink.
    fn through_symlink(&self, rel: &Path) -> bool {
        let mut dir = self.target_root.clone();
        rel.parent().is_some_and(|parent| {
            parent.components().any(|component| {
                dir.push(component);
                is_symlink(&dir)
            })
        })
    }

    fn place(&self, src: &Path, dest: &Path) -> Result<(), BackupError> {
        let copy_err = |source| BackupError::Copy {
            path: dest.to_path_buf(),
            source,
        };
        if is_symlink(dest) {
            std::fs::remove_file(dest).map_err(copy_err)?;
        } else if dest.exists() {
            self.store(dest)?;
            if dest.is_dir() {
                std::fs::remove_dir_all(dest).map_err(copy_err)?;
            } else {
                std::fs::remove_file(dest).map_err(copy_err)?;
            }
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(copy_err)?;
        }
        if is_symlink(src) {
            copy_symlink(src, dest).map_err(copy_err)?;
        } else {
            std::fs::copy(src, dest).map_err(copy_err)?;
        }
        Ok(())
    }
}

/// Whether `dest` already matches the saved entry at `src`.
fn is_unchanged(src: &Path, dest: &Path) -> bool {
    if is_symlink(src) {
        return is_symlink(dest)
            && matches!(
                (std::fs::read_link(src), std::fs::read_link(dest)),
                (Ok(a), Ok(b)) if a == b
            );
    }
    !is_symlink(dest) && dest.is_file() && files_identical(src, dest)
}

fn verify(original: &Path, copy: &Path) -> Result<(), BackupError> {
    if files_identical(original, copy) {
        Ok(())
    } else {
        Err(BackupError::Mismatch(original.to_path_buf()))
    }
}
