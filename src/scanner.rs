//! Package discovery in the configuration repository.
//!
//! A *package* is a top-level directory of the repository that looks like
//! a stow package: it holds a hidden subdirectory (`.config/`), a `bin/`
//! directory, or a hidden file (`.zshrc`) at its top level.
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ScanError;

/// Evidence that a directory is a stow package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PackageMarker {
    /// A hidden subdirectory such as `.config/`.
    HiddenDir,
    /// A `bin/` directory.
    BinDir,
    /// A hidden file such as `.zshrc`.
    HiddenFile,
}

impl fmt::Display for PackageMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HiddenDir => write!(f, "hidden directory"),
            Self::BinDir => write!(f, "bin directory"),
            Self::HiddenFile => write!(f, "hidden file"),
        }
    }
}

/// A detected package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Directory name, passed to stow as the package name.
    pub name: String,
    /// Absolute path of the package directory.
    pub path: PathBuf,
    /// Markers found at the top of the package, deduplicated and sorted.
    pub markers: Vec<PackageMarker>,
}

/// Scan `repo` for packages, skipping names listed in `ignore`.
///
/// # Errors
///
/// Returns [`ScanError::RepoNotFound`] if `repo` is not a directory and
/// [`ScanError::Io`] if a directory cannot be listed.
pub fn scan(repo: &Path, ignore: &[String]) -> Result<Vec<Package>, ScanError> {
    if !repo.is_dir() {
        return Err(ScanError::RepoNotFound(repo.to_path_buf()));
    }

    let mut packages = Vec::new();
    for entry in read_dir(repo)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || ignore.iter().any(|i| *i == name) {
            continue;
        }
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let markers = markers(&path)?;
        if !markers.is_empty() {
            packages.push(Package {
                name,
                path,
                markers,
            });
        }
    }
    packages.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(packages)
}

/// Restrict `packages` to the one named `name`, or keep all when `None`.
///
/// # Errors
///
/// Returns [`ScanError::UnknownPackage`] if no detected package is called `name`.
pub fn select(packages: Vec<Package>, name: Option<&str>) -> Result<Vec<Package>, ScanError> {
    let Some(name) = name else {
        return Ok(packages);
    };
    if packages.iter().any(|p| p.name == name) {
        Ok(packages.into_iter().filter(|p| p.name == name).collect())
    } else {
        let available = if packages.is_empty() {
            "none".to_string()
        } else {
            packages
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        Err(ScanError::UnknownPackage {
            name: name.to_string(),
            available,
        })
    }
}

fn read_dir(dir: &Path) -> Result<Vec<std::fs::DirEntry>, ScanError> {
    let io_err = |source| ScanError::Io {
        path: dir.to_path_buf(),
        source,
    };
    std::fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)
}

fn markers(dir: &Path) -> Result<Vec<PackageMarker>, ScanError> {
    let mut found = Vec::new();
    for entry in read_dir(dir)? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let is_dir = entry.path().is_dir();
        let marker = match (is_dir, name.starts_with('.')) {
            (true, true) => Some(PackageMarker::HiddenDir),
            (true, false) if name == "bin" => Some(PackageMarker::BinDir),
            (false, true) => Some(PackageMarker::HiddenFile),
            _ => None,
        };
        if let Some(m) = marker {
            found.push(m);
        }
    }
    found.sort();
    found.dedup();
    Ok(found)
}
