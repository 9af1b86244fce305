//! Shallow git clone resource.
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::helpers::fs::ensure_parent_dir;
use super::{Applicable, Resource, ResourceState};
use crate::exec::Executor;

/// A repository that should be cloned at `dest`.
#[derive(Debug)]
pub struct GitCloneResource<'a> {
    /// Remote URL.
    pub url: String,
    /// Clone destination.
    pub dest: PathBuf,
    executor: &'a dyn Executor,
}

impl<'a> GitCloneResource<'a> {
    /// Create a new clone resource.
    #[must_use]
    pub fn new(url: impl Into<String>, dest: &Path, executor: &'a dyn Executor) -> Self {
        Self {
            url: url.into(),
            dest: dest.to_path_buf(),
            executor,
        }
    }
}

impl Applicable for GitCloneResource<'_> {
    fn description(&self) -> String {
        format!("{} -> {}", self.url, self.dest.display())
    }

    fn apply(&self) -> Result<()> {
        ensure_parent_dir(&self.dest)?;
        let dest = self.dest.to_string_lossy();
        self.executor
            .run("git", &["clone", "--depth=1", &self.url, &dest])?;
        Ok(())
    }
}

impl Resource for GitCloneResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if self.dest.symlink_metadata().is_err() {
            return Ok(ResourceState::Missing);
        }
        if self.dest.join(".git").exists() {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Invalid {
                reason: format!("{} exists but is not a git checkout", self.dest.display()),
            })
        }
    }
}
