//! Stow every selected package into each link root, and the inverse.
use std::path::{Component, Path};

use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult, TaskStats};
use crate::error::StowError;
use crate::resources::helpers::fs::{is_symlink, remove_existing};
use crate::resources::stow::{Conflict, StowPackage};
use crate::scanner::Package;

/// Link every selected package with stow.
#[derive(Debug)]
pub struct LinkPackages;

impl Task for LinkPackages {
    fn name(&self) -> &'static str {
        "Link packages"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.packages.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let roots = ctx.settings.link_roots();
        for_each_package(ctx, "link", |pkg, stats| {
            for root in &roots {
                *stats += link_into(ctx, pkg, root)?;
            }
            Ok(())
        })
    }
}

/// Remove the links of every selected package.
#[derive(Debug)]
pub struct UnlinkPackages;

impl Task for UnlinkPackages {
    fn name(&self) -> &'static str {
        "Unlink packages"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.packages.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let roots = ctx.settings.link_roots();
        for_each_package(ctx, "unlink", |pkg, stats| {
            for root in &roots {
                if !root.is_dir() {
                    ctx.log
                        .debug(&format!("{} does not exist, nothing to unlink", root.display()));
                    stats.already_ok += 1;
                    continue;
                }
                let stow = StowPackage::new(pkg.name.as_str(), ctx.repo(), root, &*ctx.executor);
                if ctx.dry_run {
                    ctx.log
                        .dry_run(&format!("would unlink {}", stow.description()));
                } else {
                    stow.unstow()?;
                    ctx.log.info(&format!("unlinked {}", stow.description()));
                }
                stats.changed += 1;
            }
            Ok(())
        })
    }
}

/// Run `f` for every selected package, logging and collecting failures so
/// the remaining packages still run.
fn for_each_package(
    ctx: &Context,
    verb: &str,
    mut f: impl FnMut(&Package, &mut TaskStats) -> Result<()>,
) -> Result<TaskResult> {
    let mut stats = TaskStats::new();
    let mut failed = Vec::new();
    for pkg in &*ctx.packages {
        if let Err(e) = f(pkg, &mut stats) {
            ctx.log
                .error(&format!("failed to {verb} {}: {e:#}", pkg.name));
            failed.push(pkg.name.as_str());
        }
    }
    if !failed.is_empty() {
        anyhow::bail!("{} package(s) failed: {}", failed.len(), failed.join(", "));
    }
    Ok(stats.finish(ctx))
}

/// Stow one package into one root, resolving conflicts by backing up the
/// files in the way.
fn link_into(ctx: &Context, pkg: &Package, root: &Path) -> Result<TaskStats> {
    let mut delta = TaskStats::new();

    if !root.is_dir() {
        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would create {}", root.display()));
        } else {
            std::fs::create_dir_all(root)
                .with_context(|| format!("create link root: {}", root.display()))?;
        }
    }

    let stow = StowPackage::new(pkg.name.as_str(), ctx.repo(), root, &*ctx.executor);
    let desc = stow.description();
    if !root.is_dir() {
        // Dry run against a root that does not exist yet: nothing can conflict.
        ctx.log.dry_run(&format!("would link {desc}"));
        delta.changed += 1;
        return Ok(delta);
    }
    let sim = stow.simulate()?;

    if sim.conflicts.is_empty() {
        if sim.pending.is_empty() {
            ctx.log.debug(&format!("ok: {desc}"));
            delta.already_ok += 1;
            return Ok(delta);
        }
        if ctx.dry_run {
            for op in &sim.pending {
                ctx.log.dry_run(&format!("{desc}: {op}"));
            }
        } else {
            stow.restow()?;
            ctx.log.info(&format!("linked {desc}"));
        }
        delta.changed += 1;
        return Ok(delta);
    }

    if let Some(bad) = sim
        .conflicts
        .iter()
        .find(|c| !c.is_resolvable() || !is_plain_relative(&c.path))
    {
        return Err(StowError::Unresolvable {
            package: pkg.name.clone(),
            detail: bad.detail.clone(),
        }
        .into());
    }

    let listing = sim
        .conflicts
        .iter()
        .map(|c| c.path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");

    if ctx.dry_run {
        for c in &sim.conflicts {
            ctx.log.dry_run(&format!(
                "would back up and replace {}",
                root.join(&c.path).display()
            ));
        }
        ctx.log.dry_run(&format!("would link {desc}"));
        delta.changed += 1;
        return Ok(delta);
    }

    if !ctx.settings.force
        && !ctx.confirm(&format!(
            "{} conflict(s) for {desc} ({listing}). Back up and replace?",
            sim.conflicts.len()
        ))
    {
        ctx.log.warn(&format!("skipped {desc}: conflicts left in place"));
        delta.skipped += 1;
        return Ok(delta);
    }

    for conflict in &sim.conflicts {
        clear_conflict(ctx, root, conflict)?;
    }
    stow.restow()?;
    ctx.log.info(&format!("linked {desc}"));
    delta.changed += 1;
    Ok(delta)
}

/// Back up (real files only) and remove the path stow reported.
fn clear_conflict(ctx: &Context, root: &Path, conflict: &Conflict) -> Result<()> {
    let path = root.join(&conflict.path);
    if is_symlink(&path) {
        ctx.log
            .debug(&format!("removing foreign link {}", path.display()));
    } else if let Some(copy) = ctx.backup.store(&path)? {
        ctx.log.info(&format!(
            "backed up {} to {}",
            path.display(),
            copy.display()
        ));
    }
    remove_existing(&path)
}

fn is_plain_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}
