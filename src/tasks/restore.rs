//! Restore the most recent backup.
use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats};

/// Copy the most recent backup run back into the target root.
#[derive(Debug)]
pub struct RestoreBackup;

impl Task for RestoreBackup {
    fn name(&self) -> &'static str {
        "Restore backup"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.settings.restore_last
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(latest) = ctx.backup.latest() else {
            return Ok(TaskResult::Skipped(format!(
                "no backup found under {}",
                ctx.backup.root().display()
            )));
        };
        ctx.log.info(&format!("restoring from {}", latest.display()));

        let report = ctx.backup.restore(&latest, ctx.dry_run)?;
        for rel in &report.restored {
            let dest = ctx.target_root().join(rel);
            if ctx.dry_run {
                ctx.log.dry_run(&format!("would restore {}", dest.display()));
            } else {
                ctx.log.debug(&format!("restored {}", dest.display()));
            }
        }
        for rel in &report.blocked {
            ctx.log.warn(&format!(
                "not restoring {}: a parent directory is a symlink",
                ctx.target_root().join(rel).display()
            ));
        }
        if !report.blocked.is_empty() {
            anyhow::bail!(
                "{} file(s) not restored; unlink the packages that own those directories first",
                report.blocked.len()
            );
        }

        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        let stats = TaskStats {
            changed: count(report.restored.len()),
            already_ok: count(report.unchanged.len()),
            skipped: 0,
        };
        Ok(stats.finish(ctx))
    }
}
