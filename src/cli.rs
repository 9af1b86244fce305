//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Top-level CLI entry point for the dotstow deployment tool.
#[derive(Parser, Debug)]
#[command(
    name = "dotstow",
    about = "Deploy dotfiles with GNU Stow, backing up anything in the way",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Where links are placed
    #[arg(long, value_enum, default_value_t = LinkTarget::Home, global = true)]
    pub target: LinkTarget,

    /// Append timestamped log lines to this file
    #[arg(long, value_name = "FILE", global = true)]
    pub log: Option<PathBuf>,

    /// Restrict the operation to one package
    #[arg(long, value_name = "NAME", global = true)]
    pub package: Option<String>,

    /// Override the configuration repository (default: $DOTFILES_DIR or ~/dotfiles)
    #[arg(long, value_name = "PATH", global = true)]
    pub repo: Option<PathBuf>,
}

/// Link root selection for `--target`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkTarget {
    /// The target root (`$DOTFILES_TARGET`, default `$HOME`)
    #[default]
    Home,
    /// `<target root>/.config`
    Config,
    /// Both of the above
    Both,
}

/// `yes`/`no` switch.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YesNo {
    /// Enabled
    Yes,
    /// Disabled
    #[default]
    No,
}

impl YesNo {
    /// Whether the switch is on.
    #[must_use]
    pub const fn enabled(self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Link packages, optionally installing tools and shell plugins first
    Install(InstallOpts),
    /// Remove links, optionally restoring the latest backup
    Uninstall(UninstallOpts),
    /// Run read-only checks against the repository
    Test,
    /// Print a shell completion script
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Back up and replace conflicting files without asking
    #[arg(long)]
    pub force: bool,

    /// Install system packages, font, and prompt through the package manager
    #[arg(long, value_enum, default_value_t = YesNo::No)]
    pub pkg_install: YesNo,

    /// Skip specific tasks
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only specific tasks
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

/// Options for the `uninstall` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct UninstallOpts {
    /// Restore the most recent backup after removing links
    #[arg(long)]
    pub restore_last: bool,
}
