//! `dotstow` binary entry point.
use std::io::Write as _;
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory as _, Parser as _};

use dotstow_cli::cli::{Cli, Command};
use dotstow_cli::commands;
use dotstow_cli::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    logging::init_subscriber(args.verbose, args.global.log.as_deref());
    let log = Arc::new(Logger::new(args.global.log.clone()));

    match args.command {
        Command::Install(opts) => commands::install::run(&args.global, &opts, &log),
        Command::Uninstall(opts) => commands::uninstall::run(&args.global, &opts, &log),
        Command::Test => commands::test::run(&args.global, &log),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "dotstow", &mut std::io::stdout());
            Ok(())
        }
        Command::Version => {
            let version = option_env!("DOTSTOW_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            let mut out = std::io::stdout().lock();
            writeln!(out, "dotstow {version}")?;
            Ok(())
        }
    }
}
