//! Dotfiles deployment on top of GNU Stow.
//!
//! Scans a configuration repository for packages, links each one into the
//! home directory with `stow`, and backs up any real file in the way before
//! replacing it. Optionally installs base tools, a font, a prompt and a shell
//! framework with plugins, and can undo a deployment and restore the most
//! recent backup.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: run settings and the `dotstow.toml` manifest
//! - **[`resources`]**: idempotent `check + apply` primitives (stow packages, clones, system packages)
//! - **[`tasks`]**: named, ordered units of work wired to resources
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `uninstall`, `test`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod backup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod prompt;
pub mod resources;
pub mod scanner;
pub mod tasks;
