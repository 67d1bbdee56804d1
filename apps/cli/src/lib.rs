//! # dtwin CLI
//!
//! Front end over the [`dtwin`] engine and the [`dtwin_models`] library: schema export,
//! registry listing and twin document normalization.

pub mod args;
pub mod commands;
pub mod config;
pub mod logging;

use crate::args::Cli;
use crate::config::load_config;
use crate::logging::{LevelFilter, Logger};
use anyhow::{Context, Result};
use std::io::IsTerminal;

/// Installs logging, loads configuration and runs the selected subcommand against stdout.
///
/// # Errors
/// Fails when the logger or configuration cannot be set up, or when the subcommand fails.
pub fn run(cli: Cli) -> Result<()> {
    Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO })
        .json(cli.json_logs)
        .ansi(std::io::stderr().is_terminal())
        .init()?;

    let config = load_config(cli.config.as_deref()).context("Configuration is malformed")?;
    tracing::debug!(?config, "configuration loaded");

    let mut stdout = std::io::stdout().lock();
    commands::execute(&cli.command, &config, &mut stdout)
}
