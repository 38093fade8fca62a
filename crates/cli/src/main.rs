// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! savehook: run an external tool whenever a file is saved.

mod color;
mod commands;
mod config;
mod env;
mod exit_error;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use commands::{check, run, watch};
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "savehook",
    version,
    about = "Run a tool against files as they are saved",
    styles = color::styles()
)]
struct Cli {
    /// Config file (default: ./savehook.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one save of FILE and print the report
    Run(run::RunArgs),
    /// Watch a directory and process saves until interrupted
    Watch(watch::WatchArgs),
    /// Validate configuration and show the resolved settings
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let guard = match init_logging(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    };

    let code = match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => match err.downcast_ref::<ExitError>() {
            Some(exit) => {
                if !exit.message.is_empty() {
                    eprintln!("error: {}", exit.message);
                }
                exit.code
            }
            None => {
                eprintln!("error: {err:#}");
                1
            }
        },
    };
    // Flush the non-blocking log writer before exiting.
    drop(guard);
    std::process::exit(code);
}

async fn dispatch(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let loaded = config::load(cli.config.as_deref(), &cwd).map_err(ExitError::from)?;
    let settings = &loaded.settings;

    match cli.command {
        Commands::Run(args) => run::handle(args, settings, &cwd, cli.format).await,
        Commands::Watch(args) => watch::handle(args, settings, &cwd, cli.format).await,
        Commands::Check => check::handle(&loaded, cli.format),
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(env::log_filter())
        .unwrap_or_else(|_| EnvFilter::new(env::DEFAULT_LOG_FILTER));

    let Some(path) = log_file else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        return Ok(None);
    };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let name = path.file_name().with_context(|| format!("not a file path: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
    Ok(Some(guard))
}
