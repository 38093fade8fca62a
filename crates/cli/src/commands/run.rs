// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `savehook run`: process a single save.

use anyhow::Result;
use clap::Args;
use savehook_core::{normalize_path, SaveEvent, Settings};
use std::path::{Path, PathBuf};

use crate::exit_error::{ExitError, EXIT_FAILURE};
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct RunArgs {
    /// File that was saved
    pub file: PathBuf,
    /// File type id (default: looked up from the extension in [host].file_types)
    #[arg(long)]
    pub file_type: Option<String>,
}

pub async fn handle(args: RunArgs, settings: &Settings, cwd: &Path, format: OutputFormat) -> Result<()> {
    let pipeline = super::build_pipeline(settings, format).map_err(ExitError::from)?;
    let event = save_event(&args, settings, cwd);
    let path = event.file_path().to_path_buf();

    match pipeline.handle(event).await {
        None => {
            println!("{}", output::skipped(&path, format)?);
            Ok(())
        }
        Some(report) if report.is_error() => Err(ExitError::quiet(EXIT_FAILURE).into()),
        Some(_) => Ok(()),
    }
}

/// Build the event for `args.file`, resolving relative paths against `cwd`.
pub(crate) fn save_event(args: &RunArgs, settings: &Settings, cwd: &Path) -> SaveEvent {
    let path = normalize_path(&cwd.join(&args.file));
    let file_type = match &args.file_type {
        Some(id) => id.clone(),
        None => settings.file_type_for(&path).unwrap_or_default().to_string(),
    };
    SaveEvent::new(path, file_type)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
