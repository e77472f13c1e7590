//! CLI command implementations

pub mod connect;
pub mod demo;
pub mod disconnect;
pub mod logs;
pub mod refresh;
pub mod send;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use satchel_core::domain::result::{self, OperationResult};
use satchel_core::services::{EntryPoint, LoggingService};
use satchel_core::SatchelContext;
use serde::Serialize;

use crate::output;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<Arc<LoggingService>> {
    let satchel_dir = get_satchel_dir().ok()?;
    std::fs::create_dir_all(&satchel_dir).ok()?;
    LoggingService::new(&satchel_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
        .ok()
        .map(Arc::new)
}

/// Record that a command ran, ignoring any errors
pub fn log_command(logger: &Option<Arc<LoggingService>>, command: &str) {
    if let Some(l) = logger {
        let _ = l.log_command(command);
    }
}

/// Get the satchel directory from environment or default
pub fn get_satchel_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SATCHEL_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".satchel"))
        .context("Could not find home directory; set SATCHEL_DIR")
}

/// Build the satchel context for a command
pub fn get_context(command: &str) -> Result<SatchelContext> {
    let satchel_dir = get_satchel_dir()?;

    std::fs::create_dir_all(&satchel_dir)
        .with_context(|| format!("Failed to create satchel directory: {:?}", satchel_dir))?;

    let logger = get_logger();
    log_command(&logger, command);

    SatchelContext::new(&satchel_dir, logger).context("Failed to initialize satchel context")
}

/// Resume the remembered session before running a command
///
/// A failed resume is reported as a warning; the command then runs
/// against a disconnected session.
pub async fn auto_resume(ctx: &SatchelContext, quiet: bool) {
    if let Err(e) = ctx.controller.resume_if_possible().await {
        if !quiet {
            output::warning(&e.to_string());
        }
    }
}

/// Print an operation outcome as JSON, exiting with failure if it failed
pub fn print_json_outcome<T: Serialize>(result: result::Result<T>) -> Result<()> {
    let outcome = OperationResult::from(result);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}
