//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod posts;
pub mod tui;

use anyhow::{Context, Result};
use megablog_core::backend::AppwriteBackend;
use megablog_core::config::Config;
use megablog_core::forms::FieldErrors;

/// Builds the backend client from the resolved `[backend]` settings.
fn connect(config: &Config) -> Result<AppwriteBackend> {
    let resolved = config.backend.resolve()?;
    AppwriteBackend::new(resolved).context("connect to backend")
}

/// Fails with one line per invalid field.
fn ensure_valid(errors: &FieldErrors) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    let lines: Vec<String> = errors
        .iter()
        .map(|(field, message)| format!("  {field}: {message}"))
        .collect();
    anyhow::bail!("Invalid input:\n{}", lines.join("\n"))
}
