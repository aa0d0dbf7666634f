//! Full-screen terminal client for MegaBlog.

pub mod common;
pub mod effects;
pub mod events;
pub mod navigation;
pub mod render;
pub mod runtime;
pub mod screens;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr};
use std::sync::Arc;

use anyhow::Result;
use megablog_core::backend::Backend;
use megablog_core::config::Config;
pub use runtime::TuiRuntime;

/// Runs the interactive client until the user quits.
///
/// # Errors
/// Returns an error if stderr is not a terminal or the terminal fails.
pub async fn run_tui<B: Backend>(config: &Config, backend: Arc<B>) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The interactive client requires a terminal.\n\
             Use `megablog posts list` for non-interactive access."
        );
    }

    tracing::info!("starting tui");
    let mut runtime = TuiRuntime::new(config, backend)?;
    runtime.run()?;
    drop(runtime);

    writeln!(stderr(), "Goodbye!")?;
    Ok(())
}
