//! Interactive client launcher.

use anyhow::Result;
use megablog_core::config::Config;

#[cfg(feature = "tui")]
pub async fn run(config: &Config) -> Result<()> {
    use std::sync::Arc;

    let backend = Arc::new(super::connect(config)?);
    megablog_tui::run_tui(config, backend).await
}

#[cfg(not(feature = "tui"))]
#[allow(clippy::unused_async)]
pub async fn run(_config: &Config) -> Result<()> {
    anyhow::bail!(
        "This build has no interactive client. Run `megablog --help` for the available commands."
    )
}
