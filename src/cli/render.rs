use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::{debug, info};

use super::root::{headless_runtime, DialogArgs};
use alert_window::{AlertConfig, NativeWindow};

/// Print the page a dialog window would load
#[derive(Args)]
pub struct RenderCommand {
    #[command(flatten)]
    pub dialog: DialogArgs,

    /// Write the page here instead of stdout
    #[arg(long = "out")]
    pub out: Option<PathBuf>,
}

impl RenderCommand {
    pub async fn execute(&self, config: AlertConfig) -> Result<()> {
        debug!("Executing render command");

        let (backend, runtime) = headless_runtime(config)?;
        let pending = self.dialog.fire(&runtime.controller())?;
        let window = backend
            .window(pending.instance())
            .ok_or_else(|| anyhow!("No window was created for {}", pending.instance()))?;

        // Read the page before teardown removes it
        let page = window
            .page_path()
            .ok_or_else(|| anyhow!("Window {} has no page", pending.instance()))?;
        let html = tokio::fs::read_to_string(&page)
            .await
            .with_context(|| format!("Failed to read {}", page.display()))?;

        window.destroy();
        pending.await;

        match &self.out {
            Some(path) => {
                tokio::fs::write(path, html)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Wrote page to {}", path.display());
            }
            None => println!("{}", html),
        }

        Ok(())
    }
}
