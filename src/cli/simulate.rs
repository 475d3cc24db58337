use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde_json::Value;
use tracing::debug;

use super::root::{headless_runtime, DialogArgs};
use alert_window::{AlertConfig, DialogResult, DismissReason};

/// Run a dialog to completion without a display
#[derive(Args)]
pub struct SimulateCommand {
    #[command(flatten)]
    pub dialog: DialogArgs,

    /// Confirm with this JSON value
    #[arg(long, conflicts_with = "dismiss")]
    pub confirm: Option<String>,

    /// Dismiss for this reason: cancel, close, esc or timer
    #[arg(long)]
    pub dismiss: Option<DismissReason>,
}

impl SimulateCommand {
    pub async fn execute(&self, config: AlertConfig) -> Result<()> {
        debug!("Executing simulate command");

        let outcome = self.outcome()?;
        let (backend, runtime) = headless_runtime(config)?;
        let pending = self.dialog.fire(&runtime.controller())?;
        let window = backend
            .window(pending.instance())
            .ok_or_else(|| anyhow!("No window was created for {}", pending.instance()))?;

        window.run_dialog(outcome);
        let result = pending.await;

        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }

    fn outcome(&self) -> Result<DialogResult> {
        if let Some(reason) = self.dismiss {
            return Ok(DialogResult::dismissed(reason));
        }
        let value = match &self.confirm {
            Some(raw) => serde_json::from_str(raw).context("--confirm expects a JSON value")?,
            None => Value::Bool(true),
        };
        Ok(DialogResult::confirmed(value))
    }
}
