use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use super::{RenderCommand, SimulateCommand};
use alert_window::{
    AlertConfig, AlertRuntime, DialogController, FireOptions, HeadlessBackend, PendingDialog,
    WindowBackend,
};

/// Alert dialogs in their own native window
#[derive(Parser)]
#[command(
    name = "alert-window",
    version,
    about = "Render and exercise alert dialogs hosted in native windows",
    long_about = r#"Builds the page a dialog window loads and drives dialogs through their
lifecycle on an in-memory window backend.

Examples:
  alert-window render --options dialog.json --framed
  alert-window simulate --options dialog.json --confirm '"yes"'
  alert-window simulate --dismiss esc"#
)]
pub struct Cli {
    /// Configuration file; defaults to ./alert-window.json or the user config directory
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the page a dialog window would load
    Render(RenderCommand),
    /// Run a dialog to completion without a display
    Simulate(SimulateCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        let config = match &self.config {
            Some(path) => {
                let mut config = AlertConfig::load_from_path(path).await?;
                config.load_from_env();
                config
            }
            None => AlertConfig::init().await?,
        };
        debug!("Configuration initialized");

        match self.command {
            Commands::Render(cmd) => cmd.execute(config).await,
            Commands::Simulate(cmd) => cmd.execute(config).await,
        }
    }
}

/// Options source and window variant shared by the subcommands
#[derive(Args)]
pub struct DialogArgs {
    /// JSON options file, or `-` for stdin; an empty dialog when omitted
    #[arg(short = 'o', long = "options")]
    pub options: Option<PathBuf>,

    /// Transparent window without a frame
    #[arg(long, conflicts_with = "framed")]
    pub frameless: bool,

    /// Regular titled window
    #[arg(long)]
    pub framed: bool,
}

impl DialogArgs {
    pub fn read_options(&self) -> Result<FireOptions> {
        let raw = match &self.options {
            None => return Ok(FireOptions::from_value(Value::Object(Default::default()))?),
            Some(path) if path.as_os_str() == "-" => {
                debug!("Reading options from stdin");
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(|e| anyhow!("Failed to read from stdin: {}", e))?;
                buffer
            }
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        };

        let value: Value = serde_json::from_str(&raw).context("Options are not valid JSON")?;
        Ok(FireOptions::from_value(value)?)
    }

    pub fn fire(&self, controller: &DialogController) -> Result<PendingDialog> {
        let options = self.read_options()?;
        let pending = if self.frameless {
            controller.fire_frameless(options)?
        } else if self.framed {
            controller.fire_with_frame(options)?
        } else {
            controller.fire(options)?
        };
        info!("Fired dialog {}", pending.instance());
        Ok(pending)
    }
}

/// Runtime over the in-memory backend
pub fn headless_runtime(config: AlertConfig) -> Result<(Arc<HeadlessBackend>, Arc<AlertRuntime>)> {
    let backend = Arc::new(HeadlessBackend::default());
    let runtime = AlertRuntime::new(backend.clone() as Arc<dyn WindowBackend>, config)?;
    Ok((backend, runtime))
}
