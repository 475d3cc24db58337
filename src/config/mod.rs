use crate::error::AlertResult;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

/// Where the dialog library bundle comes from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LibrarySource {
    Inline(String),
    Path(PathBuf),
}

impl Default for LibrarySource {
    fn default() -> Self {
        LibrarySource::Inline(String::new())
    }
}

impl LibrarySource {
    pub fn load(&self) -> AlertResult<String> {
        match self {
            LibrarySource::Inline(source) => Ok(source.clone()),
            LibrarySource::Path(path) => {
                debug!("Loading dialog library from: {}", path.display());
                Ok(std::fs::read_to_string(path)?)
            }
        }
    }
}

/// Runtime settings shared by every dialog
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertConfig {
    /// Dialog library inlined into every generated page
    pub library: LibrarySource,

    /// Extra markup appended to the page head
    pub head: Vec<String>,

    /// Open developer tools in dialog windows
    pub dev_tools: bool,

    /// Default title of framed windows
    pub app_name: String,

    pub base_width: u32,
    pub base_height: u32,

    /// Delay before the page asks for a second reposition after opening
    pub reposition_settle_ms: u64,

    /// Delay sent with `resizeToFit` after the validation message changes
    pub validation_resize_delay_ms: u64,

    /// How long a settled dialog may keep its window before it is destroyed
    pub teardown_grace_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            library: LibrarySource::default(),
            head: Vec::new(),
            dev_tools: false,
            app_name: default_app_name(),
            base_width: 800,
            base_height: 600,
            reposition_settle_ms: 25,
            validation_resize_delay_ms: 25,
            teardown_grace_ms: 1000,
        }
    }
}

fn default_app_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "Alert".to_string())
}

impl AlertConfig {
    /// Defaults, then the first configuration file found, then environment overrides
    pub async fn init() -> Result<Self> {
        debug!("Initializing alert configuration");

        let mut config = match Self::load_from_file().await {
            Ok(config) => config,
            Err(e) => {
                debug!("Using default configuration: {}", e);
                Self::default()
            }
        };
        config.load_from_env();

        Ok(config)
    }

    /// Candidate configuration files, in priority order
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./alert-window.json")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("alert-window").join("config.json"));
        }
        paths
    }

    pub async fn load_from_file() -> Result<Self> {
        for path in Self::config_paths() {
            if path.exists() {
                return Self::load_from_path(&path).await;
            }
        }
        Err(anyhow::anyhow!("No configuration file found"))
    }

    pub async fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    pub fn load_from_env(&mut self) {
        if let Ok(library) = std::env::var("ALERT_WINDOW_LIBRARY") {
            self.library = LibrarySource::Path(PathBuf::from(library));
        }

        if let Ok(dev_tools) = std::env::var("ALERT_WINDOW_DEVTOOLS") {
            self.dev_tools = matches!(dev_tools.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Ok(app_name) = std::env::var("ALERT_WINDOW_APP_NAME") {
            self.app_name = app_name;
        }
    }

    pub fn teardown_grace(&self) -> Duration {
        Duration::from_millis(self.teardown_grace_ms)
    }
}
