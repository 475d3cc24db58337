//! Generated page loaded into each dialog window
//!
//! Layout, in order: the inlined dialog library, the utility classes,
//! extra head markup, the body, the page-local values and the driver script.

use crate::error::AlertResult;
use crate::options::Sound;
use crate::protocol::InstanceId;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub const DRIVER_SCRIPT: &str = include_str!("../assets/driver.js");

const UTILITY_CSS: &str = ".noselect{-webkit-touch-callout:none;user-select:none;-webkit-user-select:none;-webkit-app-region:no-drag}.no-drag{-webkit-app-region:no-drag}.border-radius-0{border-radius:0}";

/// Everything the page needs to know about one dialog
pub struct PageSpec<'a> {
    pub instance: &'a InstanceId,
    pub library: &'a str,
    pub head: &'a [String],
    pub draggable: bool,
    pub sound: Option<&'a Sound>,
    pub config: &'a Map<String, Value>,
    pub settle_delay_ms: u64,
}

/// Keep inlined text from closing its `<script>` element early
fn script_safe(source: &str) -> String {
    source.replace("</script", "<\\/script")
}

fn json_literal(value: &impl serde::Serialize) -> AlertResult<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub fn render(spec: &PageSpec<'_>) -> AlertResult<String> {
    let body_style = if spec.draggable {
        r#" style="-webkit-app-region:drag""#
    } else {
        ""
    };

    let mut html = String::with_capacity(spec.library.len() + DRIVER_SCRIPT.len() + 1024);
    html.push_str("<html>\n  <head>\n");
    html.push_str(&format!(
        "    <script type=\"text/javascript\">{}</script>\n",
        script_safe(spec.library)
    ));
    html.push_str(&format!("    <style>{}</style>\n", UTILITY_CSS));
    for extra in spec.head {
        html.push_str(extra);
        html.push('\n');
    }
    html.push_str("  </head>\n");
    html.push_str(&format!(
        "  <body draggable=\"false\" class=\"noselect\"{}></body>\n",
        body_style
    ));
    html.push_str("  <script type=\"text/javascript\">\n");
    html.push_str(&format!("let _instance = {}\n", json_literal(spec.instance)?));
    html.push_str(&format!("let _sound = {}\n", json_literal(&spec.sound)?));
    html.push_str(&format!("let _config = {}\n", json_literal(spec.config)?));
    html.push_str(&format!("let _settleDelay = {}\n", spec.settle_delay_ms));
    html.push_str(&script_safe(DRIVER_SCRIPT));
    html.push_str("\n  </script>\n</html>\n");

    Ok(html)
}

/// A rendered page written to a temporary file that lives as long as its window
pub struct HostedPage {
    file: Option<NamedTempFile>,
    path: PathBuf,
    sound: Option<Sound>,
    config: Map<String, Value>,
}

impl HostedPage {
    pub fn write(spec: &PageSpec<'_>) -> AlertResult<Self> {
        let html = render(spec)?;

        let mut file = tempfile::Builder::new()
            .prefix("swal")
            .suffix(".html")
            .tempfile()?;
        file.write_all(html.as_bytes())?;
        file.flush()?;

        let path = file.path().to_path_buf();
        debug!("Wrote dialog page for {} to {}", spec.instance, path.display());

        Ok(Self {
            file: Some(file),
            path,
            sound: spec.sound.cloned(),
            config: spec.config.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }

    /// Sound descriptor embedded in the page
    pub fn sound(&self) -> Option<&Sound> {
        self.sound.as_ref()
    }

    /// Dialog configuration embedded in the page
    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    /// Delete the file. Failures are logged and otherwise ignored.
    pub fn remove(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = file.close() {
                warn!("Failed to delete dialog page {}: {}", self.path.display(), e);
            }
        }
    }
}

impl Drop for HostedPage {
    fn drop(&mut self) {
        self.remove();
    }
}
