//! Script-side glue for webview backends
//!
//! The page driver posts wire envelopes through `window.ipc.postMessage`
//! and takes commands through `window.__alertHost.command`. A webview
//! backend feeds the former into [`forward_ipc`] and evaluates what
//! [`command_script`] produces for the latter.

use crate::error::{AlertError, AlertResult};
use crate::protocol::{HostCommand, SignalRouter};
use serde_json::Value;
use tracing::debug;

/// Global the driver installs its command entry point on
pub const HOST_OBJECT: &str = "window.__alertHost";

/// Script that hands `command` to the page driver
pub fn command_script(command: &HostCommand) -> AlertResult<String> {
    let payload = serde_json::to_string(command)?;
    Ok(format!("{HOST_OBJECT} && {HOST_OBJECT}.command({payload});"))
}

/// Route one IPC message body from a page to its instance
pub fn forward_ipc(router: &SignalRouter, body: &str) -> bool {
    match router.deliver(body) {
        Ok(true) => true,
        Ok(false) => {
            debug!("No live dialog for host message");
            false
        }
        // Already logged by the router
        Err(_) => false,
    }
}

/// Decode the JSON text a webview reports for an evaluated script
pub fn parse_eval_result(raw: &str) -> AlertResult<Value> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "undefined" {
        return Ok(Value::Null);
    }
    serde_json::from_str(raw)
        .map_err(|e| AlertError::Evaluation(format!("unreadable script result {:?}: {}", raw, e)))
}
