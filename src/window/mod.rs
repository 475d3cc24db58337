//! Native window seam
//!
//! A [`WindowBackend`] creates one window per dialog instance and hands back
//! typed channels for that window's native events and for the signals its
//! hosted page sends. Dropping those receivers releases every subscription.

pub mod bridge;
pub mod headless;
#[cfg(feature = "webview")]
pub mod webview;

pub use headless::{HeadlessBackend, HeadlessWindow};
#[cfg(feature = "webview")]
pub use webview::{WebviewBackend, WebviewEventLoop, WebviewWindow};

use crate::error::AlertResult;
use crate::options::{Anchor, WindowOptions};
use crate::page::HostedPage;
use crate::protocol::{HostCommand, HostSignal, InstanceId};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Refresh accelerators suppressed while a dialog window has focus on macOS
pub const REFRESH_SHORTCUTS: [&str; 2] = ["CommandOrControl+R", "CommandOrControl+Shift+R"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// Modal child windows are placed by the window manager relative to their parent
    pub fn positions_modal_children(&self) -> bool {
        matches!(self, Platform::MacOs)
    }
}

/// Native events of a dialog window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    ReadyToShow,
    Focus,
    Blur,
    /// The window is about to close
    Close,
    /// The window is gone
    Closed,
}

#[async_trait]
pub trait NativeWindow: Send + Sync {
    fn load_page(&self, page: &HostedPage) -> AlertResult<()>;

    fn remove_menu(&self);

    fn move_to(&self, anchor: Anchor);

    fn show(&self);

    fn focus(&self);

    fn is_destroyed(&self) -> bool;

    /// Tear the window down; emits [`WindowEvent::Closed`] once
    fn destroy(&self);

    /// Evaluate a script in the hosted page
    async fn eval(&self, script: &str) -> AlertResult<Value>;

    /// Deliver a command to the hosted page
    fn send(&self, command: HostCommand);
}

/// A freshly created window plus its per-instance channels
pub struct WindowParts {
    pub window: Arc<dyn NativeWindow>,
    pub events: mpsc::UnboundedReceiver<WindowEvent>,
    pub signals: mpsc::UnboundedReceiver<HostSignal>,
}

pub trait WindowBackend: Send + Sync {
    fn platform(&self) -> Platform;

    /// Create a hidden window for `instance`
    fn create_window(&self, instance: &InstanceId, options: &WindowOptions) -> AlertResult<WindowParts>;

    fn register_shortcuts(&self, accelerators: &[&str]);

    fn unregister_shortcuts(&self, accelerators: &[&str]);
}
