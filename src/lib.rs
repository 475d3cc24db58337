//! Alert dialogs hosted in their own native window
//!
//! A controller creates one window per dialog, loads a generated page that
//! runs the dialog library, and follows the page through its lifecycle over
//! a typed signal protocol until it reports a result.

pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod options;
pub mod page;
pub mod protocol;
pub mod window;

pub use config::{AlertConfig, LibrarySource};
pub use controller::{
    AlertRuntime, DialogController, ErrorReport, ExceptionHandler, PendingDialog, SingletonRegistry,
};
pub use error::{AlertError, AlertResult};
pub use options::{
    Anchor, DialogOptions, FireOptions, Hooks, LifecycleObserver, ParentWindow, Position, Sound,
    StructuredOptions, Waveform, WindowOverrides, WindowSize,
};
pub use protocol::{DialogResult, DismissReason, HostCommand, HostSignal, InstanceId};
pub use window::{HeadlessBackend, NativeWindow, Platform, WindowBackend};
#[cfg(feature = "webview")]
pub use window::{WebviewBackend, WebviewEventLoop};
