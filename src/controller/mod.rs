//! Controller side of a dialog
//!
//! [`AlertRuntime`] composes the window backend, configuration and the
//! singleton registry. Each [`DialogController`] owns at most one live
//! dialog instance at a time; [`DialogController::fire`] creates it and
//! returns a [`PendingDialog`] that resolves exactly once.

mod exception;
mod lifecycle;
pub mod registry;
mod remote;

pub use exception::{ErrorReport, ExceptionHandler};
pub use registry::SingletonRegistry;

use crate::config::AlertConfig;
use crate::error::{AlertError, AlertResult};
use crate::options::dialog::{
    KEY_ALLOW_OUTSIDE_CLICK, KEY_ANIMATION, KEY_BACKDROP, KEY_TOAST,
};
use crate::options::{
    Anchor, FireOptions, ParentWindow, StructuredOptions, WindowOptions, WindowOverrides,
};
use crate::page::{HostedPage, PageSpec};
use crate::protocol::{DialogResult, DismissReason, InstanceId};
use crate::window::{NativeWindow, Platform, WindowBackend};
use lifecycle::Lifecycle;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Backdrop forced on frameless dialogs
pub const FRAMELESS_BACKDROP: &str = "rgba(0,0,0,0.0)";

const DRAGGABLE_EXEMPT: [(&str, &str); 4] = [
    ("closeButton", "no-drag"),
    ("confirmButton", "no-drag"),
    ("cancelButton", "no-drag"),
    ("input", "no-drag"),
];

/// Everything dialogs of one application share
pub struct AlertRuntime {
    backend: Arc<dyn WindowBackend>,
    registry: SingletonRegistry,
    config: AlertConfig,
    library: String,
}

impl AlertRuntime {
    pub fn new(backend: Arc<dyn WindowBackend>, config: AlertConfig) -> AlertResult<Arc<Self>> {
        Self::with_registry(backend, config, SingletonRegistry::new())
    }

    /// Build a runtime around an existing registry
    pub fn with_registry(
        backend: Arc<dyn WindowBackend>,
        config: AlertConfig,
        registry: SingletonRegistry,
    ) -> AlertResult<Arc<Self>> {
        let library = config.library.load()?;
        if library.is_empty() {
            warn!("No dialog library configured; generated pages will not render a dialog");
        }
        Ok(Arc::new(Self {
            backend,
            registry,
            config,
            library,
        }))
    }

    pub fn controller(self: &Arc<Self>) -> DialogController {
        DialogController::new(self.clone())
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    pub fn registry(&self) -> &SingletonRegistry {
        &self.registry
    }

    pub fn platform(&self) -> Platform {
        self.backend.platform()
    }
}

struct LiveInstance {
    id: InstanceId,
    window: Arc<dyn NativeWindow>,
    visible: bool,
}

/// State shared between a controller and its lifecycle task.
///
/// A live instance whose window is already destroyed counts as gone, even
/// before its lifecycle task has run teardown.
#[derive(Default)]
struct Shared {
    live: Mutex<Option<LiveInstance>>,
    anchor: Mutex<Anchor>,
}

impl Shared {
    fn live(&self) -> MutexGuard<'_, Option<LiveInstance>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current<T>(&self, read: impl FnOnce(&LiveInstance) -> T) -> Option<T> {
        self.live()
            .as_ref()
            .filter(|live| !live.window.is_destroyed())
            .map(read)
    }

    fn window(&self) -> Option<Arc<dyn NativeWindow>> {
        self.current(|live| live.window.clone())
    }

    fn instance(&self) -> Option<InstanceId> {
        self.current(|live| live.id.clone())
    }

    fn is_visible(&self) -> bool {
        self.current(|live| live.visible).unwrap_or(false)
    }

    fn set_visible(&self, instance: &InstanceId, visible: bool) {
        if let Some(live) = self.live().as_mut().filter(|live| &live.id == instance) {
            live.visible = visible;
        }
    }

    /// Forget the window of `instance`
    fn clear(&self, instance: &InstanceId) {
        let mut live = self.live();
        if live.as_ref().map(|l| &l.id == instance).unwrap_or(false) {
            *live = None;
        }
    }
}

/// Result of a fire call; resolves once with the dialog outcome
pub struct PendingDialog {
    instance: InstanceId,
    state: PendingState,
}

enum PendingState {
    Ready(Option<DialogResult>),
    Waiting(oneshot::Receiver<DialogResult>),
}

impl PendingDialog {
    fn ready(instance: InstanceId, result: DialogResult) -> Self {
        Self {
            instance,
            state: PendingState::Ready(Some(result)),
        }
    }

    fn waiting(instance: InstanceId, rx: oneshot::Receiver<DialogResult>) -> Self {
        Self {
            instance,
            state: PendingState::Waiting(rx),
        }
    }

    pub fn instance(&self) -> &InstanceId {
        &self.instance
    }
}

impl Future for PendingDialog {
    type Output = DialogResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let closed = || DialogResult::dismissed(DismissReason::Close);
        match &mut self.get_mut().state {
            PendingState::Ready(result) => Poll::Ready(result.take().unwrap_or_else(closed)),
            PendingState::Waiting(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(result)) => Poll::Ready(result),
                // The lifecycle task vanished without reporting
                Poll::Ready(Err(_)) => Poll::Ready(closed()),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

pub struct DialogController {
    runtime: Arc<AlertRuntime>,
    head: Vec<String>,
    shared: Arc<Shared>,
}

impl DialogController {
    pub fn new(runtime: Arc<AlertRuntime>) -> Self {
        let head = runtime.config.head.clone();
        Self {
            runtime,
            head,
            shared: Arc::new(Shared::default()),
        }
    }

    /// Extra head markup for pages of this controller, after the configured one
    pub fn with_head(mut self, head: impl IntoIterator<Item = String>) -> Self {
        self.head.extend(head);
        self
    }

    pub fn runtime(&self) -> &Arc<AlertRuntime> {
        &self.runtime
    }

    /// Id of the live instance, if any
    pub fn instance(&self) -> Option<InstanceId> {
        self.shared.instance()
    }

    pub fn is_visible(&self) -> bool {
        self.shared.is_visible()
    }

    /// Anchor of the current or most recent dialog
    pub fn position(&self) -> Anchor {
        *self.shared.anchor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn window(&self) -> Option<Arc<dyn NativeWindow>> {
        self.shared.window()
    }

    /// Transparent, borderless dialog
    pub fn fire_frameless(&self, options: impl Into<FireOptions>) -> AlertResult<PendingDialog> {
        let mut options = options.into().into_structured();

        let mut window = WindowOverrides::frameless().merged(&options.window);
        if let Some(size) = options.size.take() {
            size.apply_to(&mut window);
        }
        options.window = window;

        options.dialog.insert(KEY_BACKDROP, FRAMELESS_BACKDROP);
        options.dialog.insert(KEY_ALLOW_OUTSIDE_CLICK, false);

        self.fire(options)
    }

    /// Dialog inside a regular titled window
    pub fn fire_with_frame(&self, options: impl Into<FireOptions>) -> AlertResult<PendingDialog> {
        let mut options = options.into().into_structured();

        let title = options
            .title
            .clone()
            .unwrap_or_else(|| self.runtime.config.app_name.clone());
        let mut window = WindowOverrides::framed(title).merged(&options.window);
        if let Some(size) = options.size.take() {
            size.apply_to(&mut window);
        }
        options.window = window;
        options.draggable = false;

        options.dialog.insert(KEY_ALLOW_OUTSIDE_CLICK, false);
        options.dialog.insert(KEY_ANIMATION, false);
        options.dialog.merge_custom_class(&[("popup", "border-radius-0")]);

        self.fire(options)
    }

    /// Toast on a fresh controller, attached to the focused window
    pub fn fire_toast(
        runtime: &Arc<AlertRuntime>,
        options: impl Into<FireOptions>,
    ) -> AlertResult<PendingDialog> {
        let options = options.into().into_structured();

        let mut dialog = options.dialog;
        dialog.insert(KEY_TOAST, true);

        let toast = StructuredOptions {
            dialog,
            window: WindowOverrides::default(),
            title: None,
            parent: Some(ParentWindow::Focused),
            always_on_top: Some(false),
            draggable: false,
            sound: options.sound,
            size: options.size,
        };

        runtime.controller().fire_frameless(toast)
    }

    /// Create, configure and track one dialog
    pub fn fire(&self, options: impl Into<FireOptions>) -> AlertResult<PendingDialog> {
        let StructuredOptions {
            mut dialog,
            window: mut overrides,
            parent,
            always_on_top,
            draggable,
            sound,
            size,
            title: _,
        } = options.into().into_structured();

        let config = &self.runtime.config;
        let mut resolved = WindowOptions::base(config.base_width, config.base_height, config.dev_tools);
        if let Some(size) = size {
            size.apply_to(&mut overrides);
        }
        overrides.apply_to(&mut resolved);

        resolved.show = false;
        if let Some(parent) = parent {
            resolved.parent = Some(parent);
            resolved.modal = true;
        }
        resolved.skip_taskbar = true;
        resolved.privileged_scripting = true;
        if let Some(always_on_top) = always_on_top {
            resolved.always_on_top = always_on_top;
        }

        if draggable {
            dialog.merge_custom_class(&DRAGGABLE_EXEMPT);
        }

        let instance = InstanceId::generate();
        let singleton = dialog.singleton_key();
        if let Some(key) = &singleton {
            if let Err(holder) = self.runtime.registry.reserve(key, &instance) {
                info!("Dialog with singleton key {:?} already showing", key);
                if let Some(window) = holder {
                    window.show();
                    window.focus();
                }
                return Ok(PendingDialog::ready(
                    instance,
                    DialogResult::dismissed(DismissReason::Showing),
                ));
            }
        }

        let launch = Launch {
            instance: instance.clone(),
            dialog,
            resolved,
            draggable,
            sound,
            singleton: singleton.clone(),
        };
        let launched = self
            .idle_runtime()
            .and_then(|handle| self.launch(launch, &handle));
        if launched.is_err() {
            if let Some(key) = &singleton {
                self.runtime.registry.release(key, &instance);
            }
        }
        launched
    }

    /// Runtime to spawn on, once this controller has no live instance
    fn idle_runtime(&self) -> AlertResult<tokio::runtime::Handle> {
        if let Some(instance) = self.instance() {
            return Err(AlertError::InstanceBusy(instance.to_string()));
        }
        tokio::runtime::Handle::try_current().map_err(|e| AlertError::Runtime(e.to_string()))
    }

    fn launch(&self, launch: Launch, handle: &tokio::runtime::Handle) -> AlertResult<PendingDialog> {
        let Launch {
            instance,
            mut dialog,
            resolved,
            draggable,
            sound,
            singleton,
        } = launch;
        let runtime = &self.runtime;

        let parts = runtime.backend.create_window(&instance, &resolved)?;
        let window = parts.window.clone();
        info!("Created dialog window {}", instance);

        if let Some(key) = &singleton {
            runtime.registry.attach(key, &instance, window.clone());
        }

        let anchor = dialog
            .take_position()
            .map(|position| Anchor::from_symbolic(&position))
            .unwrap_or_default();
        *self.shared.anchor.lock().unwrap_or_else(PoisonError::into_inner) = anchor;

        let platform = runtime.backend.platform();
        let pinned = !(platform.positions_modal_children() && resolved.parent.is_some());
        if pinned {
            window.move_to(anchor);
        }

        let sound = sound.and_then(|sound| match sound.resolved() {
            Ok(sound) => Some(sound),
            Err(e) => {
                warn!("Dropping open sound: {}", e);
                None
            }
        });

        let loaded = HostedPage::write(&PageSpec {
            instance: &instance,
            library: &runtime.library,
            head: &self.head,
            draggable,
            sound: sound.as_ref(),
            config: dialog.fields(),
            settle_delay_ms: runtime.config.reposition_settle_ms,
        })
        .and_then(|page| {
            window.remove_menu();
            window.load_page(&page)?;
            Ok(page)
        });
        let page = match loaded {
            Ok(page) => page,
            Err(e) => {
                window.destroy();
                return Err(e);
            }
        };

        let (result_tx, result_rx) = oneshot::channel();
        *self.shared.live() = Some(LiveInstance {
            id: instance.clone(),
            window: window.clone(),
            visible: false,
        });

        let lifecycle = Lifecycle {
            instance: instance.clone(),
            window,
            backend: runtime.backend.clone(),
            registry: runtime.registry.clone(),
            singleton,
            shared: self.shared.clone(),
            observers: dialog.observers().to_vec(),
            anchor,
            pinned,
            suppress_refresh: platform == Platform::MacOs,
            page,
            events: parts.events,
            signals: Some(parts.signals),
            result_tx,
            teardown_grace: runtime.config.teardown_grace(),
        };
        handle.spawn(lifecycle.run());

        Ok(PendingDialog::waiting(instance, result_rx))
    }
}

struct Launch {
    instance: InstanceId,
    dialog: crate::options::DialogOptions,
    resolved: WindowOptions,
    draggable: bool,
    sound: Option<crate::options::Sound>,
    singleton: Option<String>,
}

#[cfg(test)]
mod tests;
