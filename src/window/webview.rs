//! Native backend on `tao` windows and `wry` webviews
//!
//! `tao` wants its event loop on the main thread, and the loop never
//! returns. [`WebviewBackend::new`] therefore hands back the backend, which
//! is cheap to share with controllers on other threads, and a
//! [`WebviewEventLoop`] the main thread runs. Every window operation is
//! posted to that loop as a request.
//!
//! ```ignore
//! let (backend, event_loop) = WebviewBackend::new();
//! std::thread::spawn(move || {
//!     let rt = tokio::runtime::Runtime::new()?;
//!     rt.block_on(async {
//!         let runtime = AlertRuntime::new(backend, AlertConfig::init().await?)?;
//!         let result = runtime.controller().fire(DialogOptions::new().title("Hi"))?.await;
//!         println!("{:?}", result);
//!         anyhow::Ok(())
//!     })
//! });
//! event_loop.run();
//! ```

use super::bridge::{command_script, forward_ipc, parse_eval_result};
use super::{NativeWindow, Platform, WindowBackend, WindowEvent, WindowParts};
use crate::error::{AlertError, AlertResult};
use crate::options::{Anchor, WindowOptions, WorkArea};
use crate::page::HostedPage;
use crate::protocol::{HostCommand, InstanceId, SignalRouter};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc as std_mpsc, Arc, Mutex, MutexGuard, PoisonError};
use tao::dpi::{LogicalSize, PhysicalPosition};
use tao::event::{Event, WindowEvent as TaoEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy, EventLoopWindowTarget};
use tao::window::{Window, WindowBuilder, WindowId};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use wry::{PageLoadEvent, WebView, WebViewBuilder};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State a window handle shares with its entry in the event loop
struct Link {
    destroyed: AtomicBool,
    events: mpsc::UnboundedSender<WindowEvent>,
}

impl Link {
    fn emit(&self, event: WindowEvent) {
        let _ = self.events.send(event);
    }

    /// Mark the window gone; emits [`WindowEvent::Closed`] the first time
    fn close(&self) -> bool {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.emit(WindowEvent::Closed);
        true
    }
}

type EvalReply = oneshot::Sender<AlertResult<Value>>;

/// Work for the event loop thread
enum Request {
    Create {
        instance: InstanceId,
        options: WindowOptions,
        link: Arc<Link>,
        reply: std_mpsc::Sender<AlertResult<()>>,
    },
    Load {
        instance: InstanceId,
        url: String,
    },
    Move {
        instance: InstanceId,
        anchor: Anchor,
    },
    Show(InstanceId),
    Focus(InstanceId),
    Destroy(InstanceId),
    Script {
        instance: InstanceId,
        script: String,
        reply: Option<EvalReply>,
    },
}

pub struct WebviewBackend {
    proxy: Mutex<EventLoopProxy<Request>>,
    router: SignalRouter,
}

impl WebviewBackend {
    /// Must be called on the thread that will run the returned loop
    pub fn new() -> (Arc<Self>, WebviewEventLoop) {
        let event_loop = EventLoopBuilder::<Request>::with_user_event().build();
        let router = SignalRouter::new();
        let backend = Arc::new(Self {
            proxy: Mutex::new(event_loop.create_proxy()),
            router: router.clone(),
        });
        (backend, WebviewEventLoop { event_loop, router })
    }

    fn request(&self, request: Request) -> AlertResult<()> {
        lock(&self.proxy)
            .send_event(request)
            .map_err(|_| AlertError::WindowCreation("window event loop has exited".to_string()))
    }
}

impl WindowBackend for WebviewBackend {
    fn platform(&self) -> Platform {
        Platform::current()
    }

    fn create_window(&self, instance: &InstanceId, options: &WindowOptions) -> AlertResult<WindowParts> {
        let (events_tx, events) = mpsc::unbounded_channel();
        let signals = self.router.subscribe(instance);
        let link = Arc::new(Link {
            destroyed: AtomicBool::new(false),
            events: events_tx,
        });

        let (reply, created) = std_mpsc::channel();
        let created = self
            .request(Request::Create {
                instance: instance.clone(),
                options: options.clone(),
                link: link.clone(),
                reply,
            })
            .and_then(|_| {
                created.recv().unwrap_or_else(|_| {
                    Err(AlertError::WindowCreation("window event loop has exited".to_string()))
                })
            });
        if let Err(e) = created {
            self.router.unsubscribe(instance);
            return Err(e);
        }

        let window = Arc::new(WebviewWindow {
            instance: instance.clone(),
            link,
            proxy: Mutex::new(lock(&self.proxy).clone()),
        });
        Ok(WindowParts {
            window,
            events,
            signals,
        })
    }

    fn register_shortcuts(&self, accelerators: &[&str]) {
        // tao has no global accelerators; webviews get no reload binding either
        debug!("Shortcut overrides not needed for webview windows: {:?}", accelerators);
    }

    fn unregister_shortcuts(&self, accelerators: &[&str]) {
        debug!("Releasing shortcut overrides: {:?}", accelerators);
    }
}

pub struct WebviewWindow {
    instance: InstanceId,
    link: Arc<Link>,
    proxy: Mutex<EventLoopProxy<Request>>,
}

impl WebviewWindow {
    fn request(&self, request: Request) {
        if lock(&self.proxy).send_event(request).is_err() {
            debug!("Event loop gone; dropping request for {}", self.instance);
        }
    }
}

#[async_trait]
impl NativeWindow for WebviewWindow {
    fn load_page(&self, page: &HostedPage) -> AlertResult<()> {
        if self.is_destroyed() {
            return Err(AlertError::PageLoad("window has been destroyed".to_string()));
        }
        if !page.path().exists() {
            return Err(AlertError::PageLoad(format!("{} does not exist", page.path().display())));
        }
        self.request(Request::Load {
            instance: self.instance.clone(),
            url: page.url(),
        });
        Ok(())
    }

    fn remove_menu(&self) {
        // tao windows carry no menu bar unless one is attached
    }

    fn move_to(&self, anchor: Anchor) {
        self.request(Request::Move {
            instance: self.instance.clone(),
            anchor,
        });
    }

    fn show(&self) {
        if !self.is_destroyed() {
            self.request(Request::Show(self.instance.clone()));
        }
    }

    fn focus(&self) {
        if !self.is_destroyed() {
            self.request(Request::Focus(self.instance.clone()));
        }
    }

    fn is_destroyed(&self) -> bool {
        self.link.destroyed.load(Ordering::SeqCst)
    }

    fn destroy(&self) {
        if self.link.close() {
            self.request(Request::Destroy(self.instance.clone()));
        }
    }

    async fn eval(&self, script: &str) -> AlertResult<Value> {
        if self.is_destroyed() {
            return Err(AlertError::WindowDestroyed);
        }
        let (reply, result) = oneshot::channel();
        self.request(Request::Script {
            instance: self.instance.clone(),
            script: script.to_string(),
            reply: Some(reply),
        });
        result.await.unwrap_or(Err(AlertError::WindowDestroyed))
    }

    fn send(&self, command: HostCommand) {
        match command_script(&command) {
            Ok(script) => self.request(Request::Script {
                instance: self.instance.clone(),
                script,
                reply: None,
            }),
            Err(e) => warn!("Failed to encode {:?}: {}", command, e),
        }
    }
}

struct Entry {
    window: Window,
    webview: Option<WebView>,
    link: Arc<Link>,
    options: WindowOptions,
}

/// The main-thread half of [`WebviewBackend`]
pub struct WebviewEventLoop {
    event_loop: EventLoop<Request>,
    router: SignalRouter,
}

impl WebviewEventLoop {
    pub fn run(self) -> ! {
        let mut windows = Windows {
            entries: HashMap::new(),
            ids: HashMap::new(),
            router: self.router,
        };
        self.event_loop.run(move |event, target, control_flow| {
            *control_flow = ControlFlow::Wait;
            match event {
                Event::UserEvent(request) => windows.handle(request, target),
                Event::WindowEvent { window_id, event, .. } => windows.window_event(window_id, event),
                _ => {}
            }
        })
    }
}

struct Windows {
    entries: HashMap<InstanceId, Entry>,
    ids: HashMap<WindowId, InstanceId>,
    router: SignalRouter,
}

impl Windows {
    fn handle(&mut self, request: Request, target: &EventLoopWindowTarget<Request>) {
        match request {
            Request::Create {
                instance,
                options,
                link,
                reply,
            } => {
                let created = build_window(&options, target).map(|window| {
                    self.ids.insert(window.id(), instance.clone());
                    self.entries.insert(
                        instance.clone(),
                        Entry {
                            window,
                            webview: None,
                            link,
                            options,
                        },
                    );
                    info!("Created webview window for {}", instance);
                });
                let _ = reply.send(created);
            }
            Request::Load { instance, url } => {
                let router = self.router.clone();
                let Some(entry) = self.entries.get_mut(&instance) else {
                    return;
                };
                match build_webview(entry, &url, router) {
                    Ok(webview) => entry.webview = Some(webview),
                    Err(e) => {
                        warn!("Failed to load {} into {}: {}", url, instance, e);
                        self.destroy(&instance);
                    }
                }
            }
            Request::Move { instance, anchor } => {
                if let Some(entry) = self.entries.get(&instance) {
                    move_window(&entry.window, anchor);
                }
            }
            Request::Show(instance) => {
                if let Some(entry) = self.entries.get(&instance) {
                    entry.window.set_visible(true);
                }
            }
            Request::Focus(instance) => {
                if let Some(entry) = self.entries.get(&instance) {
                    entry.window.set_focus();
                }
            }
            Request::Destroy(instance) => self.destroy(&instance),
            Request::Script {
                instance,
                script,
                reply,
            } => self.script(&instance, &script, reply),
        }
    }

    fn script(&self, instance: &InstanceId, script: &str, reply: Option<EvalReply>) {
        let Some(webview) = self.entries.get(instance).and_then(|entry| entry.webview.as_ref()) else {
            if let Some(reply) = reply {
                let _ = reply.send(Err(AlertError::WindowDestroyed));
            }
            return;
        };

        let Some(reply) = reply else {
            if let Err(e) = webview.evaluate_script(script) {
                warn!("Script failed in {}: {}", instance, e);
            }
            return;
        };

        let reply = Arc::new(Mutex::new(Some(reply)));
        let respond = reply.clone();
        let evaluated = webview.evaluate_script_with_callback(script, move |raw| {
            if let Some(reply) = lock(&respond).take() {
                let _ = reply.send(parse_eval_result(&raw));
            }
        });
        if let Err(e) = evaluated {
            if let Some(reply) = lock(&reply).take() {
                let _ = reply.send(Err(AlertError::Evaluation(e.to_string())));
            }
        }
    }

    fn window_event(&mut self, window_id: WindowId, event: TaoEvent<'_>) {
        let Some(instance) = self.ids.get(&window_id).cloned() else {
            return;
        };
        let Some(entry) = self.entries.get(&instance) else {
            return;
        };
        match event {
            TaoEvent::CloseRequested => {
                if entry.options.closable {
                    entry.link.emit(WindowEvent::Close);
                    self.destroy(&instance);
                }
            }
            TaoEvent::Focused(true) => entry.link.emit(WindowEvent::Focus),
            TaoEvent::Focused(false) => entry.link.emit(WindowEvent::Blur),
            TaoEvent::Destroyed => self.destroy(&instance),
            _ => {}
        }
    }

    /// Drop the webview and window of `instance`
    fn destroy(&mut self, instance: &InstanceId) {
        if let Some(entry) = self.entries.remove(instance) {
            self.ids.remove(&entry.window.id());
            entry.link.close();
            debug!("Destroyed webview window for {}", instance);
        }
        self.router.unsubscribe(instance);
    }
}

fn build_window(options: &WindowOptions, target: &EventLoopWindowTarget<Request>) -> AlertResult<Window> {
    if options.parent.is_some() {
        debug!("Parent windows are not attached by the webview backend");
    }
    WindowBuilder::new()
        .with_title(options.title.clone().unwrap_or_default())
        .with_inner_size(LogicalSize::new(options.width, options.height))
        .with_resizable(options.resizable)
        .with_minimizable(options.minimizable)
        .with_maximizable(options.maximizable)
        .with_closable(options.closable)
        .with_decorations(options.frame)
        .with_transparent(options.transparent)
        .with_always_on_top(options.always_on_top)
        .with_visible(options.show)
        .build(target)
        .map_err(|e| AlertError::WindowCreation(e.to_string()))
}

fn build_webview(entry: &Entry, url: &str, router: SignalRouter) -> AlertResult<WebView> {
    let link = entry.link.clone();
    WebViewBuilder::new(&entry.window)
        .with_transparent(entry.options.transparent)
        .with_devtools(entry.options.dev_tools)
        .with_ipc_handler(move |request| {
            forward_ipc(&router, request.body());
        })
        .with_on_page_load_handler(move |event, _url| {
            if matches!(event, PageLoadEvent::Finished) {
                link.emit(WindowEvent::ReadyToShow);
            }
        })
        .with_url(url)
        .build()
        .map_err(|e| AlertError::PageLoad(e.to_string()))
}

fn move_window(window: &Window, anchor: Anchor) {
    let Some(monitor) = window.current_monitor() else {
        debug!("No monitor to position against");
        return;
    };
    let position = monitor.position();
    let size = monitor.size();
    let area = WorkArea {
        x: position.x,
        y: position.y,
        width: size.width,
        height: size.height,
    };
    let outer = window.outer_size();
    let (x, y) = anchor.origin(area, outer.width, outer.height);
    window.set_outer_position(PhysicalPosition::new(x, y));
}
