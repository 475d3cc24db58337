//! In-memory window backend
//!
//! Windows here have no pixels: they record what the controller asks of
//! them and let a caller drive the hosted side through a real
//! [`DialogHost`]. Used by the simulator and by tests.

use super::{NativeWindow, Platform, WindowBackend, WindowEvent, WindowParts};
use crate::error::{AlertError, AlertResult};
use crate::host::{AudioSink, DialogHost, PageSurface, RouterSink, Tone};
use crate::options::{Anchor, Sound, WindowOptions, WorkArea};
use crate::page::HostedPage;
use crate::protocol::{DialogResult, HostCommand, InstanceId, SignalRouter};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

const DEFAULT_WORK_AREA: WorkArea = WorkArea { x: 0, y: 0, width: 1920, height: 1080 };
const TITLE_BAR_HEIGHT: u32 = 28;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type Evaluator = Box<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

pub struct HeadlessBackend {
    platform: Platform,
    work_area: WorkArea,
    router: SignalRouter,
    windows: Mutex<Vec<Arc<HeadlessWindow>>>,
    shortcuts: Mutex<BTreeSet<String>>,
    creation_failure: Mutex<Option<String>>,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(Platform::Linux)
    }
}

impl HeadlessBackend {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            work_area: DEFAULT_WORK_AREA,
            router: SignalRouter::new(),
            windows: Mutex::new(Vec::new()),
            shortcuts: Mutex::new(BTreeSet::new()),
            creation_failure: Mutex::new(None),
        }
    }

    /// Windows created so far; destroyed ones are dropped on the next creation
    pub fn windows(&self) -> Vec<Arc<HeadlessWindow>> {
        lock(&self.windows).clone()
    }

    pub fn window(&self, instance: &InstanceId) -> Option<Arc<HeadlessWindow>> {
        lock(&self.windows)
            .iter()
            .find(|window| window.instance() == instance)
            .cloned()
    }

    pub fn last_window(&self) -> Option<Arc<HeadlessWindow>> {
        lock(&self.windows).last().cloned()
    }

    pub fn registered_shortcuts(&self) -> Vec<String> {
        lock(&self.shortcuts).iter().cloned().collect()
    }

    pub fn router(&self) -> &SignalRouter {
        &self.router
    }

    /// Make the next `create_window` call fail with `message`
    pub fn fail_next_creation(&self, message: impl Into<String>) {
        *lock(&self.creation_failure) = Some(message.into());
    }
}

impl WindowBackend for HeadlessBackend {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn create_window(&self, instance: &InstanceId, options: &WindowOptions) -> AlertResult<WindowParts> {
        if let Some(message) = lock(&self.creation_failure).take() {
            return Err(AlertError::WindowCreation(message));
        }

        let (events_tx, events) = mpsc::unbounded_channel();
        let signals = self.router.subscribe(instance);
        let window = Arc::new(HeadlessWindow::new(
            instance.clone(),
            options.clone(),
            self.work_area,
            self.router.clone(),
            events_tx,
        ));
        info!("Created headless window for {}", instance);
        let mut windows = lock(&self.windows);
        windows.retain(|window| !window.is_destroyed());
        windows.push(window.clone());

        Ok(WindowParts {
            window,
            events,
            signals,
        })
    }

    fn register_shortcuts(&self, accelerators: &[&str]) {
        lock(&self.shortcuts).extend(accelerators.iter().map(|a| a.to_string()));
    }

    fn unregister_shortcuts(&self, accelerators: &[&str]) {
        let mut shortcuts = lock(&self.shortcuts);
        for accelerator in accelerators {
            shortcuts.remove(*accelerator);
        }
    }
}

/// Page primitives backed by fixed popup dimensions
pub struct HeadlessSurface {
    chrome_height: u32,
    popup: Mutex<(u32, u32)>,
    size: Mutex<(u32, u32)>,
    padding_stripped: Mutex<bool>,
    loading: Mutex<bool>,
}

impl HeadlessSurface {
    fn new(chrome_height: u32, size: (u32, u32)) -> Self {
        Self {
            chrome_height,
            popup: Mutex::new((400, 240)),
            size: Mutex::new(size),
            padding_stripped: Mutex::new(false),
            loading: Mutex::new(false),
        }
    }

    pub fn set_popup_size(&self, width: u32, height: u32) {
        *lock(&self.popup) = (width, height);
    }

    pub fn size(&self) -> (u32, u32) {
        *lock(&self.size)
    }

    pub fn is_loading(&self) -> bool {
        *lock(&self.loading)
    }

    pub fn padding_stripped(&self) -> bool {
        *lock(&self.padding_stripped)
    }
}

impl PageSurface for HeadlessSurface {
    fn outer_height(&self) -> u32 {
        lock(&self.size).1
    }

    fn content_height(&self) -> u32 {
        lock(&self.size).1.saturating_sub(self.chrome_height)
    }

    fn popup_size(&self) -> (u32, u32) {
        *lock(&self.popup)
    }

    fn strip_wrapper_padding(&self) {
        *lock(&self.padding_stripped) = true;
    }

    fn resize_to(&self, width: u32, height: u32) {
        *lock(&self.size) = (width, height);
    }

    fn show_loading(&self) {
        *lock(&self.loading) = true;
    }

    fn hide_loading(&self) {
        *lock(&self.loading) = false;
    }
}

/// Collects tones instead of playing them
#[derive(Default)]
pub struct RecordingAudio {
    played: Mutex<Vec<Tone>>,
}

impl RecordingAudio {
    pub fn played(&self) -> Vec<Tone> {
        lock(&self.played).clone()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&self, tone: Tone) {
        debug!("Playing {:?} tone at {} Hz", tone.waveform, tone.frequency);
        lock(&self.played).push(tone);
    }
}

#[derive(Default)]
struct WindowState {
    page: Option<(PathBuf, Option<Sound>, Map<String, Value>)>,
    menu_removed: bool,
    shown: bool,
    show_count: usize,
    destroyed: bool,
    anchors: Vec<Anchor>,
    origin: Option<(i32, i32)>,
    scripts: Vec<String>,
    commands: Vec<HostCommand>,
}

pub struct HeadlessWindow {
    instance: InstanceId,
    options: WindowOptions,
    work_area: WorkArea,
    router: SignalRouter,
    events: mpsc::UnboundedSender<WindowEvent>,
    state: Mutex<WindowState>,
    evaluator: Mutex<Option<Evaluator>>,
    surface: Arc<HeadlessSurface>,
    audio: Arc<RecordingAudio>,
    host: Mutex<Option<Arc<DialogHost<HeadlessSurface>>>>,
}

impl HeadlessWindow {
    fn new(
        instance: InstanceId,
        options: WindowOptions,
        work_area: WorkArea,
        router: SignalRouter,
        events: mpsc::UnboundedSender<WindowEvent>,
    ) -> Self {
        let chrome = if options.frame { TITLE_BAR_HEIGHT } else { 0 };
        let surface = Arc::new(HeadlessSurface::new(chrome, (options.width, options.height)));
        Self {
            instance,
            options,
            work_area,
            router,
            events,
            state: Mutex::new(WindowState::default()),
            evaluator: Mutex::new(None),
            surface,
            audio: Arc::new(RecordingAudio::default()),
            host: Mutex::new(None),
        }
    }

    fn emit(&self, event: WindowEvent) {
        let _ = self.events.send(event);
    }

    pub fn instance(&self) -> &InstanceId {
        &self.instance
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn surface(&self) -> &HeadlessSurface {
        &self.surface
    }

    pub fn audio(&self) -> &RecordingAudio {
        &self.audio
    }

    pub fn is_shown(&self) -> bool {
        lock(&self.state).shown
    }

    pub fn show_count(&self) -> usize {
        lock(&self.state).show_count
    }

    pub fn menu_removed(&self) -> bool {
        lock(&self.state).menu_removed
    }

    pub fn page_path(&self) -> Option<PathBuf> {
        lock(&self.state).page.as_ref().map(|(path, _, _)| path.clone())
    }

    pub fn page_config(&self) -> Option<Map<String, Value>> {
        lock(&self.state).page.as_ref().map(|(_, _, config)| config.clone())
    }

    pub fn anchors(&self) -> Vec<Anchor> {
        lock(&self.state).anchors.clone()
    }

    pub fn origin(&self) -> Option<(i32, i32)> {
        lock(&self.state).origin
    }

    pub fn scripts(&self) -> Vec<String> {
        lock(&self.state).scripts.clone()
    }

    pub fn commands(&self) -> Vec<HostCommand> {
        lock(&self.state).commands.clone()
    }

    /// Answer `eval` calls with `evaluator`
    pub fn on_eval(&self, evaluator: impl Fn(&str) -> Result<Value, String> + Send + Sync + 'static) {
        *lock(&self.evaluator) = Some(Box::new(evaluator));
    }

    /// Native close request, as if the user closed the window
    pub fn request_close(&self) {
        if self.is_destroyed() {
            return;
        }
        self.emit(WindowEvent::Close);
        self.destroy();
    }

    pub fn blur(&self) {
        self.emit(WindowEvent::Blur);
    }

    /// The hosted side of this window, created on first use
    pub fn host(&self) -> Arc<DialogHost<HeadlessSurface>> {
        let mut slot = lock(&self.host);
        if let Some(host) = slot.as_ref() {
            return host.clone();
        }

        let sound = lock(&self.state).page.as_ref().and_then(|(_, sound, _)| sound.clone());
        let sink = Arc::new(RouterSink::new(self.router.clone(), self.instance.clone()));
        let host = Arc::new(
            DialogHost::new(self.surface.clone(), sink)
                .with_sound(sound, self.audio.clone())
                .with_settle_delay(Duration::from_millis(5)),
        );
        *slot = Some(host.clone());
        host
    }

    /// Walk the hosted dialog through open, settle and close
    pub fn run_dialog(&self, outcome: DialogResult) {
        let host = self.host();
        host.before_open(json!({}));
        host.open(json!({}));
        host.settle(outcome);
        host.close(json!({}));
        host.after_close();
    }
}

#[async_trait]
impl NativeWindow for HeadlessWindow {
    fn load_page(&self, page: &HostedPage) -> AlertResult<()> {
        if self.is_destroyed() {
            return Err(AlertError::PageLoad("window has been destroyed".to_string()));
        }
        if !page.path().exists() {
            return Err(AlertError::PageLoad(format!("{} does not exist", page.path().display())));
        }

        lock(&self.state).page = Some((
            page.path().to_path_buf(),
            page.sound().cloned(),
            page.config().clone(),
        ));
        debug!("Loaded {} into {}", page.url(), self.instance);
        self.emit(WindowEvent::ReadyToShow);
        Ok(())
    }

    fn remove_menu(&self) {
        lock(&self.state).menu_removed = true;
    }

    fn move_to(&self, anchor: Anchor) {
        let (width, height) = self.surface.size();
        let mut state = lock(&self.state);
        state.anchors.push(anchor);
        state.origin = Some(anchor.origin(self.work_area, width, height));
    }

    fn show(&self) {
        let mut state = lock(&self.state);
        if state.destroyed {
            return;
        }
        state.shown = true;
        state.show_count += 1;
    }

    fn focus(&self) {
        if !self.is_destroyed() {
            self.emit(WindowEvent::Focus);
        }
    }

    fn is_destroyed(&self) -> bool {
        lock(&self.state).destroyed
    }

    fn destroy(&self) {
        {
            let mut state = lock(&self.state);
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.shown = false;
        }
        self.router.unsubscribe(&self.instance);
        self.emit(WindowEvent::Closed);
    }

    async fn eval(&self, script: &str) -> AlertResult<Value> {
        {
            let mut state = lock(&self.state);
            if state.destroyed {
                return Err(AlertError::WindowDestroyed);
            }
            state.scripts.push(script.to_string());
        }

        match lock(&self.evaluator).as_ref() {
            Some(evaluator) => evaluator(script).map_err(AlertError::Evaluation),
            None => Ok(Value::Null),
        }
    }

    fn send(&self, command: HostCommand) {
        lock(&self.state).commands.push(command.clone());
        let host = lock(&self.host).clone();
        if let Some(host) = host {
            host.handle_command(command);
        }
    }
}
