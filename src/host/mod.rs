//! Hosted-window side of a dialog
//!
//! [`DialogHost`] runs next to the page. It forwards the dialog library's
//! lifecycle to the controller as [`HostSignal`]s, keeps the window sized to
//! the popup, plays the open sound and applies controller commands.

pub mod tone;

pub use tone::{AudioSink, Tone};

use crate::options::Sound;
use crate::protocol::{DialogResult, Envelope, HostCommand, HostSignal, InstanceId, SignalRouter};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// DOM-level primitives of the hosted page
pub trait PageSurface: Send + Sync {
    /// Outer window height including frame and title bar
    fn outer_height(&self) -> u32;

    fn content_height(&self) -> u32;

    /// Scroll width and height of the popup element
    fn popup_size(&self) -> (u32, u32);

    /// Remove the default padding around the popup
    fn strip_wrapper_padding(&self);

    fn resize_to(&self, width: u32, height: u32);

    fn show_loading(&self);

    fn hide_loading(&self);
}

/// Outbound half of the signal channel
pub trait SignalSink: Send + Sync {
    fn emit(&self, signal: HostSignal);
}

impl SignalSink for tokio::sync::mpsc::UnboundedSender<HostSignal> {
    fn emit(&self, signal: HostSignal) {
        if self.send(signal).is_err() {
            debug!("Controller no longer listening");
        }
    }
}

/// Sends signals through the wire encoding, as a page bridge would
pub struct RouterSink {
    router: SignalRouter,
    instance: InstanceId,
}

impl RouterSink {
    pub fn new(router: SignalRouter, instance: InstanceId) -> Self {
        Self { router, instance }
    }
}

impl SignalSink for RouterSink {
    fn emit(&self, signal: HostSignal) {
        let envelope = Envelope::new(self.instance.clone(), signal);
        match envelope.encode() {
            Ok(raw) => {
                let _ = self.router.deliver(&raw);
            }
            Err(e) => warn!("Failed to encode host signal: {}", e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Loaded,
    Opening,
    Open,
    Closing,
    Finished,
}

struct HostState {
    stage: Stage,
    chrome_height: u32,
    settled: bool,
    timers: Vec<JoinHandle<()>>,
}

pub struct DialogHost<S: PageSurface> {
    surface: Arc<S>,
    sink: Arc<dyn SignalSink>,
    sound: Option<Sound>,
    audio: Option<Arc<dyn AudioSink>>,
    settle_delay: Duration,
    state: Mutex<HostState>,
}

impl<S: PageSurface + 'static> DialogHost<S> {
    pub fn new(surface: Arc<S>, sink: Arc<dyn SignalSink>) -> Self {
        Self {
            surface,
            sink,
            sound: None,
            audio: None,
            settle_delay: Duration::from_millis(25),
            state: Mutex::new(HostState {
                stage: Stage::Loaded,
                chrome_height: 0,
                settled: false,
                timers: Vec::new(),
            }),
        }
    }

    pub fn with_sound(mut self, sound: Option<Sound>, audio: Arc<dyn AudioSink>) -> Self {
        self.sound = sound;
        self.audio = Some(audio);
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    fn state(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move forward to `stage`; false if the lifecycle is already there or past it
    fn advance(&self, stage: Stage) -> bool {
        let mut state = self.state();
        if state.stage >= stage {
            return false;
        }
        state.stage = stage;
        true
    }

    pub fn before_open(&self, payload: Value) {
        if !self.advance(Stage::Opening) {
            return;
        }
        self.sink.emit(HostSignal::BeforeOpen(payload));

        if let (Some(sound), Some(audio)) = (&self.sound, &self.audio) {
            match Tone::from_sound(sound) {
                Ok(tone) => audio.play(tone),
                Err(e) => warn!("Skipping open sound: {}", e),
            }
        }
    }

    pub fn open(&self, payload: Value) {
        if !self.advance(Stage::Open) {
            return;
        }

        let chrome_height = self
            .surface
            .outer_height()
            .saturating_sub(self.surface.content_height());
        self.state().chrome_height = chrome_height;

        self.surface.strip_wrapper_padding();
        fit(self.surface.as_ref(), chrome_height);

        self.sink.emit(HostSignal::Reposition);
        let sink = self.sink.clone();
        self.schedule(self.settle_delay, move || sink.emit(HostSignal::Reposition));

        self.sink.emit(HostSignal::Open(payload));
    }

    pub fn close(&self, payload: Value) {
        if self.advance(Stage::Closing) {
            self.sink.emit(HostSignal::Close(payload));
        }
    }

    pub fn after_close(&self) {
        if !self.advance(Stage::Finished) {
            return;
        }
        self.cancel_timers();
        self.sink.emit(HostSignal::AfterClose);
    }

    /// Report the dialog outcome. Only the first call is forwarded.
    pub fn settle(&self, result: DialogResult) -> bool {
        {
            let mut state = self.state();
            if state.settled {
                return false;
            }
            state.settled = true;
        }
        self.sink.emit(HostSignal::ReturnPromise(result));
        true
    }

    pub fn handle_command(&self, command: HostCommand) {
        let (stage, chrome_height) = {
            let state = self.state();
            (state.stage, state.chrome_height)
        };
        debug!("Host received {:?} at {:?}", command, stage);

        match command {
            HostCommand::ShowLoading if stage >= Stage::Opening => self.surface.show_loading(),
            HostCommand::HideLoading if stage >= Stage::Open => self.surface.hide_loading(),
            HostCommand::ResizeToFit { delay_ms } if stage >= Stage::Open => match delay_ms {
                Some(delay) => {
                    let surface = self.surface.clone();
                    self.schedule(Duration::from_millis(delay), move || {
                        fit(surface.as_ref(), chrome_height)
                    });
                }
                None => fit(self.surface.as_ref(), chrome_height),
            },
            _ => debug!("Ignoring command before the dialog is ready"),
        }
    }

    fn schedule(&self, delay: Duration, job: impl FnOnce() + Send + 'static) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime for delayed host work; running it now");
            job();
            return;
        };
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            job();
        });

        let mut state = self.state();
        state.timers.retain(|timer| !timer.is_finished());
        state.timers.push(handle);
    }

    fn cancel_timers(&self) {
        for timer in self.state().timers.drain(..) {
            timer.abort();
        }
    }
}

impl<S: PageSurface> Drop for DialogHost<S> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for timer in state.timers.drain(..) {
            timer.abort();
        }
    }
}

/// Size the window to the popup plus the window chrome
fn fit<S: PageSurface + ?Sized>(surface: &S, chrome_height: u32) {
    let (width, height) = surface.popup_size();
    surface.resize_to(width, height + chrome_height + 1);
}
