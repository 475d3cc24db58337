//! Per-instance lifecycle task
//!
//! Consumes the window's native events and the page's signals in arrival
//! order until the window is gone, then tears the instance down and
//! delivers the result.

use super::registry::SingletonRegistry;
use super::Shared;
use crate::options::{Anchor, LifecycleObserver};
use crate::page::HostedPage;
use crate::protocol::{DialogResult, DismissReason, HostSignal, InstanceId};
use crate::window::{NativeWindow, WindowBackend, WindowEvent, REFRESH_SHORTCUTS};
use serde_json::{json, Value};
use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Sleep;
use tracing::{debug, info, warn};

#[derive(Default)]
struct Seen {
    before_open: bool,
    open: bool,
    close: bool,
    after_close: bool,
}

pub(super) struct Lifecycle {
    pub instance: InstanceId,
    pub window: Arc<dyn NativeWindow>,
    pub backend: Arc<dyn WindowBackend>,
    pub registry: SingletonRegistry,
    pub singleton: Option<String>,
    pub shared: Arc<Shared>,
    pub observers: Vec<Arc<dyn LifecycleObserver>>,
    pub anchor: Anchor,
    /// False where the platform places modal children itself
    pub pinned: bool,
    /// Swallow refresh accelerators while focused
    pub suppress_refresh: bool,
    pub page: HostedPage,
    pub events: mpsc::UnboundedReceiver<WindowEvent>,
    pub signals: Option<mpsc::UnboundedReceiver<HostSignal>>,
    pub result_tx: oneshot::Sender<DialogResult>,
    pub teardown_grace: Duration,
}

struct State {
    seen: Seen,
    result: Option<DialogResult>,
}

async fn next_signal(signals: &mut Option<mpsc::UnboundedReceiver<HostSignal>>) -> Option<HostSignal> {
    match signals {
        Some(rx) => rx.recv().await,
        None => pending().await,
    }
}

async fn expire(grace: &mut Option<Pin<Box<Sleep>>>) {
    match grace {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}

impl Lifecycle {
    pub async fn run(mut self) {
        let mut state = State {
            seen: Seen::default(),
            result: None,
        };
        let mut grace: Option<Pin<Box<Sleep>>> = None;

        loop {
            tokio::select! {
                biased;

                signal = next_signal(&mut self.signals) => match signal {
                    Some(signal) => {
                        if self.on_signal(signal, &mut state) {
                            grace = Some(Box::pin(tokio::time::sleep(self.teardown_grace)));
                        }
                    }
                    None => {
                        debug!("Host of {} stopped signalling", self.instance);
                        self.signals = None;
                    }
                },
                event = self.events.recv() => match event {
                    Some(WindowEvent::Closed) | None => break,
                    Some(event) => self.on_window_event(event, &mut state),
                },
                _ = expire(&mut grace) => {
                    warn!("Dialog {} settled but kept its window; destroying it", self.instance);
                    grace = None;
                    self.window.destroy();
                }
            }
        }

        // Signals sent before the window went away still count
        if let Some(mut signals) = self.signals.take() {
            while let Ok(signal) = signals.try_recv() {
                self.on_signal(signal, &mut state);
            }
        }

        self.teardown(state);
    }

    fn reposition(&self) {
        if self.pinned && !self.window.is_destroyed() {
            self.window.move_to(self.anchor);
        }
    }

    fn on_window_event(&self, event: WindowEvent, state: &mut State) {
        debug!("Window event {:?} for {}", event, self.instance);
        match event {
            WindowEvent::ReadyToShow => {
                self.reposition();
                self.window.show();
            }
            WindowEvent::Focus if self.suppress_refresh => {
                self.backend.register_shortcuts(&REFRESH_SHORTCUTS);
            }
            WindowEvent::Blur if self.suppress_refresh => {
                self.backend.unregister_shortcuts(&REFRESH_SHORTCUTS);
            }
            WindowEvent::Close => {
                // Closed natively before the page reported it
                if !state.seen.close {
                    self.notify_close(&json!({}), state);
                }
            }
            _ => {}
        }
    }

    fn notify_close(&self, payload: &Value, state: &mut State) {
        state.seen.close = true;
        self.shared.set_visible(&self.instance, false);
        for observer in &self.observers {
            observer.on_close(payload);
        }
    }

    /// Returns true when this signal carried the instance's first result
    fn on_signal(&self, signal: HostSignal, state: &mut State) -> bool {
        debug!("Signal {} for {}", signal.name(), self.instance);
        match signal {
            HostSignal::BeforeOpen(payload) => {
                if !state.seen.before_open {
                    state.seen.before_open = true;
                    for observer in &self.observers {
                        observer.on_before_open(&payload);
                    }
                }
            }
            HostSignal::Open(payload) => {
                if !state.seen.open && !state.seen.close {
                    if !state.seen.before_open {
                        state.seen.before_open = true;
                        for observer in &self.observers {
                            observer.on_before_open(&payload);
                        }
                    }
                    state.seen.open = true;
                    self.shared.set_visible(&self.instance, true);
                    for observer in &self.observers {
                        observer.on_open(&payload);
                    }
                }
            }
            HostSignal::Close(payload) => {
                if !state.seen.close {
                    self.notify_close(&payload, state);
                }
            }
            HostSignal::AfterClose => {
                if !state.seen.after_close {
                    state.seen.after_close = true;
                    self.window.destroy();
                }
            }
            HostSignal::Reposition => self.reposition(),
            HostSignal::ReturnPromise(result) => {
                if state.result.is_none() {
                    state.result = Some(result);
                    return true;
                }
                debug!("Ignoring repeated result for {}", self.instance);
            }
        }
        false
    }

    fn teardown(mut self, mut state: State) {
        self.page.remove();

        if !self.window.is_destroyed() {
            self.window.destroy();
        }
        self.shared.clear(&self.instance);

        if !state.seen.close {
            self.notify_close(&json!({}), &mut state);
        }
        for observer in &self.observers {
            observer.on_after_close();
        }

        if self.suppress_refresh {
            self.backend.unregister_shortcuts(&REFRESH_SHORTCUTS);
        }

        // Unsubscribe from everything this instance listened to
        self.signals = None;
        self.events.close();

        if let Some(key) = &self.singleton {
            self.registry.release(key, &self.instance);
        }

        let result = state
            .result
            .take()
            .unwrap_or_else(|| DialogResult::dismissed(DismissReason::Close));
        info!("Dialog {} finished: {:?}", self.instance, result);
        if self.result_tx.send(result).is_err() {
            debug!("Nobody awaited dialog {}", self.instance);
        }
    }
}
