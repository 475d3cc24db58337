//! Dialog-content options and lifecycle observers
//!
//! Content options are forwarded to the dialog library as JSON; the
//! controller touches only a handful of keys. Lifecycle hooks never travel
//! to the page: they stay on this side as an ordered observer list.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

pub const KEY_POSITION: &str = "position";
pub const KEY_SINGLETON: &str = "singletonId";
pub const KEY_BACKDROP: &str = "backdrop";
pub const KEY_ALLOW_OUTSIDE_CLICK: &str = "allowOutsideClick";
pub const KEY_ANIMATION: &str = "animation";
pub const KEY_CUSTOM_CLASS: &str = "customClass";
pub const KEY_TOAST: &str = "toast";

/// Observer of one dialog's lifecycle, invoked on the controller side
pub trait LifecycleObserver: Send + Sync {
    fn on_before_open(&self, _payload: &Value) {}

    fn on_open(&self, _payload: &Value) {}

    /// Also invoked with an empty payload if the window is closed before the page reports it
    fn on_close(&self, _payload: &Value) {}

    fn on_after_close(&self) {}
}

type PayloadHook = Arc<dyn Fn(&Value) + Send + Sync>;
type PlainHook = Arc<dyn Fn() + Send + Sync>;

/// Closure-based observer
#[derive(Clone, Default)]
pub struct Hooks {
    before_open: Option<PayloadHook>,
    open: Option<PayloadHook>,
    close: Option<PayloadHook>,
    after_close: Option<PlainHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_before_open(mut self, hook: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.before_open = Some(Arc::new(hook));
        self
    }

    pub fn on_open(mut self, hook: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.open = Some(Arc::new(hook));
        self
    }

    pub fn on_close(mut self, hook: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.close = Some(Arc::new(hook));
        self
    }

    pub fn on_after_close(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.after_close = Some(Arc::new(hook));
        self
    }
}

impl LifecycleObserver for Hooks {
    fn on_before_open(&self, payload: &Value) {
        if let Some(hook) = &self.before_open {
            hook(payload);
        }
    }

    fn on_open(&self, payload: &Value) {
        if let Some(hook) = &self.open {
            hook(payload);
        }
    }

    fn on_close(&self, payload: &Value) {
        if let Some(hook) = &self.close {
            hook(payload);
        }
    }

    fn on_after_close(&self) {
        if let Some(hook) = &self.after_close {
            hook();
        }
    }
}

/// Options for the dialog library plus the observers attached to this dialog
#[derive(Clone, Default)]
pub struct DialogOptions {
    fields: Map<String, Value>,
    observers: Vec<Arc<dyn LifecycleObserver>>,
}

impl fmt::Debug for DialogOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogOptions")
            .field("fields", &self.fields)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl DialogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            observers: Vec::new(),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn observers(&self) -> &[Arc<dyn LifecycleObserver>] {
        &self.observers
    }

    /// Builder-style setter for any library option
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.set("title", title.into())
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.set("text", text.into())
    }

    pub fn html(self, html: impl Into<String>) -> Self {
        self.set("html", html.into())
    }

    /// Icon kind ("success", "error", "warning", "info", "question")
    pub fn kind(self, kind: impl Into<String>) -> Self {
        self.set("type", kind.into())
    }

    pub fn timer(self, millis: u64) -> Self {
        self.set("timer", millis)
    }

    pub fn position(self, position: impl Into<String>) -> Self {
        self.set(KEY_POSITION, position.into())
    }

    /// At most one live dialog per key
    pub fn singleton(self, key: impl Into<String>) -> Self {
        self.set(KEY_SINGLETON, key.into())
    }

    pub fn observe(mut self, observer: impl LifecycleObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    pub fn push_observer(&mut self, observer: Arc<dyn LifecycleObserver>) {
        self.observers.push(observer);
    }

    pub fn singleton_key(&self) -> Option<String> {
        match self.fields.get(KEY_SINGLETON)? {
            Value::String(key) => Some(key.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Remove the controller-only `position` key
    pub fn take_position(&mut self) -> Option<String> {
        match self.fields.remove(KEY_POSITION)? {
            Value::String(position) => Some(position),
            _ => None,
        }
    }

    /// Merge class names into `customClass`; new entries replace existing ones
    pub fn merge_custom_class(&mut self, entries: &[(&str, &str)]) {
        let slot = self
            .fields
            .entry(KEY_CUSTOM_CLASS.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(classes) = slot {
            for (part, class) in entries {
                classes.insert(part.to_string(), Value::String(class.to_string()));
            }
        }
    }
}

impl From<Map<String, Value>> for DialogOptions {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_map(fields)
    }
}
