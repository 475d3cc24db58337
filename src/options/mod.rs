//! Options accepted by the fire operations
//!
//! Callers either hand over plain dialog-content options
//! ([`FireOptions::Content`]) or the structured form that also carries
//! window and presentation settings ([`FireOptions::Structured`]).

pub mod dialog;
pub mod position;
pub mod sound;
pub mod window;

pub use dialog::{DialogOptions, Hooks, LifecycleObserver};
pub use position::{Anchor, Position, WorkArea};
pub use sound::{Frequency, Sound, Waveform};
pub use window::{ParentWindow, WindowOptions, WindowOverrides, WindowSize};

use crate::error::{AlertError, AlertResult};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Dialog options plus window and presentation settings
#[derive(Debug, Clone, Default)]
pub struct StructuredOptions {
    pub dialog: DialogOptions,
    pub window: WindowOverrides,
    /// Title of a framed window
    pub title: Option<String>,
    pub parent: Option<ParentWindow>,
    pub always_on_top: Option<bool>,
    /// Frameless windows can be dragged by their body
    pub draggable: bool,
    pub sound: Option<Sound>,
    pub size: Option<WindowSize>,
}

impl StructuredOptions {
    pub fn new(dialog: DialogOptions) -> Self {
        Self {
            dialog,
            ..Self::default()
        }
    }

    pub fn window(mut self, window: WindowOverrides) -> Self {
        self.window = window;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn parent(mut self, parent: ParentWindow) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn always_on_top(mut self, always_on_top: bool) -> Self {
        self.always_on_top = Some(always_on_top);
        self
    }

    pub fn draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    pub fn sound(mut self, sound: Sound) -> Self {
        self.sound = Some(sound);
        self
    }

    pub fn size(mut self, size: WindowSize) -> Self {
        self.size = Some(size);
        self
    }
}

/// The two calling forms of the fire operations
#[derive(Debug, Clone)]
pub enum FireOptions {
    Content(DialogOptions),
    Structured(StructuredOptions),
}

impl FireOptions {
    pub fn into_structured(self) -> StructuredOptions {
        match self {
            FireOptions::Content(dialog) => StructuredOptions::new(dialog),
            FireOptions::Structured(options) => options,
        }
    }

    /// Interpret untyped JSON options.
    ///
    /// A `swalOptions` key selects the structured form; otherwise the whole
    /// object is taken as dialog-content options.
    pub fn from_value(value: Value) -> AlertResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(AlertError::InvalidArgument(format!(
                "{} is not an object; dialog options or structured options expected",
                value
            )));
        };

        let Some(swal) = map.remove("swalOptions") else {
            return Ok(FireOptions::Content(DialogOptions::from_map(map)));
        };
        let Value::Object(swal) = swal else {
            return Err(AlertError::InvalidArgument(
                "swalOptions must be an object".to_string(),
            ));
        };

        let parent = match map.get("parent") {
            Some(Value::Bool(true)) => Some(ParentWindow::Focused),
            Some(Value::Number(handle)) => handle.as_u64().map(ParentWindow::Handle),
            _ => None,
        };

        Ok(FireOptions::Structured(StructuredOptions {
            dialog: DialogOptions::from_map(swal),
            window: field(&mut map, "bwOptions")?.unwrap_or_default(),
            title: map.get("title").and_then(Value::as_str).map(str::to_string),
            parent,
            always_on_top: map.get("alwaysOnTop").and_then(Value::as_bool),
            draggable: map.get("draggable").and_then(Value::as_bool).unwrap_or(false),
            sound: field(&mut map, "sound")?,
            size: field(&mut map, "size")?,
        }))
    }
}

fn field<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) -> AlertResult<Option<T>> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AlertError::InvalidArgument(format!("{}: {}", key, e))),
    }
}

impl From<DialogOptions> for FireOptions {
    fn from(dialog: DialogOptions) -> Self {
        FireOptions::Content(dialog)
    }
}

impl From<StructuredOptions> for FireOptions {
    fn from(options: StructuredOptions) -> Self {
        FireOptions::Structured(options)
    }
}
