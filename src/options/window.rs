//! Native window options: the resolved set and the partial overrides layered onto it

use serde::{Deserialize, Serialize};

/// Which window a modal dialog attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParentWindow {
    /// Whatever application window currently has focus
    Focused,
    /// A backend-specific native handle
    Handle(u64),
}

/// Fully resolved options handed to a [`crate::window::WindowBackend`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowOptions {
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub minimizable: bool,
    pub maximizable: bool,
    pub fullscreen: bool,
    pub fullscreenable: bool,
    pub show: bool,
    pub frame: bool,
    pub transparent: bool,
    pub thick_frame: bool,
    pub closable: bool,
    pub has_shadow: bool,
    pub background_color: Option<String>,
    pub title: Option<String>,
    pub parent: Option<ParentWindow>,
    pub modal: bool,
    pub skip_taskbar: bool,
    pub always_on_top: bool,
    pub dev_tools: bool,
    /// Page scripts may talk to the native side
    pub privileged_scripting: bool,
}

impl WindowOptions {
    /// Base preset every dialog window starts from
    pub fn base(width: u32, height: u32, dev_tools: bool) -> Self {
        Self {
            width,
            height,
            resizable: false,
            minimizable: false,
            maximizable: false,
            fullscreen: false,
            fullscreenable: false,
            show: true,
            frame: true,
            transparent: false,
            thick_frame: true,
            closable: true,
            has_shadow: true,
            background_color: None,
            title: None,
            parent: None,
            modal: false,
            skip_taskbar: false,
            always_on_top: false,
            dev_tools,
            privileged_scripting: false,
        }
    }
}

/// Caller-supplied partial window options. Only `Some` fields override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WindowOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resizable: Option<bool>,
    pub minimizable: Option<bool>,
    pub maximizable: Option<bool>,
    pub fullscreen: Option<bool>,
    pub fullscreenable: Option<bool>,
    pub frame: Option<bool>,
    pub transparent: Option<bool>,
    pub thick_frame: Option<bool>,
    pub closable: Option<bool>,
    pub has_shadow: Option<bool>,
    pub background_color: Option<String>,
    pub title: Option<String>,
    pub always_on_top: Option<bool>,
}

macro_rules! overlay {
    // Set fields of `$src` onto optional fields of `$dst`
    (partial $dst:expr, $src:expr, [$($field:ident),* $(,)?]) => {
        $(
            if $src.$field.is_some() {
                $dst.$field = $src.$field.clone();
            }
        )*
    };
    // Set fields of `$src` onto concrete fields of `$dst`
    ($dst:expr, $src:expr, [$($field:ident),* $(,)?]) => {
        $(
            if let Some(value) = $src.$field.clone() {
                $dst.$field = value;
            }
        )*
    };
}

impl WindowOverrides {
    /// Frameless preset: no frame, transparent, no shadow, not closable
    pub fn frameless() -> Self {
        Self {
            frame: Some(false),
            transparent: Some(true),
            thick_frame: Some(false),
            closable: Some(false),
            background_color: Some("#00000000".to_string()),
            has_shadow: Some(false),
            ..Self::default()
        }
    }

    /// Framed preset: frame, opaque, closable, titled
    pub fn framed(title: impl Into<String>) -> Self {
        Self {
            frame: Some(true),
            transparent: Some(false),
            thick_frame: Some(true),
            closable: Some(true),
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Layer `other` on top of `self`; fields set in `other` win
    pub fn merged(mut self, other: &WindowOverrides) -> Self {
        overlay!(partial self, other, [
            width, height, resizable, minimizable, maximizable, fullscreen, fullscreenable,
            frame, transparent, thick_frame, closable, has_shadow, background_color, title,
            always_on_top,
        ]);
        self
    }

    pub fn apply_to(&self, options: &mut WindowOptions) {
        overlay!(options, self, [
            width, height, resizable, minimizable, maximizable, fullscreen, fullscreenable,
            frame, transparent, thick_frame, closable, has_shadow, always_on_top,
        ]);
        if self.background_color.is_some() {
            options.background_color = self.background_color.clone();
        }
        if self.title.is_some() {
            options.title = self.title.clone();
        }
    }
}

/// Optional explicit size; absent keys leave the current value alone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl WindowSize {
    pub fn apply_to(&self, overrides: &mut WindowOverrides) {
        if let Some(width) = self.width {
            overrides.width = Some(width);
        }
        if let Some(height) = self.height {
            overrides.height = Some(height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_overrides_win_over_preset() {
        let caller = WindowOverrides {
            has_shadow: Some(true),
            width: Some(320),
            ..WindowOverrides::default()
        };
        let merged = WindowOverrides::frameless().merged(&caller);
        assert_eq!(merged.has_shadow, Some(true));
        assert_eq!(merged.frame, Some(false));
        assert_eq!(merged.width, Some(320));
    }

    #[test]
    fn test_size_only_overrides_present_keys() {
        let mut overrides = WindowOverrides {
            width: Some(500),
            height: Some(400),
            ..WindowOverrides::default()
        };
        WindowSize { width: None, height: Some(90) }.apply_to(&mut overrides);
        assert_eq!(overrides.width, Some(500));
        assert_eq!(overrides.height, Some(90));
    }

    #[test]
    fn test_apply_to_base() {
        let mut options = WindowOptions::base(800, 600, false);
        WindowOverrides::framed("Report").apply_to(&mut options);
        assert_eq!(options.title.as_deref(), Some("Report"));
        assert!(options.frame);
        assert_eq!((options.width, options.height), (800, 600));
        assert!(!options.resizable);
    }
}
