//! Report errors in a framed dialog

use super::{AlertRuntime, PendingDialog};
use crate::error::AlertResult;
use crate::options::{DialogOptions, Hooks, StructuredOptions};
use std::error::Error;
use std::sync::Arc;

/// Owned snapshot of an error and its cause chain
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    pub name: String,
    pub message: String,
    /// One line per cause, outermost first
    pub trace: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        Self::named("Error", error)
    }

    pub fn named(name: impl Into<String>, error: &(dyn Error + 'static)) -> Self {
        let mut trace = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            trace.push(cause.to_string());
            source = cause.source();
        }
        Self {
            name: name.into(),
            message: error.to_string(),
            trace,
        }
    }

    /// Drop blank lines and lines repeating the message or a previous line
    pub fn cleaned(mut self) -> Self {
        let mut seen = vec![self.message.trim().to_string()];
        self.trace.retain(|line| {
            let line = line.trim();
            if line.is_empty() || seen.iter().any(|s| s == line) {
                return false;
            }
            seen.push(line.to_string());
            true
        });
        self
    }

    pub fn to_html(&self) -> String {
        let mut body = format!(
            "<div style=\"font-family:monospace\"><b>{}: {}</b>",
            escape_html(&self.name),
            escape_html(&self.message)
        );
        for cause in &self.trace {
            body.push_str("<br>&nbsp;&nbsp;caused by: ");
            body.push_str(&escape_html(cause));
        }
        body.push_str("</div>");

        format!(
            "<div class='wrapper' style='overflow: auto'>{}</div><style>.wrapper > div {{ word-break: break-word; }}</style>",
            body
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(c),
        }
    }
    out
}

type Closure = Arc<dyn Fn(ErrorReport) + Send + Sync>;

/// Shows errors in a framed dialog; built by [`AlertRuntime::uncaught_exception`]
#[derive(Clone)]
pub struct ExceptionHandler {
    runtime: Arc<AlertRuntime>,
    hide_trace: bool,
    clean_trace: bool,
    always_on_top: Option<bool>,
    closure: Option<Closure>,
}

impl ExceptionHandler {
    /// Collapse duplicate and empty cause lines before showing them
    pub fn clean_trace(mut self, clean: bool) -> Self {
        self.clean_trace = clean;
        self
    }

    pub fn handle(&self, error: &(dyn Error + 'static)) -> AlertResult<PendingDialog> {
        self.handle_report(ErrorReport::from_error(error))
    }

    pub fn handle_report(&self, report: ErrorReport) -> AlertResult<PendingDialog> {
        let report = if self.clean_trace { report.cleaned() } else { report };

        let mut dialog = DialogOptions::new().kind("error");
        dialog = if self.hide_trace {
            dialog.title(report.message.clone())
        } else {
            dialog.html(report.to_html())
        };

        if let Some(closure) = &self.closure {
            let closure = closure.clone();
            let after = report.clone();
            dialog = dialog.observe(Hooks::new().on_after_close(move || closure(after.clone())));
        }

        let mut options = StructuredOptions::new(dialog).title(report.name.clone());
        options.always_on_top = self.always_on_top;

        self.runtime.controller().fire_with_frame(options)
    }
}

impl AlertRuntime {
    /// Handler that shows an error, then calls `closure` once the dialog has closed.
    ///
    /// With `hide_trace` only the error message is shown.
    pub fn uncaught_exception(
        self: &Arc<Self>,
        hide_trace: bool,
        closure: Option<Box<dyn Fn(ErrorReport) + Send + Sync>>,
        always_on_top: Option<bool>,
    ) -> ExceptionHandler {
        ExceptionHandler {
            runtime: self.clone(),
            hide_trace,
            clean_trace: false,
            always_on_top,
            closure: closure.map(Arc::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "disk <full>")
        }
    }

    impl Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "save failed")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_report_chain_and_markup() {
        let report = ErrorReport::from_error(&Outer(Inner));
        assert_eq!(report.message, "save failed");
        assert_eq!(report.trace, vec!["disk <full>".to_string()]);

        let html = report.to_html();
        assert!(html.contains("Error: save failed"));
        assert!(html.contains("disk &lt;full&gt;"));
        assert!(html.starts_with("<div class='wrapper'"));
    }

    #[test]
    fn test_cleaned_trace() {
        let report = ErrorReport {
            name: "Error".into(),
            message: "boom".into(),
            trace: vec!["boom".into(), "".into(), "io".into(), "io".into()],
        };
        assert_eq!(report.cleaned().trace, vec!["io".to_string()]);
    }
}
