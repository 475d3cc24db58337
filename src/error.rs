//! Error types for the alert controller and its hosted window

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlertError {
    /// Malformed top-level options. Raised before any window exists.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("window creation failed: {0}")]
    WindowCreation(String),

    #[error("page load failed: {0}")]
    PageLoad(String),

    /// The target window is gone; callers that evaluate remotely treat this as an empty result.
    #[error("window has been destroyed")]
    WindowDestroyed,

    #[error("script evaluation failed: {0}")]
    Evaluation(String),

    #[error("dialog instance {0} is still live")]
    InstanceBusy(String),

    #[error("no async runtime available: {0}")]
    Runtime(String),

    #[error("unknown note: {0}")]
    UnknownNote(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AlertResult<T> = Result<T, AlertError>;
