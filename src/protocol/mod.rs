//! Message protocol between the controller and the hosted dialog window
//!
//! Every instance gets its own [`InstanceId`]. Inbound traffic (host to
//! controller) is a closed set of [`HostSignal`]s; outbound traffic is a
//! closed set of [`HostCommand`]s. On the wire a signal travels inside an
//! [`Envelope`] so a single bridge can route messages for many windows.

pub mod router;

pub use router::SignalRouter;

use crate::error::AlertResult;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

const INSTANCE_ID_LEN: usize = 10;

/// Opaque per-instance token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Generate a fresh random token
    pub fn generate() -> Self {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(INSTANCE_ID_LEN)
            .map(char::from)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InstanceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a dialog ended without a confirmed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DismissReason {
    Cancel,
    Close,
    Esc,
    Timer,
    /// A dialog with the same singleton key is already on screen
    Showing,
}

impl DismissReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DismissReason::Cancel => "cancel",
            DismissReason::Close => "close",
            DismissReason::Esc => "esc",
            DismissReason::Timer => "timer",
            DismissReason::Showing => "showing",
        }
    }
}

impl fmt::Display for DismissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DismissReason {
    type Err = crate::error::AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cancel" => Ok(DismissReason::Cancel),
            "close" => Ok(DismissReason::Close),
            "esc" => Ok(DismissReason::Esc),
            "timer" => Ok(DismissReason::Timer),
            "showing" => Ok(DismissReason::Showing),
            other => Err(crate::error::AlertError::InvalidArgument(format!(
                "unknown dismiss reason: {}",
                other
            ))),
        }
    }
}

/// Outcome of a dialog, as reported by the dialog library
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(
        default,
        deserialize_with = "lenient_dismiss",
        skip_serializing_if = "Option::is_none"
    )]
    pub dismiss: Option<DismissReason>,
}

/// Reasons outside [`DismissReason`] still mark the dialog as dismissed
fn lenient_dismiss<'de, D>(deserializer: D) -> Result<Option<DismissReason>, D::Error>
where
    D: Deserializer<'de>,
{
    let reason = Option::<String>::deserialize(deserializer)?;
    Ok(reason.map(|reason| {
        reason.parse().unwrap_or_else(|_| {
            warn!("Unknown dismiss reason {:?}; reporting it as close", reason);
            DismissReason::Close
        })
    }))
}

impl DialogResult {
    pub fn confirmed(value: Value) -> Self {
        Self {
            value: Some(value),
            dismiss: None,
        }
    }

    pub fn dismissed(reason: DismissReason) -> Self {
        Self {
            value: None,
            dismiss: Some(reason),
        }
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismiss.is_some()
    }
}

/// Signals sent by the hosted page to its controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
pub enum HostSignal {
    #[serde(rename = "onBeforeOpen")]
    BeforeOpen(Value),

    #[serde(rename = "onOpen")]
    Open(Value),

    #[serde(rename = "onClose")]
    Close(Value),

    #[serde(rename = "onAfterClose")]
    AfterClose,

    /// Ask the controller to re-apply the window anchor; may recur
    #[serde(rename = "reposition")]
    Reposition,

    /// Terminal result of the dialog. Only the first one counts.
    #[serde(rename = "return-promise")]
    ReturnPromise(DialogResult),
}

impl HostSignal {
    pub fn name(&self) -> &'static str {
        match self {
            HostSignal::BeforeOpen(_) => "onBeforeOpen",
            HostSignal::Open(_) => "onOpen",
            HostSignal::Close(_) => "onClose",
            HostSignal::AfterClose => "onAfterClose",
            HostSignal::Reposition => "reposition",
            HostSignal::ReturnPromise(_) => "return-promise",
        }
    }
}

/// Commands sent by the controller to the hosted page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum HostCommand {
    ResizeToFit {
        #[serde(default, rename = "delay", skip_serializing_if = "Option::is_none")]
        delay_ms: Option<u64>,
    },
    ShowLoading,
    HideLoading,
}

/// Wire form of a signal, tagged with the instance that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub instance: InstanceId,
    pub message: HostSignal,
}

impl Envelope {
    pub fn new(instance: InstanceId, message: HostSignal) -> Self {
        Self { instance, message }
    }

    pub fn encode(&self) -> AlertResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> AlertResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
