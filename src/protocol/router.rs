//! Routes wire envelopes to the per-instance signal channel

use super::{Envelope, HostSignal, InstanceId};
use crate::error::AlertResult;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Per-instance typed channels behind one bridge endpoint
#[derive(Clone, Default)]
pub struct SignalRouter {
    routes: Arc<Mutex<HashMap<InstanceId, mpsc::UnboundedSender<HostSignal>>>>,
}

impl SignalRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the channel for `instance`, replacing any stale one
    pub fn subscribe(&self, instance: &InstanceId) -> mpsc::UnboundedReceiver<HostSignal> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        routes.retain(|_, tx| !tx.is_closed());
        routes.insert(instance.clone(), tx);
        rx
    }

    /// Number of open routes
    pub fn len(&self) -> usize {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn unsubscribe(&self, instance: &InstanceId) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(instance);
    }

    pub fn is_subscribed(&self, instance: &InstanceId) -> bool {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(instance)
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
    }

    /// Hand a signal to its instance. Returns false when nobody listens anymore.
    pub fn route(&self, envelope: Envelope) -> bool {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = routes.get(&envelope.instance) else {
            debug!(
                "Dropping {} for unknown instance {}",
                envelope.message.name(),
                envelope.instance
            );
            return false;
        };

        if tx.send(envelope.message).is_err() {
            // Receiver went away with its instance
            routes.remove(&envelope.instance);
            return false;
        }
        true
    }

    /// Decode a raw bridge message and route it
    pub fn deliver(&self, raw: &str) -> AlertResult<bool> {
        match Envelope::decode(raw) {
            Ok(envelope) => Ok(self.route(envelope)),
            Err(e) => {
                warn!("Rejected malformed host message: {}", e);
                Err(e)
            }
        }
    }
}
