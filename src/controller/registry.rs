//! Singleton keys: at most one live dialog per key

use crate::protocol::InstanceId;
use crate::window::NativeWindow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

struct Entry {
    instance: InstanceId,
    /// Empty between the reservation and the window being created
    window: Option<Arc<dyn NativeWindow>>,
}

/// Process-wide map from singleton key to the dialog holding it.
///
/// Owned by the [`super::AlertRuntime`] that composes controllers; share one
/// registry between runtimes by cloning it.
#[derive(Clone, Default)]
pub struct SingletonRegistry {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl SingletonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim `key` for `instance`.
    ///
    /// On collision returns the current holder's window, if it has one yet.
    /// A holder whose window is already destroyed loses the key.
    pub fn reserve(
        &self,
        key: &str,
        instance: &InstanceId,
    ) -> Result<(), Option<Arc<dyn NativeWindow>>> {
        let mut entries = self.entries();
        if let Some(entry) = entries.get(key) {
            match &entry.window {
                Some(window) if window.is_destroyed() => {
                    debug!("Evicting {} from {:?}; its window is gone", entry.instance, key);
                }
                window => return Err(window.clone()),
            }
        }
        entries.insert(
            key.to_string(),
            Entry {
                instance: instance.clone(),
                window: None,
            },
        );
        Ok(())
    }

    pub fn attach(&self, key: &str, instance: &InstanceId, window: Arc<dyn NativeWindow>) {
        if let Some(entry) = self.entries().get_mut(key) {
            if &entry.instance == instance {
                entry.window = Some(window);
            }
        }
    }

    /// Drop `key` if `instance` still holds it
    pub fn release(&self, key: &str, instance: &InstanceId) {
        let mut entries = self.entries();
        if entries.get(key).map(|entry| &entry.instance == instance).unwrap_or(false) {
            entries.remove(key);
        }
    }

    pub fn holder(&self, key: &str) -> Option<InstanceId> {
        self.entries().get(key).map(|entry| entry.instance.clone())
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::WindowOptions;
    use crate::window::{HeadlessBackend, WindowBackend};

    #[test]
    fn test_reserve_and_release() {
        let registry = SingletonRegistry::new();
        let first = InstanceId::from("first");
        let second = InstanceId::from("second");

        assert!(registry.reserve("K", &first).is_ok());
        assert!(matches!(registry.reserve("K", &second), Err(None)));
        assert_eq!(registry.holder("K"), Some(first.clone()));

        // Only the holder may release
        registry.release("K", &second);
        assert_eq!(registry.len(), 1);
        registry.release("K", &first);
        assert!(registry.is_empty());
        assert!(registry.reserve("K", &second).is_ok());
    }

    #[test]
    fn test_destroyed_holder_is_evicted() {
        let backend = HeadlessBackend::default();
        let registry = SingletonRegistry::new();
        let first = InstanceId::from("first");
        let second = InstanceId::from("second");
        let parts = backend
            .create_window(&first, &WindowOptions::base(300, 200, false))
            .unwrap();

        assert!(registry.reserve("K", &first).is_ok());
        registry.attach("K", &first, parts.window.clone());
        assert!(matches!(registry.reserve("K", &second), Err(Some(_))));

        parts.window.destroy();
        assert!(registry.reserve("K", &second).is_ok());
        assert_eq!(registry.holder("K"), Some(second.clone()));

        // The evicted holder's late release leaves the new entry alone
        registry.release("K", &first);
        assert_eq!(registry.holder("K"), Some(second));
    }
}
