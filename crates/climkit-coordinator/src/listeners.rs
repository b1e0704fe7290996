//! Listener registry with registration-ordered fan-out

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use climkit_core::{DeviceSnapshot, VendorError};
use ulid::Ulid;

/// What a refresh pass produced, handed to every listener
///
/// On failure `snapshot` still carries the previous good snapshot (if any)
/// so entities applying a keep-stale policy can keep rendering it.
#[derive(Debug, Clone)]
pub struct CoordinatorUpdate {
    /// Id of the refresh cycle this update describes
    pub refresh_id: Ulid,
    /// Whether the fetch succeeded
    pub success: bool,
    /// Latest snapshot; `None` only before the first success
    pub snapshot: Option<Arc<DeviceSnapshot>>,
    /// The failure, when `success` is false
    pub error: Option<VendorError>,
}

/// Callback invoked synchronously in the coordinator's notification pass
pub type UpdateListener = Arc<dyn Fn(&CoordinatorUpdate) + Send + Sync>;

type Entries = Mutex<Vec<(u64, UpdateListener)>>;

/// Registration-ordered listener set
///
/// Mutations through [`ListenerRegistry::add`] and
/// [`ListenerHandle::unsubscribe`] are safe at any time, including from
/// inside a callback: the notification pass iterates a point-in-time copy,
/// so changes take effect starting with the next pass.
pub(crate) struct ListenerRegistry {
    entries: Arc<Entries>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn add(&self, listener: UpdateListener) -> ListenerHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        ListenerHandle {
            id,
            entries: Arc::downgrade(&self.entries),
        }
    }

    /// Copy of the current listener list, in registration order
    pub(crate) fn snapshot(&self) -> Vec<(u64, UpdateListener)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Scoped registration returned by `add_listener`
///
/// Dropping the handle does NOT deregister; call
/// [`ListenerHandle::unsubscribe`]. Unsubscribing twice is a no-op, and
/// unsubscribing after the coordinator is gone is a no-op too.
#[derive(Debug, Clone)]
pub struct ListenerHandle {
    id: u64,
    entries: Weak<Entries>,
}

impl ListenerHandle {
    pub fn unsubscribe(&self) {
        if let Some(entries) = self.entries.upgrade() {
            entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> UpdateListener {
        Arc::new(|_| {})
    }

    #[test]
    fn test_add_and_len() {
        let registry = ListenerRegistry::new();
        let _a = registry.add(noop());
        let _b = registry.add(noop());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let registry = ListenerRegistry::new();
        let handle = registry.add(noop());
        let _keep = registry.add(noop());

        handle.unsubscribe();
        assert_eq!(registry.len(), 1);
        handle.unsubscribe();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unsubscribe_after_registry_dropped() {
        let registry = ListenerRegistry::new();
        let handle = registry.add(noop());
        drop(registry);
        // Must not panic
        handle.unsubscribe();
    }

    #[test]
    fn test_snapshot_preserves_registration_order() {
        let registry = ListenerRegistry::new();
        let _a = registry.add(noop());
        let _b = registry.add(noop());
        let _c = registry.add(noop());

        let ids: Vec<u64> = registry.snapshot().iter().map(|(id, _)| *id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
