//! Serialized policy weight exchange between learner and collection threads.
//!
//! The learner serializes its actor network to bytes and publishes it here;
//! collection threads poll the version counter and deserialize into their
//! local inference copy when it advances. `Vec<u8>` is always `Send + Sync`,
//! so this works on any backend regardless of how its model records behave
//! across threads.
//!
//! ```text
//! Learner                                  Collector k
//! ┌──────────────────┐                     ┌──────────────────┐
//! │ actor (autodiff) │                     │ local actor      │
//! │       ↓          │                     │       ↑          │
//! │ recorder.record()│                     │ recorder.load()  │
//! │       ↓          │                     │       ↑          │
//! │   Vec<u8>  ────────PolicySlot────────→ │    Vec<u8>       │
//! └──────────────────┘                     └──────────────────┘
//! ```

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Thread-safe slot holding the most recently published policy weights.
///
/// Writes replace the previous payload; readers either clone the latest
/// bytes or take them out of the slot. The version counter increments on
/// every publish so pollers can skip deserialization when nothing changed.
pub struct PolicySlot {
    bytes: Mutex<Option<Vec<u8>>>,
    version: AtomicU64,
}

impl PolicySlot {
    /// Create an empty slot (version 0, no weights).
    pub fn new() -> Self {
        Self {
            bytes: Mutex::new(None),
            version: AtomicU64::new(0),
        }
    }

    /// Create a slot pre-loaded with initial weights (version 1).
    pub fn with_initial(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes)),
            version: AtomicU64::new(1),
        }
    }

    /// Current publish count.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Publish new weights, replacing any previous payload.
    pub fn publish(&self, bytes: Vec<u8>) {
        let mut guard = self.bytes.lock();
        *guard = Some(bytes);
        self.version.fetch_add(1, Ordering::Release);
    }

    /// Clone the latest weights without removing them.
    pub fn latest(&self) -> Option<Vec<u8>> {
        self.bytes.lock().clone()
    }

    /// Take the weights out of the slot, leaving it empty.
    pub fn take(&self) -> Option<Vec<u8>> {
        self.bytes.lock().take()
    }

    /// Whether the slot currently holds weights.
    pub fn has_weights(&self) -> bool {
        self.bytes.lock().is_some()
    }
}

impl Default for PolicySlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a [`PolicySlot`].
pub type SharedPolicySlot = Arc<PolicySlot>;

/// Create a new shared, empty policy slot.
pub fn policy_slot() -> SharedPolicySlot {
    Arc::new(PolicySlot::new())
}

/// Create a new shared policy slot pre-loaded with `bytes`.
pub fn policy_slot_with(bytes: Vec<u8>) -> SharedPolicySlot {
    Arc::new(PolicySlot::with_initial(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_version() {
        let slot = PolicySlot::new();
        assert_eq!(slot.version(), 0);
        assert!(slot.latest().is_none());

        slot.publish(vec![1, 2, 3]);
        assert_eq!(slot.version(), 1);
        assert!(slot.has_weights());
        assert_eq!(slot.latest(), Some(vec![1, 2, 3]));

        slot.publish(vec![4]);
        assert_eq!(slot.version(), 2);
        assert_eq!(slot.latest(), Some(vec![4]));
    }

    #[test]
    fn test_latest_keeps_take_removes() {
        let slot = PolicySlot::with_initial(vec![7]);
        assert_eq!(slot.version(), 1);

        assert_eq!(slot.latest(), Some(vec![7]));
        assert_eq!(slot.latest(), Some(vec![7]));

        assert_eq!(slot.take(), Some(vec![7]));
        assert!(!slot.has_weights());
        assert!(slot.latest().is_none());
    }

    #[test]
    fn test_shared_across_handles() {
        let slot = policy_slot();
        let reader = Arc::clone(&slot);

        slot.publish(vec![9, 9]);
        assert_eq!(reader.version(), 1);
        assert_eq!(reader.latest(), Some(vec![9, 9]));
    }
}
