//! Bounded per-session state shared between rule evaluations.

use std::sync::Arc;

use parking_lot::Mutex;

/// Owns a ruleset's state for the duration of a session.
///
/// Evaluations are serialized: the store hands out a snapshot, the rules
/// compute a replacement, and the replacement is committed atomically. State
/// never outlives the session.
#[derive(Clone, Debug, Default)]
pub struct StateStore<S: Clone> {
    inner: Arc<Mutex<S>>,
}

impl<S: Clone> StateStore<S> {
    pub fn new(initial: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    /// Returns a snapshot of the current state.
    pub fn get(&self) -> S {
        self.inner.lock().clone()
    }

    /// Replaces the state wholesale.
    pub fn set(&self, state: S) {
        *self.inner.lock() = state;
    }
}

/// A brightness-like value clamped to the `0.0..=1.0` range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalarLevel(f64);

impl ScalarLevel {
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns the level shifted by `delta`, saturating at the range bounds.
    pub fn offset(&self, delta: f64) -> Self {
        Self::new(self.0 + delta)
    }
}

impl Default for ScalarLevel {
    fn default() -> Self {
        Self(0.0)
    }
}

/// Fixed-capacity FIFO: pushing onto a full buffer evicts the oldest entry.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundedBuffer<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T: PartialEq> BoundedBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.remove(0);
        }
        self.items.push(item);
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether the buffer content equals `expected`, oldest entry first.
    pub fn matches(&self, expected: &[T]) -> bool {
        self.items == expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_snapshot_and_commit() {
        let store = StateStore::new(3u32);
        assert_eq!(store.get(), 3);
        store.set(7);
        assert_eq!(store.get(), 7);

        // Clones observe the same state.
        let other = store.clone();
        other.set(9);
        assert_eq!(store.get(), 9);
    }

    #[test]
    fn test_scalar_level_clamps() {
        assert_eq!(ScalarLevel::new(1.5).value(), 1.0);
        assert_eq!(ScalarLevel::new(-0.2).value(), 0.0);
        assert_eq!(ScalarLevel::new(0.5).offset(0.1).value(), 0.6);
        assert_eq!(ScalarLevel::new(0.9).offset(0.3).value(), 1.0);
        assert_eq!(ScalarLevel::new(0.1).offset(-0.3).value(), 0.0);
    }

    #[test]
    fn test_bounded_buffer_evicts_oldest() {
        let mut buffer = BoundedBuffer::new(3);
        assert!(!buffer.is_full());

        buffer.push(1);
        buffer.push(2);
        buffer.push(3);
        assert!(buffer.is_full());
        assert!(buffer.matches(&[1, 2, 3]));

        // A fourth entry pushes the oldest one out.
        buffer.push(4);
        assert!(buffer.is_full());
        assert!(buffer.matches(&[2, 3, 4]));

        buffer.clear();
        assert!(!buffer.is_full());
        assert!(buffer.matches(&[]));
    }
}
