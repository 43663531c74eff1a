//! [`SnapshotCell`] – single-writer publication of immutable snapshots.
//!
//! The writer builds a complete value and swaps it in with
//! [`SnapshotCell::publish`]; readers call [`SnapshotCell::load`] and get an
//! `Arc` to a value that will never change under them.  The lock is held only
//! for the pointer swap or clone, never while a value is being built or read,
//! so a reader can never observe a half-written buffer.
//!
//! # Example
//!
//! ```rust
//! use conesim_kernel::snapshot::SnapshotCell;
//!
//! let cell = SnapshotCell::new(vec![1, 2]);
//! let before = cell.load();
//! cell.publish(vec![1, 2, 3]);
//!
//! assert_eq!(*before, vec![1, 2]);
//! assert_eq!(*cell.load(), vec![1, 2, 3]);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Holds the most recently published `Arc<T>`.
#[derive(Debug, Default)]
pub struct SnapshotCell<T> {
    current: RwLock<Arc<T>>,
    version: AtomicU64,
}

impl<T> SnapshotCell<T> {
    /// Create a cell holding `initial` as version 0.
    pub fn new(initial: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            version: AtomicU64::new(0),
        }
    }

    /// Replace the current snapshot.
    pub fn publish(&self, value: T) {
        self.publish_arc(Arc::new(value));
    }

    /// Replace the current snapshot with an already shared value.
    pub fn publish_arc(&self, value: Arc<T>) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = value;
        self.version.fetch_add(1, Ordering::Release);
    }

    /// The most recently published snapshot.
    pub fn load(&self) -> Arc<T> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of publications so far.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}
