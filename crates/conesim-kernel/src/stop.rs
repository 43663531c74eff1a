//! Process-wide cooperative stop condition.
//!
//! Every task loop checks [`StopFlag::is_raised`] at the top of each
//! iteration and exits instead of starting a new cycle.  Nothing is ever
//! cancelled preemptively.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared boolean stop condition. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Create a lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every task observing this flag to stop after its current cycle.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
