//! Perception → Trajectory hand-off.
//!
//! The producer calls [`HandoffSender::signal`] once per completed cycle with
//! an immutable frame; the consumer blocks in [`HandoffReceiver::wait`]
//! before touching any of that cycle's data, so it never observes a
//! half-written set.  Frames travel over a channel, so no lock is shared
//! between the two tasks.
//!
//! Dropping the sender closes the hand-off: a blocked `wait` returns `None`,
//! which lets the consumer shut down once the producer has exited.
//!
//! # Example
//!
//! ```rust
//! use conesim_kernel::handoff;
//!
//! let (tx, rx) = handoff::channel();
//! tx.signal(1u32);
//! tx.signal(2u32);
//! // The consumer always works on the freshest frame.
//! assert_eq!(rx.wait(), Some(2));
//! drop(tx);
//! assert_eq!(rx.wait(), None);
//! ```

use std::sync::mpsc::{self, Receiver, Sender};

use tracing::trace;

/// Create a connected sender/receiver pair.
pub fn channel<T>() -> (HandoffSender<T>, HandoffReceiver<T>) {
    let (tx, rx) = mpsc::channel();
    (HandoffSender { tx }, HandoffReceiver { rx })
}

/// Producer side of the hand-off.
#[derive(Debug)]
pub struct HandoffSender<T> {
    tx: Sender<T>,
}

impl<T> HandoffSender<T> {
    /// Publish one completed frame.  Never blocks.
    ///
    /// Returns `false` when the receiver has gone away.
    pub fn signal(&self, frame: T) -> bool {
        self.tx.send(frame).is_ok()
    }
}

/// Consumer side of the hand-off.
#[derive(Debug)]
pub struct HandoffReceiver<T> {
    rx: Receiver<T>,
}

impl<T> HandoffReceiver<T> {
    /// Block until at least one frame is available, then return the newest
    /// one, discarding any older frames still queued.
    ///
    /// Returns `None` once the sender is dropped and the queue is empty.
    pub fn wait(&self) -> Option<T> {
        let first = self.rx.recv().ok()?;
        Some(self.drain_newer(first))
    }

    fn drain_newer(&self, mut latest: T) -> T {
        let mut skipped = 0usize;
        while let Ok(next) = self.rx.try_recv() {
            latest = next;
            skipped += 1;
        }
        if skipped > 0 {
            trace!(skipped, "hand-off backlog drained");
        }
        latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn wait_blocks_until_signal() {
        let (tx, rx) = channel();
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            tx.signal(42u32);
            tx
        });
        assert_eq!(rx.wait(), Some(42));
        drop(producer.join().unwrap());
    }

    #[test]
    fn wait_returns_newest_frame() {
        let (tx, rx) = channel();
        for i in 0..5u32 {
            tx.signal(i);
        }
        assert_eq!(rx.wait(), Some(4));
        drop(tx);
        assert_eq!(rx.wait(), None);
    }

    #[test]
    fn closed_handoff_releases_receiver() {
        let (tx, rx) = channel::<u32>();
        drop(tx);
        assert_eq!(rx.wait(), None);
    }

    #[test]
    fn signal_reports_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);
        assert!(!tx.signal(1u8));
    }

    #[test]
    fn frames_queued_before_close_are_still_delivered() {
        let (tx, rx) = channel();
        tx.signal("last");
        drop(tx);
        assert_eq!(rx.wait(), Some("last"));
        assert_eq!(rx.wait(), None);
    }
}
