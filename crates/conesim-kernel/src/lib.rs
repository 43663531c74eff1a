//! `conesim-kernel` – Timing & Coordination
//!
//! The periodic-task core of conesim.  It does not know what the tasks
//! compute; it releases them on an absolute-time schedule, measures their
//! deadlines and lets them exchange data without blocking each other.
//!
//! # Modules
//!
//! - [`clock`] – [`TimeSpec`][clock::TimeSpec]: normalised monotonic
//!   instants, millisecond arithmetic, comparison and absolute-time sleep.
//! - [`scheduler`] – [`Scheduler`][scheduler::Scheduler]: task table with
//!   one execution unit per task, activation, period waits and advisory
//!   deadline-miss counting.
//! - [`handoff`] – one-way "new data ready" signal carrying a per-cycle
//!   frame from a producer task to a consumer task.
//! - [`snapshot`] – [`SnapshotCell`][snapshot::SnapshotCell]: whole-value
//!   publication so readers never observe a half-updated collection.
//! - [`stop`] – [`StopFlag`][stop::StopFlag]: cooperative stop condition
//!   checked by every task loop.

pub mod clock;
pub mod handoff;
pub mod scheduler;
pub mod snapshot;
pub mod stop;

pub use clock::TimeSpec;
pub use handoff::{HandoffReceiver, HandoffSender};
pub use scheduler::{Scheduler, TaskHandle, TaskId, TaskParams, TaskState, TaskStats};
pub use snapshot::SnapshotCell;
pub use stop::StopFlag;
