//! [`Scheduler`] – periodic task scheduler.
//!
//! Every periodic task gets its own execution unit (a named OS thread) and a
//! descriptor holding its period, relative deadline, priority, deadline-miss
//! counter and its next activation / deadline instants.
//!
//! A task body is a closure receiving its [`TaskHandle`] and follows the
//! canonical shape:
//!
//! ```text
//! handle.wait_for_activation();
//! while !stop.is_raised() {
//!     ... one cycle of work ...
//!     handle.deadline_miss();
//!     handle.wait_for_period();
//! }
//! ```
//!
//! [`TaskHandle::wait_for_period`] sleeps until the *absolute* next
//! activation instant and only then advances it by one period, so the
//! execution time of a cycle never accumulates into drift.
//!
//! # Task state machine
//!
//! ```text
//! Created ──► Idle ──activate──► Activated ──► Running ⇄ WaitingForPeriod
//!    └──auto_activate──────────────┘                    │
//!                                      body returns ──► Terminated
//! ```
//!
//! Termination is driven by the body (typically by observing a
//! [`StopFlag`][crate::stop::StopFlag]), never by the scheduler.
//!
//! # Example
//!
//! ```rust
//! use conesim_kernel::scheduler::{Scheduler, TaskParams};
//!
//! let scheduler = Scheduler::new();
//! scheduler
//!     .create(1, "blink", TaskParams::new(5, 5, 10), true, |task| {
//!         task.wait_for_activation();
//!         for _ in 0..3 {
//!             task.deadline_miss();
//!             task.wait_for_period();
//!         }
//!     })
//!     .expect("spawn");
//!
//! let stats = scheduler.join(1).expect("join");
//! assert_eq!(stats.cycles, 3);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use conesim_types::SimError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::clock::{self, TimeSpec};

/// Identifier of a periodic task.
pub type TaskId = usize;

/// Size of the task table.
pub const MAX_TASKS: usize = 32;

// ────────────────────────────────────────────────────────────────────────────
// Public types
// ────────────────────────────────────────────────────────────────────────────

/// Timing parameters of a periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskParams {
    /// Interval between successive activations (ms).
    pub period_ms: u32,
    /// Maximum time from activation for a cycle to finish (ms).
    pub deadline_ms: u32,
    /// Scheduling priority (lower number = higher priority).
    pub priority: u8,
}

impl TaskParams {
    pub const fn new(period_ms: u32, deadline_ms: u32, priority: u8) -> Self {
        Self {
            period_ms,
            deadline_ms,
            priority,
        }
    }
}

/// Lifecycle state of a task (see the module docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    Created,
    Idle,
    Activated,
    Running,
    WaitingForPeriod,
    Terminated,
}

/// Counters accumulated over a task's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskStats {
    /// Number of completed `wait_for_period` calls.
    pub cycles: u64,
    /// Number of cycles that finished after their deadline.
    pub deadline_misses: u64,
    /// Execution time of the most recent cycle.
    pub last_exec: Duration,
    /// Longest execution time observed.
    pub worst_exec: Duration,
}

// ────────────────────────────────────────────────────────────────────────────
// Internal descriptor
// ────────────────────────────────────────────────────────────────────────────

struct Timing {
    params: TaskParams,
    state: TaskState,
    next_activation: Option<TimeSpec>,
    next_deadline: Option<TimeSpec>,
    /// Start of the cycle currently executing.
    released_at: Option<TimeSpec>,
    stats: TaskStats,
}

impl Timing {
    /// Re-establish `deadline - activation == deadline_ms - period_ms` after a
    /// parameter change.
    fn realign_deadline(&mut self) {
        if let Some(at) = self.next_activation {
            let offset =
                i64::from(self.params.deadline_ms) - i64::from(self.params.period_ms);
            self.next_deadline = Some(at.add_ms(offset));
        }
    }
}

/// Counting semaphore used to release a task.
#[derive(Default)]
struct Activation {
    pending: Mutex<u32>,
    released: Condvar,
}

impl Activation {
    fn post(&self) {
        *lock(&self.pending) += 1;
        self.released.notify_one();
    }

    fn wait(&self) {
        let mut pending = lock(&self.pending);
        while *pending == 0 {
            pending = self
                .released
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *pending -= 1;
    }
}

struct TaskShared {
    id: TaskId,
    name: String,
    timing: Mutex<Timing>,
    activation: Activation,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ────────────────────────────────────────────────────────────────────────────
// TaskHandle
// ────────────────────────────────────────────────────────────────────────────

/// Handle to one task's descriptor.  The task body receives one; clones are
/// cheap and share the descriptor.
#[derive(Clone)]
pub struct TaskHandle(Arc<TaskShared>);

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .finish()
    }
}

impl TaskHandle {
    fn new(id: TaskId, name: &str, params: TaskParams) -> Self {
        Self(Arc::new(TaskShared {
            id,
            name: name.to_string(),
            timing: Mutex::new(Timing {
                params,
                state: TaskState::Created,
                next_activation: None,
                next_deadline: None,
                released_at: None,
                stats: TaskStats::default(),
            }),
            activation: Activation::default(),
        }))
    }

    pub fn id(&self) -> TaskId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    fn set_state(&self, state: TaskState) {
        lock(&self.0.timing).state = state;
    }

    /// Release the task.  Activating a task that is already running only
    /// queues a release for a future `wait_for_activation` call.
    pub fn activate(&self) {
        {
            let mut timing = lock(&self.0.timing);
            if matches!(timing.state, TaskState::Created | TaskState::Idle) {
                timing.state = TaskState::Activated;
            }
        }
        self.0.activation.post();
    }

    /// Block until the task is released, then take "now" as the first
    /// activation and set the first next-activation / next-deadline instants.
    ///
    /// Called once, before the task's loop.
    pub fn wait_for_activation(&self) {
        self.0.activation.wait();
        let now = TimeSpec::now();
        let mut timing = lock(&self.0.timing);
        let params = timing.params;
        timing.next_activation = Some(now.add_ms(i64::from(params.period_ms)));
        timing.next_deadline = Some(now.add_ms(i64::from(params.deadline_ms)));
        timing.released_at = Some(now);
        timing.state = TaskState::Running;
        debug!(task_id = self.0.id, task = %self.0.name, "task activated");
    }

    /// Sleep until the absolute next-activation instant, then advance both the
    /// activation and the deadline instants by one period.
    ///
    /// Called once per loop iteration.  Calling it before
    /// [`wait_for_activation`][Self::wait_for_activation] logs a warning and
    /// returns immediately.
    pub fn wait_for_period(&self) {
        let target = {
            let mut timing = lock(&self.0.timing);
            let Some(target) = timing.next_activation else {
                warn!(task_id = self.0.id, "wait_for_period called before activation");
                return;
            };
            if let Some(released) = timing.released_at {
                let exec = TimeSpec::now().saturating_since(released);
                timing.stats.last_exec = exec;
                timing.stats.worst_exec = timing.stats.worst_exec.max(exec);
                trace!(
                    task_id = self.0.id,
                    exec_us = exec.as_micros() as u64,
                    "cycle finished"
                );
            }
            timing.state = TaskState::WaitingForPeriod;
            target
        };

        clock::sleep_until(target);

        let mut timing = lock(&self.0.timing);
        let period = i64::from(timing.params.period_ms);
        timing.next_activation = Some(target.add_ms(period));
        timing.next_deadline = timing.next_deadline.map(|dl| dl.add_ms(period));
        timing.released_at = Some(TimeSpec::now());
        timing.stats.cycles += 1;
        timing.state = TaskState::Running;
    }

    /// Compare "now" with the current deadline.  On a miss the counter is
    /// incremented and `true` is returned.  Advisory only.
    pub fn deadline_miss(&self) -> bool {
        let now = TimeSpec::now();
        let mut timing = lock(&self.0.timing);
        match timing.next_deadline {
            Some(deadline) if now > deadline => {
                timing.stats.deadline_misses += 1;
                warn!(
                    task_id = self.0.id,
                    task = %self.0.name,
                    misses = timing.stats.deadline_misses,
                    late_us = now.saturating_since(deadline).as_micros() as u64,
                    "deadline miss"
                );
                true
            }
            _ => false,
        }
    }

    pub fn period(&self) -> u32 {
        lock(&self.0.timing).params.period_ms
    }

    pub fn deadline(&self) -> u32 {
        lock(&self.0.timing).params.deadline_ms
    }

    pub fn priority(&self) -> u8 {
        lock(&self.0.timing).params.priority
    }

    /// Change the period; takes effect from the next period advance.
    pub fn set_period(&self, period_ms: u32) {
        let mut timing = lock(&self.0.timing);
        timing.params.period_ms = period_ms;
        timing.realign_deadline();
    }

    /// Change the relative deadline.
    pub fn set_deadline(&self, deadline_ms: u32) {
        let mut timing = lock(&self.0.timing);
        timing.params.deadline_ms = deadline_ms;
        timing.realign_deadline();
    }

    pub fn deadline_misses(&self) -> u64 {
        lock(&self.0.timing).stats.deadline_misses
    }

    pub fn stats(&self) -> TaskStats {
        lock(&self.0.timing).stats
    }

    pub fn state(&self) -> TaskState {
        lock(&self.0.timing).state
    }

    /// `None` until the task has been activated.
    pub fn next_activation(&self) -> Option<TimeSpec> {
        lock(&self.0.timing).next_activation
    }

    /// `None` until the task has been activated.
    pub fn next_deadline(&self) -> Option<TimeSpec> {
        lock(&self.0.timing).next_deadline
    }
}

/// Marks the task terminated when the body returns or unwinds.
struct TerminationGuard(TaskHandle);

impl Drop for TerminationGuard {
    fn drop(&mut self) {
        self.0.set_state(TaskState::Terminated);
        debug!(task_id = self.0.id(), "task terminated");
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scheduler
// ────────────────────────────────────────────────────────────────────────────

struct TaskEntry {
    handle: TaskHandle,
    thread: Option<JoinHandle<()>>,
}

/// Task table plus the id-based task API.
///
/// Priorities are recorded and reported; they are not pushed into the OS
/// scheduler.
pub struct Scheduler {
    tasks: Mutex<HashMap<TaskId, TaskEntry>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create an empty scheduler and pin the clock epoch.
    pub fn new() -> Self {
        let _ = TimeSpec::now();
        Self {
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Register task `id` and start its execution unit running `body`.
    ///
    /// With `auto_activate` the task is released immediately; otherwise it
    /// stays `Idle` until [`activate`][Self::activate].
    ///
    /// # Errors
    ///
    /// - [`SimError::DuplicateTask`] if `id` is already registered.
    /// - [`SimError::TaskTableFull`] if [`MAX_TASKS`] tasks exist.
    /// - [`SimError::TaskSpawn`] if the thread cannot be started.
    pub fn create<F>(
        &self,
        id: TaskId,
        name: &str,
        params: TaskParams,
        auto_activate: bool,
        body: F,
    ) -> Result<TaskHandle, SimError>
    where
        F: FnOnce(TaskHandle) + Send + 'static,
    {
        let mut tasks = lock(&self.tasks);
        if tasks.contains_key(&id) {
            return Err(SimError::DuplicateTask(id));
        }
        if tasks.len() >= MAX_TASKS {
            return Err(SimError::TaskTableFull(MAX_TASKS));
        }

        let handle = TaskHandle::new(id, name, params);
        handle.set_state(TaskState::Idle);

        let worker = handle.clone();
        let thread = thread::Builder::new()
            .name(format!("conesim-task-{id}-{name}"))
            .spawn(move || {
                let _guard = TerminationGuard(worker.clone());
                body(worker);
            })
            .map_err(|e| SimError::TaskSpawn {
                id,
                details: e.to_string(),
            })?;

        info!(
            task_id = id,
            task = name,
            period_ms = params.period_ms,
            deadline_ms = params.deadline_ms,
            priority = params.priority,
            "task created"
        );

        tasks.insert(
            id,
            TaskEntry {
                handle: handle.clone(),
                thread: Some(thread),
            },
        );
        drop(tasks);

        if auto_activate {
            handle.activate();
        }
        Ok(handle)
    }

    /// A handle to task `id`.
    pub fn handle(&self, id: TaskId) -> Result<TaskHandle, SimError> {
        lock(&self.tasks)
            .get(&id)
            .map(|entry| entry.handle.clone())
            .ok_or(SimError::UnknownTask(id))
    }

    /// Registered task ids, ascending.
    pub fn task_ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = lock(&self.tasks).keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn activate(&self, id: TaskId) -> Result<(), SimError> {
        self.handle(id)?.activate();
        Ok(())
    }

    /// See [`TaskHandle::wait_for_activation`].
    pub fn wait_for_activation(&self, id: TaskId) -> Result<(), SimError> {
        self.handle(id)?.wait_for_activation();
        Ok(())
    }

    /// See [`TaskHandle::wait_for_period`].
    pub fn wait_for_period(&self, id: TaskId) -> Result<(), SimError> {
        self.handle(id)?.wait_for_period();
        Ok(())
    }

    /// See [`TaskHandle::deadline_miss`].
    pub fn deadline_miss(&self, id: TaskId) -> Result<bool, SimError> {
        Ok(self.handle(id)?.deadline_miss())
    }

    pub fn period(&self, id: TaskId) -> Result<u32, SimError> {
        Ok(self.handle(id)?.period())
    }

    pub fn set_period(&self, id: TaskId, period_ms: u32) -> Result<(), SimError> {
        self.handle(id)?.set_period(period_ms);
        Ok(())
    }

    pub fn deadline(&self, id: TaskId) -> Result<u32, SimError> {
        Ok(self.handle(id)?.deadline())
    }

    pub fn set_deadline(&self, id: TaskId, deadline_ms: u32) -> Result<(), SimError> {
        self.handle(id)?.set_deadline(deadline_ms);
        Ok(())
    }

    pub fn priority(&self, id: TaskId) -> Result<u8, SimError> {
        Ok(self.handle(id)?.priority())
    }

    pub fn deadline_misses(&self, id: TaskId) -> Result<u64, SimError> {
        Ok(self.handle(id)?.deadline_misses())
    }

    pub fn state(&self, id: TaskId) -> Result<TaskState, SimError> {
        Ok(self.handle(id)?.state())
    }

    pub fn next_activation(&self, id: TaskId) -> Result<Option<TimeSpec>, SimError> {
        Ok(self.handle(id)?.next_activation())
    }

    pub fn next_deadline(&self, id: TaskId) -> Result<Option<TimeSpec>, SimError> {
        Ok(self.handle(id)?.next_deadline())
    }

    /// Block until task `id` terminates, tear its descriptor down and return
    /// its final counters.
    ///
    /// # Errors
    ///
    /// - [`SimError::UnknownTask`] if `id` is not registered (or is already
    ///   being joined).
    /// - [`SimError::TaskPanicked`] if the body panicked.
    pub fn join(&self, id: TaskId) -> Result<TaskStats, SimError> {
        let (handle, thread) = {
            let mut tasks = lock(&self.tasks);
            let entry = tasks.get_mut(&id).ok_or(SimError::UnknownTask(id))?;
            let thread = entry.thread.take().ok_or(SimError::UnknownTask(id))?;
            (entry.handle.clone(), thread)
        };

        let outcome = thread.join();
        lock(&self.tasks).remove(&id);

        match outcome {
            Ok(()) => {
                let stats = handle.stats();
                info!(
                    task_id = id,
                    task = handle.name(),
                    cycles = stats.cycles,
                    deadline_misses = stats.deadline_misses,
                    "task joined"
                );
                Ok(stats)
            }
            Err(_) => Err(SimError::TaskPanicked(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn auto_activated_task_runs_cycles() {
        let sched = Scheduler::new();
        sched
            .create(1, "counter", TaskParams::new(2, 2, 10), true, |task| {
                task.wait_for_activation();
                for _ in 0..5 {
                    task.wait_for_period();
                }
            })
            .unwrap();
        let stats = sched.join(1).unwrap();
        assert_eq!(stats.cycles, 5);
    }

    #[test]
    fn idle_task_waits_for_activate() {
        let sched = Scheduler::new();
        let (tx, rx) = mpsc::channel();
        sched
            .create(2, "idle", TaskParams::new(5, 5, 10), false, move |task| {
                task.wait_for_activation();
                tx.send(()).unwrap();
            })
            .unwrap();

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        assert_eq!(sched.state(2).unwrap(), TaskState::Idle);

        sched.activate(2).unwrap();
        rx.recv_timeout(Duration::from_secs(2)).expect("task released");
        sched.join(2).unwrap();
    }

    #[test]
    fn instants_are_unset_before_activation() {
        let sched = Scheduler::new();
        sched
            .create(3, "lazy", TaskParams::new(5, 5, 10), false, |task| {
                task.wait_for_activation();
            })
            .unwrap();
        assert_eq!(sched.next_activation(3).unwrap(), None);
        assert_eq!(sched.next_deadline(3).unwrap(), None);
        sched.activate(3).unwrap();
        sched.join(3).unwrap();
    }

    #[test]
    fn activation_sets_first_instants_one_period_ahead() {
        let sched = Scheduler::new();
        let (tx, rx) = mpsc::channel();
        let before = TimeSpec::now();
        sched
            .create(4, "timing", TaskParams::new(20, 15, 10), true, move |task| {
                task.wait_for_activation();
                tx.send((task.next_activation(), task.next_deadline())).unwrap();
            })
            .unwrap();
        let (at, dl) = rx.recv().unwrap();
        let (at, dl) = (at.unwrap(), dl.unwrap());
        assert!(at >= before.add_ms(20));
        // deadline - activation == deadline_ms - period_ms
        assert_eq!(dl, at.add_ms(-5));
        sched.join(4).unwrap();
    }

    #[test]
    fn period_waits_track_absolute_schedule_without_drift() {
        const PERIOD_MS: i64 = 10;
        const CYCLES: i64 = 30;
        let sched = Scheduler::new();
        let (tx, rx) = mpsc::channel();
        sched
            .create(5, "drift", TaskParams::new(PERIOD_MS as u32, PERIOD_MS as u32, 10), true, move |task| {
                task.wait_for_activation();
                let first = task.next_activation().unwrap();
                let t0 = first.add_ms(-PERIOD_MS);
                let mut wakes = Vec::new();
                for _ in 0..CYCLES {
                    // Burn part of the period so a relative sleep would drift.
                    thread::sleep(Duration::from_millis(3));
                    task.wait_for_period();
                    wakes.push(TimeSpec::now());
                }
                tx.send((t0, wakes, task.next_activation().unwrap())).unwrap();
            })
            .unwrap();

        let (t0, wakes, final_at) = rx.recv().unwrap();
        // The schedule is pure arithmetic on the first activation.
        assert_eq!(final_at, t0.add_ms((CYCLES + 1) * PERIOD_MS));
        for (k, wake) in wakes.iter().enumerate() {
            let ideal = t0.add_ms((k as i64 + 1) * PERIOD_MS);
            assert!(*wake >= ideal, "woke before the absolute instant");
        }
        // The last wake stays close to its ideal instant: lateness is bounded,
        // not accumulated over the run.
        let last = *wakes.last().unwrap();
        let ideal = t0.add_ms(CYCLES * PERIOD_MS);
        assert!(last.saturating_since(ideal) < Duration::from_millis(3 * PERIOD_MS as u64));
        sched.join(5).unwrap();
    }

    #[test]
    fn overrun_counts_exactly_one_deadline_miss() {
        let sched = Scheduler::new();
        let (tx, rx) = mpsc::channel();
        sched
            .create(6, "overrun", TaskParams::new(30, 5, 10), true, move |task| {
                task.wait_for_activation();
                let mut results = Vec::new();
                // First cycle overruns its 5 ms deadline.
                thread::sleep(Duration::from_millis(15));
                results.push((task.deadline_miss(), task.deadline_misses()));
                task.wait_for_period();
                // Second cycle is quick.
                results.push((task.deadline_miss(), task.deadline_misses()));
                task.wait_for_period();
                tx.send(results).unwrap();
            })
            .unwrap();

        let results = rx.recv().unwrap();
        assert_eq!(results[0], (true, 1));
        assert_eq!(results[1], (false, 1));
        let stats = sched.join(6).unwrap();
        assert_eq!(stats.deadline_misses, 1);
    }

    #[test]
    fn deadline_miss_before_activation_is_false() {
        let handle = TaskHandle::new(7, "dormant", TaskParams::new(10, 10, 1));
        assert!(!handle.deadline_miss());
        assert_eq!(handle.deadline_misses(), 0);
    }

    #[test]
    fn wait_for_period_before_activation_returns() {
        let handle = TaskHandle::new(8, "early", TaskParams::new(10, 10, 1));
        handle.wait_for_period();
        assert_eq!(handle.stats().cycles, 0);
    }

    #[test]
    fn setters_update_params_and_keep_offset() {
        let sched = Scheduler::new();
        let (tx, rx) = mpsc::channel();
        let (go_tx, go_rx) = mpsc::channel::<()>();
        sched
            .create(9, "tunable", TaskParams::new(20, 20, 3), true, move |task| {
                task.wait_for_activation();
                tx.send(()).unwrap();
                go_rx.recv().unwrap();
            })
            .unwrap();
        rx.recv().unwrap();

        sched.set_period(9, 40).unwrap();
        sched.set_deadline(9, 30).unwrap();
        assert_eq!(sched.period(9).unwrap(), 40);
        assert_eq!(sched.deadline(9).unwrap(), 30);
        assert_eq!(sched.priority(9).unwrap(), 3);

        let at = sched.next_activation(9).unwrap().unwrap();
        let dl = sched.next_deadline(9).unwrap().unwrap();
        assert_eq!(dl, at.add_ms(30 - 40));

        go_tx.send(()).unwrap();
        sched.join(9).unwrap();
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let sched = Scheduler::new();
        sched
            .create(10, "a", TaskParams::new(5, 5, 1), true, |task| task.wait_for_activation())
            .unwrap();
        let err = sched
            .create(10, "b", TaskParams::new(5, 5, 1), true, |_| {})
            .unwrap_err();
        assert_eq!(err, SimError::DuplicateTask(10));
        sched.join(10).unwrap();
    }

    #[test]
    fn task_table_is_bounded() {
        let sched = Scheduler::new();
        for id in 0..MAX_TASKS {
            sched
                .create(id, "filler", TaskParams::new(5, 5, 1), false, |_| {})
                .unwrap();
        }
        let err = sched
            .create(MAX_TASKS, "overflow", TaskParams::new(5, 5, 1), false, |_| {})
            .unwrap_err();
        assert_eq!(err, SimError::TaskTableFull(MAX_TASKS));
        for id in 0..MAX_TASKS {
            sched.join(id).unwrap();
        }
    }

    #[test]
    fn unknown_task_is_an_error() {
        let sched = Scheduler::new();
        assert_eq!(sched.period(99).unwrap_err(), SimError::UnknownTask(99));
        assert_eq!(sched.join(99).unwrap_err(), SimError::UnknownTask(99));
    }

    #[test]
    fn join_tears_descriptor_down() {
        let sched = Scheduler::new();
        sched
            .create(11, "short", TaskParams::new(5, 5, 1), true, |task| task.wait_for_activation())
            .unwrap();
        sched.join(11).unwrap();
        assert!(sched.task_ids().is_empty());
        assert_eq!(sched.state(11).unwrap_err(), SimError::UnknownTask(11));
    }

    #[test]
    fn terminated_state_is_reported() {
        let sched = Scheduler::new();
        let handle = sched
            .create(12, "done", TaskParams::new(5, 5, 1), true, |task| task.wait_for_activation())
            .unwrap();
        sched.join(12).unwrap();
        assert_eq!(handle.state(), TaskState::Terminated);
    }

    #[test]
    fn panicking_body_is_reported_on_join() {
        let sched = Scheduler::new();
        sched
            .create(13, "boom", TaskParams::new(5, 5, 1), true, |task| {
                task.wait_for_activation();
                panic!("task body failure");
            })
            .unwrap();
        assert_eq!(sched.join(13).unwrap_err(), SimError::TaskPanicked(13));
    }
}
