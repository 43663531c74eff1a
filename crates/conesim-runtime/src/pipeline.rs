//! [`Pipeline`] – the perception and trajectory tasks wired together.
//!
//! ```text
//!   Perception task (id 1)                    Trajectory task (id 2)
//!   ──────────────────────                    ──────────────────────
//!   wait_for_activation                       wait_for_activation
//!   loop until stop:                          loop until stop:
//!     scan + recover + fuse                     handoff.wait() ──► frame
//!     publish scan / map / stats                build path from frame.map
//!     handoff.signal(frame) ───────────────►    publish path / stats
//!     deadline_miss                             deadline_miss
//!     wait_for_period                           wait_for_period
//! ```
//!
//! The hand-off is the only ordering between the two tasks.  Everything
//! other readers need (scan, map, path, counters) is published through
//! [`SharedOutputs`] as whole snapshots.
//!
//! Stopping is cooperative: raising the [`StopFlag`] makes each loop exit at
//! the top of its next iteration.  When perception exits it drops its side
//! of the hand-off, which releases a trajectory task blocked on it.

use std::sync::Arc;

use chrono::Utc;
use conesim_hal::{PoseSource, SurfaceClassifier};
use conesim_kernel::handoff::{self, HandoffReceiver, HandoffSender};
use conesim_kernel::{Scheduler, SnapshotCell, StopFlag, TaskHandle, TaskId, TaskParams};
use conesim_perception::{PerceptionConfig, PerceptionEngine, PerceptionFrame, PerceptionStats};
use conesim_trajectory::{TrajectoryBuilder, TrajectoryConfig, TrajectoryStats};
use conesim_types::{Landmark, RangeSample, SimError, Waypoint};
use serde::{Deserialize, Serialize};
use tracing::{debug_span, info, warn};

use crate::report::{RunReport, TaskReport};

pub const PERCEPTION_TASK_ID: TaskId = 1;
pub const TRAJECTORY_TASK_ID: TaskId = 2;

/// Timing of the two tasks plus the stage tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub perception_task: TaskParams,
    pub trajectory_task: TaskParams,
    pub perception: PerceptionConfig,
    pub trajectory: TrajectoryConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            perception_task: TaskParams::new(50, 50, 15),
            trajectory_task: TaskParams::new(50, 50, 20),
            perception: PerceptionConfig::default(),
            trajectory: TrajectoryConfig::default(),
        }
    }
}

/// Latest outputs of the pipeline, readable from any thread.
#[derive(Debug, Default)]
pub struct SharedOutputs {
    pub scan: SnapshotCell<Vec<RangeSample>>,
    pub map: SnapshotCell<Vec<Landmark>>,
    pub path: SnapshotCell<Vec<Waypoint>>,
    pub perception_stats: SnapshotCell<PerceptionStats>,
    pub trajectory_stats: SnapshotCell<TrajectoryStats>,
}

/// Running pipeline.  Obtain the [`RunReport`] with
/// [`shutdown`][Self::shutdown] or [`join`][Self::join].
pub struct Pipeline {
    scheduler: Scheduler,
    outputs: Arc<SharedOutputs>,
    stop: StopFlag,
    config: PipelineConfig,
    started_at: chrono::DateTime<Utc>,
}

impl Pipeline {
    /// Create and activate both tasks.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] for invalid perception settings and the
    /// scheduler's error when a task cannot be started.  On error every task
    /// already started has been stopped and joined.
    pub fn start(
        config: PipelineConfig,
        surface: Arc<dyn SurfaceClassifier>,
        pose: Arc<dyn PoseSource>,
        stop: StopFlag,
    ) -> Result<Self, SimError> {
        config.perception.validate()?;

        let scheduler = Scheduler::new();
        let outputs = Arc::new(SharedOutputs::default());
        let (tx, rx) = handoff::channel::<PerceptionFrame>();
        let started_at = Utc::now();

        // Trajectory first, so it is already waiting when the first frame
        // arrives.
        let trajectory = TrajectoryBody {
            builder: TrajectoryBuilder::new(config.trajectory.clone()),
            frames: rx,
            outputs: Arc::clone(&outputs),
            stop: stop.clone(),
        };
        scheduler.create(
            TRAJECTORY_TASK_ID,
            "trajectory",
            config.trajectory_task,
            true,
            move |task| trajectory.run(task),
        )?;

        let perception = PerceptionBody {
            engine: PerceptionEngine::new(config.perception.clone()),
            surface,
            pose,
            frames: tx,
            outputs: Arc::clone(&outputs),
            stop: stop.clone(),
        };
        let created = scheduler.create(
            PERCEPTION_TASK_ID,
            "perception",
            config.perception_task,
            true,
            move |task| perception.run(task),
        );
        if let Err(e) = created {
            // The perception body was dropped with its sender, which closes
            // the hand-off and lets trajectory exit.
            stop.raise();
            if let Err(join_err) = scheduler.join(TRAJECTORY_TASK_ID) {
                warn!(error = %join_err, "trajectory task failed during startup abort");
            }
            return Err(e);
        }

        info!(
            perception_period_ms = config.perception_task.period_ms,
            trajectory_period_ms = config.trajectory_task.period_ms,
            "pipeline started"
        );

        Ok(Self {
            scheduler,
            outputs,
            stop,
            config,
            started_at,
        })
    }

    pub fn outputs(&self) -> Arc<SharedOutputs> {
        Arc::clone(&self.outputs)
    }

    pub fn stop_flag(&self) -> &StopFlag {
        &self.stop
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Raise the stop flag and wait for both tasks.
    pub fn shutdown(self) -> Result<RunReport, SimError> {
        self.stop.raise();
        self.join()
    }

    /// Wait for both tasks to finish (after someone raises the stop flag)
    /// and assemble the report.
    pub fn join(self) -> Result<RunReport, SimError> {
        let perception = self.scheduler.join(PERCEPTION_TASK_ID);
        let trajectory = self.scheduler.join(TRAJECTORY_TASK_ID);
        let perception = perception?;
        let trajectory = trajectory?;

        let report = RunReport {
            started_at: self.started_at,
            finished_at: Utc::now(),
            tasks: vec![
                TaskReport {
                    id: PERCEPTION_TASK_ID,
                    name: "perception".to_string(),
                    params: self.config.perception_task,
                    stats: perception,
                },
                TaskReport {
                    id: TRAJECTORY_TASK_ID,
                    name: "trajectory".to_string(),
                    params: self.config.trajectory_task,
                    stats: trajectory,
                },
            ],
            perception: *self.outputs.perception_stats.load(),
            trajectory: *self.outputs.trajectory_stats.load(),
            map: self.outputs.map.load().as_ref().clone(),
            path: self.outputs.path.load().as_ref().clone(),
        };
        info!(
            map_size = report.map.len(),
            waypoints = report.path.len(),
            deadline_misses = report.total_deadline_misses(),
            "pipeline stopped"
        );
        Ok(report)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Task bodies
// ────────────────────────────────────────────────────────────────────────────

struct PerceptionBody {
    engine: PerceptionEngine,
    surface: Arc<dyn SurfaceClassifier>,
    pose: Arc<dyn PoseSource>,
    frames: HandoffSender<PerceptionFrame>,
    outputs: Arc<SharedOutputs>,
    stop: StopFlag,
}

impl PerceptionBody {
    fn run(mut self, task: TaskHandle) {
        task.wait_for_activation();
        while !self.stop.is_raised() {
            let cycle = self.engine.stats().cycles + 1;
            {
                let _span = debug_span!("perception_cycle", task_id = task.id(), cycle).entered();
                let frame = self.engine.run_cycle(self.surface.as_ref(), self.pose.pose());

                self.outputs.scan.publish_arc(Arc::clone(&frame.samples));
                self.outputs.map.publish_arc(Arc::clone(&frame.map));
                self.outputs.perception_stats.publish(self.engine.stats());
                self.frames.signal(frame);

                task.deadline_miss();
            }
            task.wait_for_period();
        }
    }
}

struct TrajectoryBody {
    builder: TrajectoryBuilder,
    frames: HandoffReceiver<PerceptionFrame>,
    outputs: Arc<SharedOutputs>,
    stop: StopFlag,
}

impl TrajectoryBody {
    fn run(mut self, task: TaskHandle) {
        task.wait_for_activation();
        while !self.stop.is_raised() {
            let Some(frame) = self.frames.wait() else {
                break;
            };
            {
                let _span =
                    debug_span!("trajectory_cycle", task_id = task.id(), cycle = frame.cycle)
                        .entered();
                let path = self.builder.build(&frame.map);
                self.outputs.path.publish_arc(path);
                self.outputs.trajectory_stats.publish(self.builder.stats());

                task.deadline_miss();
            }
            task.wait_for_period();
        }
    }
}
