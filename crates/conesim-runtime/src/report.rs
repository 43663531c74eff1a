//! [`RunReport`] – what a run did, assembled once the tasks have joined.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use conesim_kernel::{TaskId, TaskParams, TaskStats};
use conesim_perception::PerceptionStats;
use conesim_trajectory::TrajectoryStats;
use conesim_types::{Landmark, SimError, Waypoint};
use serde::{Deserialize, Serialize};

/// Final counters of one periodic task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    pub id: TaskId,
    pub name: String,
    pub params: TaskParams,
    pub stats: TaskStats,
}

/// Summary of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tasks: Vec<TaskReport>,
    pub perception: PerceptionStats,
    pub trajectory: TrajectoryStats,
    /// Track map at shutdown.
    pub map: Vec<Landmark>,
    /// Path at shutdown.
    pub path: Vec<Waypoint>,
}

impl RunReport {
    /// Wall-clock length of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Deadline misses summed over all tasks.
    pub fn total_deadline_misses(&self) -> u64 {
        self.tasks.iter().map(|t| t.stats.deadline_misses).sum()
    }

    pub fn task(&self, id: TaskId) -> Option<&TaskReport> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        serde_json::to_string_pretty(self).map_err(|e| SimError::Serialization(e.to_string()))
    }

    /// Write the report as pretty-printed JSON to `path`.
    pub fn write_json(&self, path: &Path) -> Result<(), SimError> {
        let json = self.to_json()?;
        fs::write(path, json)
            .map_err(|e| SimError::Serialization(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conesim_types::{LandmarkClass, Point2};
    use std::time::Duration;

    fn sample_report() -> RunReport {
        let started_at = Utc::now();
        RunReport {
            started_at,
            finished_at: started_at + chrono::Duration::milliseconds(1500),
            tasks: vec![
                TaskReport {
                    id: 1,
                    name: "perception".into(),
                    params: TaskParams::new(50, 50, 15),
                    stats: TaskStats {
                        cycles: 30,
                        deadline_misses: 2,
                        last_exec: Duration::from_millis(4),
                        worst_exec: Duration::from_millis(60),
                    },
                },
                TaskReport {
                    id: 2,
                    name: "trajectory".into(),
                    params: TaskParams::new(50, 50, 20),
                    stats: TaskStats {
                        deadline_misses: 1,
                        ..TaskStats::default()
                    },
                },
            ],
            perception: PerceptionStats::default(),
            trajectory: TrajectoryStats::default(),
            map: vec![Landmark {
                position: Point2::new(1.0, 2.0),
                class: LandmarkClass::Yellow,
            }],
            path: vec![Waypoint { x: 1.0, y: 1.0 }],
        }
    }

    #[test]
    fn totals_and_lookup() {
        let report = sample_report();
        assert_eq!(report.total_deadline_misses(), 3);
        assert_eq!(report.elapsed().num_milliseconds(), 1500);
        assert_eq!(report.task(2).map(|t| t.name.as_str()), Some("trajectory"));
        assert!(report.task(9).is_none());
    }

    #[test]
    fn json_dump_reloads() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        report.write_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"yellow\""));
        let back: RunReport = serde_json::from_str(&text).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("run.json");
        assert!(matches!(
            sample_report().write_json(&path),
            Err(SimError::Serialization(_))
        ));
    }
}
