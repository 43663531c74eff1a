//! [`TrajectoryBuilder`] – centre-line path from the track map.
//!
//! 1. [`pair_opposite`]: every landmark not yet paired looks up its nearest
//!    opposite-class landmark by brute force; the pairing is recorded on
//!    both sides, overwriting an earlier pairing of the neighbour.
//! 2. [`midpoints`]: one waypoint per paired landmark, at the pair midpoint.
//! 3. [`order_path`]: greedy nearest-neighbour tour starting from the first
//!    waypoint.  Ties go to the earliest waypoint.
//!
//! Below `min_landmarks` confirmed landmarks the previous path is kept.
//!
//! # Example
//!
//! ```rust
//! use conesim_trajectory::{TrajectoryBuilder, TrajectoryConfig};
//! use conesim_types::{Landmark, LandmarkClass, Point2};
//!
//! let map = vec![
//!     Landmark { position: Point2::new(0.0, 0.0), class: LandmarkClass::Yellow },
//!     Landmark { position: Point2::new(2.0, 0.0), class: LandmarkClass::Blue },
//!     Landmark { position: Point2::new(0.0, 2.0), class: LandmarkClass::Yellow },
//! ];
//!
//! let mut builder = TrajectoryBuilder::new(TrajectoryConfig::default());
//! let path = builder.build(&map);
//! assert_eq!((path[0].x, path[0].y), (1.0, 0.0));
//! ```

use std::sync::Arc;

use conesim_types::{Landmark, Waypoint};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Trajectory tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryConfig {
    /// Fewer confirmed landmarks than this keeps the previous path.
    pub min_landmarks: usize,
    /// Upper bound on emitted waypoints.
    pub max_waypoints: usize,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            min_landmarks: 3,
            max_waypoints: 360,
        }
    }
}

/// Counters of the trajectory stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectoryStats {
    /// Paths rebuilt.
    pub builds: u64,
    /// Calls that kept the previous path for lack of landmarks.
    pub skipped: u64,
    /// Waypoints in the current path.
    pub waypoints: usize,
}

/// Keeps the current path and rebuilds it from the track map.
#[derive(Debug, Clone)]
pub struct TrajectoryBuilder {
    config: TrajectoryConfig,
    path: Arc<Vec<Waypoint>>,
    stats: TrajectoryStats,
}

impl TrajectoryBuilder {
    pub fn new(config: TrajectoryConfig) -> Self {
        Self {
            config,
            path: Arc::new(Vec::new()),
            stats: TrajectoryStats::default(),
        }
    }

    /// The most recently built path.
    pub fn path(&self) -> Arc<Vec<Waypoint>> {
        Arc::clone(&self.path)
    }

    pub fn stats(&self) -> TrajectoryStats {
        self.stats
    }

    /// Rebuild the path from `map` and return it.  With fewer than
    /// `min_landmarks` landmarks the previous path is returned unchanged.
    pub fn build(&mut self, map: &[Landmark]) -> Arc<Vec<Waypoint>> {
        if map.len() < self.config.min_landmarks {
            self.stats.skipped += 1;
            trace!(landmarks = map.len(), "not enough landmarks; path kept");
            return self.path();
        }

        let pairs = pair_opposite(map);
        let unordered = midpoints(map, &pairs, self.config.max_waypoints);
        let path = order_path(unordered);

        self.stats.builds += 1;
        self.stats.waypoints = path.len();
        debug!(
            landmarks = map.len(),
            waypoints = path.len(),
            "trajectory rebuilt"
        );

        self.path = Arc::new(path);
        self.path()
    }
}

/// For every landmark, the index of its opposite-class partner.
///
/// Landmarks are visited in map order.  A landmark that already has a
/// partner (recorded when a neighbour picked it) is skipped; otherwise its
/// nearest opposite-class landmark becomes its partner and the pairing is
/// written on the partner's side as well.
pub fn pair_opposite(map: &[Landmark]) -> Vec<Option<usize>> {
    let mut partner: Vec<Option<usize>> = vec![None; map.len()];

    for (i, focus) in map.iter().enumerate() {
        if partner[i].is_some() {
            continue;
        }
        let wanted = focus.class.opposite();

        let mut nearest: Option<(usize, f32)> = None;
        for (j, other) in map.iter().enumerate() {
            if other.class != wanted {
                continue;
            }
            let distance = focus.position.distance(other.position);
            if nearest.is_none_or(|(_, best)| distance < best) {
                nearest = Some((j, distance));
            }
        }

        if let Some((j, _)) = nearest {
            partner[i] = Some(j);
            partner[j] = Some(i);
        }
    }
    partner
}

/// One waypoint per paired landmark, in map order, at most `max_waypoints`.
pub fn midpoints(
    map: &[Landmark],
    partner: &[Option<usize>],
    max_waypoints: usize,
) -> Vec<Waypoint> {
    map.iter()
        .zip(partner)
        .filter_map(|(landmark, p)| {
            p.map(|j| Waypoint::from(landmark.position.midpoint(map[j].position)))
        })
        .take(max_waypoints)
        .collect()
}

/// Reorder `waypoints` into a greedy nearest-neighbour tour that starts at
/// the first waypoint.  The result is a permutation of the input.
pub fn order_path(waypoints: Vec<Waypoint>) -> Vec<Waypoint> {
    if waypoints.len() < 2 {
        return waypoints;
    }

    let mut used = vec![false; waypoints.len()];
    let mut path = Vec::with_capacity(waypoints.len());
    used[0] = true;
    path.push(waypoints[0]);

    while path.len() < waypoints.len() {
        let Some(&current) = path.last() else { break };
        let mut next: Option<(usize, f32)> = None;
        for (j, candidate) in waypoints.iter().enumerate() {
            if used[j] {
                continue;
            }
            let distance = current.position().distance(candidate.position());
            if next.is_none_or(|(_, best)| distance < best) {
                next = Some((j, distance));
            }
        }
        let Some((j, _)) = next else { break };
        used[j] = true;
        path.push(waypoints[j]);
    }
    path
}
