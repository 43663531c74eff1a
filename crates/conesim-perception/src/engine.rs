//! [`PerceptionEngine`] – one perception cycle.
//!
//! ```text
//! pose + surface ─► range scan ─► border clustering ─► circle recovery ─► fusion
//!                        │                                    │              │
//!                   samples (Arc)                        detections      track map (Arc)
//! ```
//!
//! The engine owns all cross-cycle state (candidate pool, track map and the
//! counters).  Each call to [`run_cycle`][PerceptionEngine::run_cycle]
//! returns a [`PerceptionFrame`] whose buffers are immutable once returned,
//! so they can be handed to other tasks without locking.

use std::sync::Arc;

use conesim_hal::SurfaceClassifier;
use conesim_types::{DetectedLandmark, Landmark, Pose, RangeSample};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::border::{BorderClusterer, BorderSet};
use crate::circle::{CircleEstimator, Degenerate};
use crate::config::PerceptionConfig;
use crate::fusion::{Candidate, FusionReport, LandmarkFusion, TrackMap};
use crate::scan::RangeScanner;

/// Everything one cycle produced.
#[derive(Debug, Clone)]
pub struct PerceptionFrame {
    /// 1-based cycle number.
    pub cycle: u64,
    /// Pose the scan was taken from.
    pub pose: Pose,
    pub samples: Arc<Vec<RangeSample>>,
    /// This cycle's circle-recovery estimates.
    pub detections: Vec<DetectedLandmark>,
    /// Track map after this cycle's fusion.
    pub map: Arc<Vec<Landmark>>,
    pub fusion: FusionReport,
}

/// Running counters of the perception stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerceptionStats {
    pub cycles: u64,
    /// Samples with a hit in the last cycle.
    pub last_hits: usize,
    /// Borders built in the last cycle.
    pub last_borders: usize,
    /// Estimates produced in the last cycle.
    pub last_detections: usize,
    pub total_detections: u64,
    /// Borders skipped for having fewer than three points.
    pub degenerate_too_few_points: u64,
    /// Borders skipped for a distance curve without two minima.
    pub degenerate_missing_minima: u64,
    pub dropped_border_points: u64,
    pub dropped_borders: u64,
    pub dropped_candidates: u64,
    pub dropped_landmarks: u64,
    /// Current candidate pool size.
    pub candidates: usize,
    /// Current track map size.
    pub map_size: usize,
}

/// The perception stage with its cross-cycle state.
#[derive(Debug, Clone)]
pub struct PerceptionEngine {
    config: PerceptionConfig,
    scanner: RangeScanner,
    clusterer: BorderClusterer,
    estimator: CircleEstimator,
    fusion: LandmarkFusion,
    map: TrackMap,
    stats: PerceptionStats,
}

impl PerceptionEngine {
    pub fn new(config: PerceptionConfig) -> Self {
        Self {
            scanner: RangeScanner::new(&config),
            clusterer: BorderClusterer::new(&config),
            estimator: CircleEstimator::new(&config),
            fusion: LandmarkFusion::new(&config),
            map: TrackMap::new(config.map_capacity),
            stats: PerceptionStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    pub fn stats(&self) -> PerceptionStats {
        self.stats
    }

    pub fn map(&self) -> Arc<Vec<Landmark>> {
        self.map.snapshot()
    }

    pub fn candidates(&self) -> &[Candidate] {
        self.fusion.candidates()
    }

    /// Scan from `pose`, recover this cycle's landmarks and fold them into
    /// the map.
    pub fn run_cycle<S>(&mut self, surface: &S, pose: Pose) -> PerceptionFrame
    where
        S: SurfaceClassifier + ?Sized,
    {
        let samples = self.scanner.scan(surface, pose);
        let borders = self.clusterer.cluster(&samples);
        let detections = self.recover(&borders);
        let fusion = self.fusion.fuse(&detections, &mut self.map);

        let stats = &mut self.stats;
        stats.cycles += 1;
        stats.last_hits = samples.iter().filter(|s| s.hit.is_some()).count();
        stats.last_borders = borders.borders.len();
        stats.last_detections = detections.len();
        stats.total_detections += detections.len() as u64;
        stats.dropped_border_points += borders.dropped_points as u64;
        stats.dropped_borders += borders.dropped_borders as u64;
        stats.dropped_candidates += fusion.dropped_candidates as u64;
        stats.dropped_landmarks += fusion.dropped_landmarks as u64;
        stats.candidates = self.fusion.candidates().len();
        stats.map_size = self.map.len();

        debug!(
            cycle = stats.cycles,
            hits = stats.last_hits,
            borders = stats.last_borders,
            detections = stats.last_detections,
            promoted = fusion.promoted,
            map_size = stats.map_size,
            "perception cycle"
        );

        PerceptionFrame {
            cycle: stats.cycles,
            pose,
            samples: Arc::new(samples),
            detections,
            map: self.map.snapshot(),
            fusion,
        }
    }

    fn recover(&mut self, borders: &BorderSet) -> Vec<DetectedLandmark> {
        let mut detections = Vec::with_capacity(borders.borders.len());
        for border in &borders.borders {
            match self.estimator.estimate(&border.points) {
                Ok(position) => detections.push(DetectedLandmark {
                    position,
                    class: border.class,
                }),
                Err(Degenerate::TooFewPoints) => self.stats.degenerate_too_few_points += 1,
                Err(Degenerate::MissingMinima) => {
                    self.stats.degenerate_missing_minima += 1;
                    trace!(
                        first_index = border.indices.first().copied(),
                        points = border.len(),
                        "border skipped: missing minima"
                    );
                }
            }
        }
        detections
    }
}
