//! Multi-cycle landmark fusion.
//!
//! Fresh per-cycle estimates are matched against a pool of
//! [`Candidate`]s.  A candidate's position is the running average of the
//! estimates folded into it; once its confirmation count reaches the
//! threshold it is promoted into the [`TrackMap`] exactly once, and from then
//! on it is left untouched.
//!
//! The candidate pool and the map are bounded.  New candidates or promotions
//! that do not fit are dropped and counted.

use std::sync::Arc;

use conesim_types::{DetectedLandmark, Landmark, LandmarkClass, Point2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PerceptionConfig;

/// A tentatively detected landmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Running average of the matched estimates.
    pub position: Point2,
    pub class: LandmarkClass,
    /// Number of estimates folded in so far.
    pub count: u32,
}

/// The persistent, append-only set of confirmed landmarks.
///
/// Entries are never removed or modified.  [`snapshot`][Self::snapshot]
/// hands out the current contents as a shared immutable value; appending
/// after a snapshot copies the backing vector, so earlier snapshots never
/// change.
#[derive(Debug, Clone, Default)]
pub struct TrackMap {
    landmarks: Arc<Vec<Landmark>>,
    capacity: usize,
}

impl TrackMap {
    pub fn new(capacity: usize) -> Self {
        Self {
            landmarks: Arc::new(Vec::new()),
            capacity,
        }
    }

    /// Append `landmark`; `false` when the map is full.
    pub fn push(&mut self, landmark: Landmark) -> bool {
        if self.landmarks.len() >= self.capacity {
            return false;
        }
        Arc::make_mut(&mut self.landmarks).push(landmark);
        true
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn snapshot(&self) -> Arc<Vec<Landmark>> {
        Arc::clone(&self.landmarks)
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// What one fusion pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionReport {
    /// Estimates folded into an unconfirmed candidate.
    pub matched: usize,
    /// Estimates that matched an already confirmed candidate.
    pub confirmed_hits: usize,
    /// New candidates opened.
    pub opened: usize,
    /// Candidates promoted into the map.
    pub promoted: usize,
    /// Estimates dropped because the candidate pool was full.
    pub dropped_candidates: usize,
    /// Promotions dropped because the map was full.
    pub dropped_landmarks: usize,
}

/// Candidate pool plus the matching rules.
#[derive(Debug, Clone)]
pub struct LandmarkFusion {
    candidates: Vec<Candidate>,
    capacity: usize,
    match_distance: f32,
    threshold: u32,
}

impl LandmarkFusion {
    pub fn new(config: &PerceptionConfig) -> Self {
        Self {
            candidates: Vec::new(),
            capacity: config.candidate_capacity,
            match_distance: config.match_distance(),
            threshold: config.confirmation_threshold,
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Fold one cycle's `detections` into the pool, promoting into `map`.
    pub fn fuse(&mut self, detections: &[DetectedLandmark], map: &mut TrackMap) -> FusionReport {
        let mut report = FusionReport::default();

        for detection in detections {
            let matched = self.candidates.iter().position(|c| {
                c.class == detection.class
                    && c.position.distance(detection.position) <= self.match_distance
            });

            let index = match matched {
                Some(i) if self.candidates[i].count >= self.threshold => {
                    report.confirmed_hits += 1;
                    continue;
                }
                Some(i) => {
                    let c = &mut self.candidates[i];
                    let n = c.count as f32;
                    c.position = Point2::new(
                        (c.position.x * n + detection.position.x) / (n + 1.0),
                        (c.position.y * n + detection.position.y) / (n + 1.0),
                    );
                    c.count += 1;
                    report.matched += 1;
                    i
                }
                None if self.candidates.len() < self.capacity => {
                    self.candidates.push(Candidate {
                        position: detection.position,
                        class: detection.class,
                        count: 1,
                    });
                    report.opened += 1;
                    self.candidates.len() - 1
                }
                None => {
                    report.dropped_candidates += 1;
                    continue;
                }
            };

            let candidate = self.candidates[index];
            if candidate.count == self.threshold {
                let landmark = Landmark {
                    position: candidate.position,
                    class: candidate.class,
                };
                if map.push(landmark) {
                    report.promoted += 1;
                    info!(
                        x = landmark.position.x,
                        y = landmark.position.y,
                        class = %landmark.class,
                        map_size = map.len(),
                        "landmark confirmed"
                    );
                } else {
                    report.dropped_landmarks += 1;
                    debug!(capacity = map.capacity(), "track map full; landmark dropped");
                }
            }
        }

        if report.dropped_candidates > 0 {
            debug!(
                dropped = report.dropped_candidates,
                capacity = self.capacity,
                "candidate pool full"
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(x: f32, y: f32, class: LandmarkClass) -> DetectedLandmark {
        DetectedLandmark {
            position: Point2::new(x, y),
            class,
        }
    }

    fn config(threshold: u32) -> PerceptionConfig {
        PerceptionConfig {
            confirmation_threshold: threshold,
            ..PerceptionConfig::default()
        }
    }

    #[test]
    fn count_grows_by_one_per_cycle_until_single_promotion() {
        let mut fusion = LandmarkFusion::new(&config(10));
        let mut map = TrackMap::new(3000);
        let seen = [detection(1.0, 1.0, LandmarkClass::Yellow)];

        for cycle in 1..=15u32 {
            let report = fusion.fuse(&seen, &mut map);
            let count = fusion.candidates()[0].count;
            assert_eq!(count, cycle.min(10));
            assert_eq!(report.promoted, usize::from(cycle == 10));
            assert_eq!(map.len(), usize::from(cycle >= 10));
        }
        assert_eq!(fusion.candidates().len(), 1);
    }

    #[test]
    fn position_is_running_average() {
        let mut fusion = LandmarkFusion::new(&config(10));
        let mut map = TrackMap::new(10);
        fusion.fuse(&[detection(1.00, 0.0, LandmarkClass::Blue)], &mut map);
        fusion.fuse(&[detection(1.02, 0.0, LandmarkClass::Blue)], &mut map);
        fusion.fuse(&[detection(1.04, 0.0, LandmarkClass::Blue)], &mut map);
        let c = fusion.candidates()[0];
        assert_eq!(c.count, 3);
        assert!((c.position.x - 1.02).abs() < 1e-5);
    }

    #[test]
    fn match_requires_same_class_and_three_radii() {
        let mut fusion = LandmarkFusion::new(&config(10));
        let mut map = TrackMap::new(10);
        fusion.fuse(&[detection(0.0, 0.0, LandmarkClass::Yellow)], &mut map);
        // Same place, other class.
        let r = fusion.fuse(&[detection(0.0, 0.0, LandmarkClass::Blue)], &mut map);
        assert_eq!(r.opened, 1);
        // Same class, 0.14 m away: within 0.15.
        let r = fusion.fuse(&[detection(0.14, 0.0, LandmarkClass::Yellow)], &mut map);
        assert_eq!(r.matched, 1);
        // Same class, 0.5 m away.
        let r = fusion.fuse(&[detection(0.5, 0.0, LandmarkClass::Yellow)], &mut map);
        assert_eq!(r.opened, 1);
        assert_eq!(fusion.candidates().len(), 3);
    }

    #[test]
    fn confirmed_candidates_are_frozen() {
        let mut fusion = LandmarkFusion::new(&config(2));
        let mut map = TrackMap::new(10);
        let first = [detection(0.0, 0.0, LandmarkClass::Yellow)];
        fusion.fuse(&first, &mut map);
        fusion.fuse(&first, &mut map);
        let r = fusion.fuse(&[detection(0.1, 0.0, LandmarkClass::Yellow)], &mut map);
        assert_eq!(r.confirmed_hits, 1);
        assert_eq!(fusion.candidates()[0].position, Point2::new(0.0, 0.0));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn threshold_of_one_promotes_on_first_sight() {
        let mut fusion = LandmarkFusion::new(&config(1));
        let mut map = TrackMap::new(10);
        let r = fusion.fuse(&[detection(3.0, 3.0, LandmarkClass::Blue)], &mut map);
        assert_eq!((r.opened, r.promoted), (1, 1));
    }

    #[test]
    fn full_pool_drops_new_candidates() {
        let cfg = PerceptionConfig {
            candidate_capacity: 1,
            ..PerceptionConfig::default()
        };
        let mut fusion = LandmarkFusion::new(&cfg);
        let mut map = TrackMap::new(10);
        let r = fusion.fuse(
            &[
                detection(0.0, 0.0, LandmarkClass::Yellow),
                detection(5.0, 0.0, LandmarkClass::Yellow),
            ],
            &mut map,
        );
        assert_eq!((r.opened, r.dropped_candidates), (1, 1));
    }

    #[test]
    fn full_map_drops_promotions() {
        let mut fusion = LandmarkFusion::new(&config(1));
        let mut map = TrackMap::new(1);
        let r = fusion.fuse(
            &[
                detection(0.0, 0.0, LandmarkClass::Yellow),
                detection(5.0, 0.0, LandmarkClass::Blue),
            ],
            &mut map,
        );
        assert_eq!((r.promoted, r.dropped_landmarks), (1, 1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn snapshots_are_unaffected_by_later_appends() {
        let mut map = TrackMap::new(10);
        let landmark = Landmark {
            position: Point2::new(1.0, 2.0),
            class: LandmarkClass::Yellow,
        };
        map.push(landmark);
        let before = map.snapshot();
        map.push(landmark);
        assert_eq!(before.len(), 1);
        assert_eq!(map.len(), 2);
        // Earlier contents are a prefix of the current contents.
        assert_eq!(&map.landmarks()[..before.len()], before.as_slice());
    }
}
