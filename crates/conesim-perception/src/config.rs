//! Tunables of the perception stage.

use conesim_types::SimError;
use serde::{Deserialize, Serialize};

/// Sensor, clustering, recovery and fusion parameters.
///
/// Every field has a default, so a partial `[perception]` table in the
/// configuration file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Number of scan directions per revolution.
    pub rays: usize,
    /// Sensor range (m).
    pub max_range: f32,
    /// Distance marched before the first surface query (m).
    pub ignore_distance: f32,
    /// Range-march step (m).
    pub step: f32,
    /// Bisection passes narrowing each hit between the last free step and
    /// the first hit step (0 keeps the plain step resolution).
    pub refine_iterations: u32,
    /// Radius of every landmark (m).
    pub landmark_radius: f32,
    pub max_points_per_border: usize,
    pub max_borders: usize,
    /// Clustering distance for circle-center votes (m).
    pub cluster_epsilon: f32,
    /// Half-width of the local-minimum window (degrees).
    pub minima_window_deg: usize,
    pub candidate_capacity: usize,
    pub map_capacity: usize,
    /// Observations needed before a candidate enters the track map.
    pub confirmation_threshold: u32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            rays: 360,
            max_range: 10.0,
            ignore_distance: 0.2,
            step: 0.01,
            refine_iterations: 8,
            landmark_radius: 0.05,
            max_points_per_border: 180,
            max_borders: 360,
            cluster_epsilon: 0.01,
            minima_window_deg: 15,
            candidate_capacity: 100_000,
            map_capacity: 3000,
            confirmation_threshold: 10,
        }
    }
}

impl PerceptionConfig {
    /// Distance within which a hit joins the previous border point.
    pub fn border_join_distance(&self) -> f32 {
        2.0 * self.landmark_radius
    }

    /// Distance within which a detection matches a candidate.
    pub fn match_distance(&self) -> f32 {
        3.0 * self.landmark_radius
    }

    /// Reject parameter sets the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), SimError> {
        let fail = |msg: &str| Err(SimError::Config(format!("perception: {msg}")));
        if self.rays == 0 {
            return fail("rays must be positive");
        }
        if !(self.step > 0.0) {
            return fail("step must be positive");
        }
        if !(self.landmark_radius > 0.0) {
            return fail("landmark_radius must be positive");
        }
        if !(self.ignore_distance >= 0.0 && self.max_range > self.ignore_distance) {
            return fail("max_range must exceed ignore_distance");
        }
        if !(self.cluster_epsilon > 0.0) {
            return fail("cluster_epsilon must be positive");
        }
        if self.minima_window_deg >= 180 {
            return fail("minima_window_deg must be below 180");
        }
        if self.confirmation_threshold == 0 {
            return fail("confirmation_threshold must be at least 1");
        }
        if self.max_points_per_border == 0 || self.max_borders == 0 {
            return fail("border capacities must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = PerceptionConfig::default();
        cfg.validate().unwrap();
        assert!((cfg.border_join_distance() - 0.1).abs() < 1e-6);
        assert!((cfg.match_distance() - 0.15).abs() < 1e-6);
    }

    #[test]
    fn partial_table_keeps_defaults() {
        let cfg: PerceptionConfig = serde_json::from_str(r#"{"rays": 720}"#).unwrap();
        assert_eq!(cfg.rays, 720);
        assert_eq!(cfg.confirmation_threshold, 10);
    }

    #[test]
    fn zero_step_is_rejected() {
        let cfg = PerceptionConfig {
            step: 0.0,
            ..PerceptionConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(SimError::Config(_))));
    }

    #[test]
    fn range_must_exceed_ignore_distance() {
        let cfg = PerceptionConfig {
            max_range: 0.1,
            ..PerceptionConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
