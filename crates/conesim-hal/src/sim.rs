//! In-process track builder for tests and the demo run.
//!
//! [`SimTrack`] assembles a [`TrackStore`] without a track file, so the full
//! conesim pipeline can run headless.
//!
//! # Example
//!
//! ```rust
//! use conesim_hal::sim::SimTrack;
//! use conesim_hal::SurfaceClassifier;
//! use conesim_types::{LandmarkClass, Point2};
//!
//! let track = SimTrack::new()
//!     .with_cone(2.0, 0.0, LandmarkClass::Blue)
//!     .build();
//!
//! assert_eq!(track.classify(Point2::new(2.0, 0.0)), Some(LandmarkClass::Blue));
//! ```

use conesim_types::LandmarkClass;

use crate::track::{Cone, TrackStore};

/// Default cone radius (metres).
pub const DEFAULT_CONE_RADIUS: f32 = 0.05;

/// Builder that constructs a [`TrackStore`] in memory.
#[derive(Debug, Clone)]
pub struct SimTrack {
    cones: Vec<Cone>,
    radius: f32,
}

impl Default for SimTrack {
    fn default() -> Self {
        Self {
            cones: Vec::new(),
            radius: DEFAULT_CONE_RADIUS,
        }
    }
}

impl SimTrack {
    /// Create an empty builder using [`DEFAULT_CONE_RADIUS`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `radius` for every cone.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Add one cone.
    pub fn with_cone(mut self, x: f32, y: f32, class: LandmarkClass) -> Self {
        self.cones.push(Cone::new(x, y, class));
        self
    }

    /// Add the demo straight: a yellow border at y = 4 and a blue border at
    /// y = 2, one cone per metre from x = 1 to x = 9.  The default vehicle
    /// pose (4.5, 3.0) sits on the centre line.
    pub fn with_demo_layout(mut self) -> Self {
        for i in 1..=9 {
            let x = i as f32;
            self.cones.push(Cone::new(x, 4.0, LandmarkClass::Yellow));
            self.cones.push(Cone::new(x, 2.0, LandmarkClass::Blue));
        }
        self
    }

    /// Consume the builder and return the track.
    pub fn build(self) -> TrackStore {
        TrackStore::new(self.cones, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SurfaceClassifier;
    use conesim_types::Point2;

    #[test]
    fn demo_layout_has_two_borders() {
        let track = SimTrack::new().with_demo_layout().build();
        assert_eq!(track.len(), 18);
        let yellow = track
            .cones()
            .iter()
            .filter(|c| c.class == LandmarkClass::Yellow)
            .count();
        assert_eq!(yellow, 9);
        assert_eq!(track.classify(Point2::new(4.5, 3.0)), None);
    }

    #[test]
    fn custom_radius_is_applied() {
        let track = SimTrack::new()
            .with_radius(0.2)
            .with_cone(0.0, 0.0, LandmarkClass::Yellow)
            .build();
        assert_eq!(track.radius(), 0.2);
        assert_eq!(
            track.classify(Point2::new(0.15, 0.0)),
            Some(LandmarkClass::Yellow)
        );
    }
}
