//! Generic `SurfaceClassifier` trait for anything the range sensor can hit.
//!
//! The range scan only ever talks to this trait, so the ground-truth track
//! can be swapped for a synthetic surface in tests.

use std::sync::Arc;

use conesim_types::{LandmarkClass, Point2};

/// Answers "is there a landmark surface at this world point, and of which
/// class?".
pub trait SurfaceClassifier: Send + Sync {
    /// `None` when `point` is free space.
    fn classify(&self, point: Point2) -> Option<LandmarkClass>;
}

impl<S: SurfaceClassifier + ?Sized> SurfaceClassifier for Arc<S> {
    fn classify(&self, point: Point2) -> Option<LandmarkClass> {
        (**self).classify(point)
    }
}

impl<S: SurfaceClassifier + ?Sized> SurfaceClassifier for &S {
    fn classify(&self, point: Point2) -> Option<LandmarkClass> {
        (**self).classify(point)
    }
}
