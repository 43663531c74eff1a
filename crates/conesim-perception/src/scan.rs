//! Simulated rotating range sensor.
//!
//! Each of the `rays` directions is marched outward from the ignore distance
//! to the maximum range in fixed steps.  The first step whose point the
//! [`SurfaceClassifier`] reports as a landmark ends the march for that ray.
//!
//! Direction `i` points at `heading + i · 2π / rays`.
//!
//! A hit found at step `k > 0` is narrowed by bisection between the free
//! point of step `k - 1` and the hit point, so the recorded distance is not
//! quantised to the step size.

use std::f32::consts::TAU;

use conesim_hal::SurfaceClassifier;
use conesim_types::{Pose, RangeSample, SurfaceHit};

use crate::config::PerceptionConfig;

/// Range-march parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeScanner {
    rays: usize,
    max_range: f32,
    ignore_distance: f32,
    step: f32,
    refine_iterations: u32,
}

impl RangeScanner {
    pub fn new(config: &PerceptionConfig) -> Self {
        Self {
            rays: config.rays,
            max_range: config.max_range,
            ignore_distance: config.ignore_distance,
            step: config.step,
            refine_iterations: config.refine_iterations,
        }
    }

    pub fn rays(&self) -> usize {
        self.rays
    }

    /// World-frame angle of direction `index`.
    pub fn ray_angle(&self, pose: Pose, index: usize) -> f32 {
        pose.heading_rad + index as f32 * TAU / self.rays as f32
    }

    /// Take one full scan from `pose`.  The result always holds exactly
    /// `rays` samples, in direction order.
    pub fn scan<S>(&self, surface: &S, pose: Pose) -> Vec<RangeSample>
    where
        S: SurfaceClassifier + ?Sized,
    {
        (0..self.rays)
            .map(|i| self.march(surface, pose, self.ray_angle(pose, i)))
            .collect()
    }

    fn march<S>(&self, surface: &S, pose: Pose, angle: f32) -> RangeSample
    where
        S: SurfaceClassifier + ?Sized,
    {
        // Distances are recomputed from the step index so rounding does not
        // accumulate along the ray.
        let steps = ((self.max_range - self.ignore_distance) / self.step).floor() as usize;
        for k in 0..=steps {
            let distance = self.ignore_distance + k as f32 * self.step;
            let point = pose.position.offset(angle, distance);
            if let Some(class) = surface.classify(point) {
                let hit = SurfaceHit { class, point };
                if k == 0 {
                    return RangeSample {
                        distance,
                        hit: Some(hit),
                    };
                }
                return self.refine(surface, pose, angle, distance - self.step, distance, hit);
            }
        }
        RangeSample::miss(self.max_range)
    }

    /// Bisect between the free distance `free` and the hit distance `hit_at`.
    fn refine<S>(
        &self,
        surface: &S,
        pose: Pose,
        angle: f32,
        mut free: f32,
        mut hit_at: f32,
        mut hit: SurfaceHit,
    ) -> RangeSample
    where
        S: SurfaceClassifier + ?Sized,
    {
        for _ in 0..self.refine_iterations {
            let mid = 0.5 * (free + hit_at);
            let point = pose.position.offset(angle, mid);
            match surface.classify(point) {
                Some(class) => {
                    hit_at = mid;
                    hit = SurfaceHit { class, point };
                }
                None => free = mid,
            }
        }
        RangeSample {
            distance: hit_at,
            hit: Some(hit),
        }
    }
}
