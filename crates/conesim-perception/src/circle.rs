//! Circle-center recovery.
//!
//! Every hit on a border lies on the landmark's circle, so the landmark
//! center lies on the circle of the same radius drawn around each hit.  The
//! estimator samples that circle at one candidate per degree (the "ring" of a
//! point) and, for each point after the first, measures how close every
//! candidate gets to the previous point's ring:
//!
//! ```text
//! curve[k] = min over q in ring(p[j-1]) of |ring(p[j])[k] - q|
//! ```
//!
//! The two circles intersect at the true center and at its mirror across the
//! chord `p[j-1] p[j]`, so the curve has two minima.  Both minima positions
//! are pooled over all points; the mirrors move along the border while the
//! center stays put, so the largest proximity cluster of the pool sits on the
//! center.
//!
//! The reference is only the previous point's ring, not the union of every
//! ring seen so far.  Against a union, each earlier pair of circles adds its
//! own intersections to the curve, and the first two minima stop being the
//! center and its mirror.
//!
//! A border with fewer than three points, or any curve with fewer than two
//! minima, yields no estimate this cycle.

use std::f32::consts::PI;

use conesim_types::Point2;

use crate::config::PerceptionConfig;

/// Number of candidate positions per ring (one per degree).
pub const RING_SIZE: usize = 360;

/// Minimum number of border points for an estimate.
pub const MIN_BORDER_POINTS: usize = 3;

/// Why a border produced no estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degenerate {
    /// Fewer than [`MIN_BORDER_POINTS`] points.
    TooFewPoints,
    /// A distance curve had fewer than two local minima.
    MissingMinima,
}

/// Recovers landmark centers from border points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleEstimator {
    radius: f32,
    epsilon: f32,
    window: usize,
}

impl CircleEstimator {
    pub fn new(config: &PerceptionConfig) -> Self {
        Self {
            radius: config.landmark_radius,
            epsilon: config.cluster_epsilon,
            window: config.minima_window_deg,
        }
    }

    /// Estimate the center of the circle the `points` lie on.
    pub fn estimate(&self, points: &[Point2]) -> Result<Point2, Degenerate> {
        if points.len() < MIN_BORDER_POINTS {
            return Err(Degenerate::TooFewPoints);
        }

        let mut votes = Vec::with_capacity(2 * (points.len() - 1));
        let mut previous = candidate_ring(points[0], self.radius);

        for &point in &points[1..] {
            let ring = candidate_ring(point, self.radius);
            let curve = min_distance_curve(&ring, &previous);
            match local_minima(&curve, self.window).as_slice() {
                &[first, second, ..] => {
                    votes.push(ring[first]);
                    votes.push(ring[second]);
                }
                _ => return Err(Degenerate::MissingMinima),
            }
            previous = ring;
        }

        largest_cluster_centroid(&votes, self.epsilon).ok_or(Degenerate::MissingMinima)
    }
}

/// The [`RING_SIZE`] candidate centers at `radius` around `point`; entry `k`
/// lies at `k` degrees.
pub fn candidate_ring(point: Point2, radius: f32) -> [Point2; RING_SIZE] {
    std::array::from_fn(|k| point.offset(k as f32 * PI / 180.0, radius))
}

/// For every candidate of `ring`, the squared distance to the nearest
/// candidate of `reference`.  Squared distances have the same minima and
/// skip the square roots.
pub fn min_distance_curve(ring: &[Point2], reference: &[Point2]) -> Vec<f32> {
    ring.iter()
        .map(|c| {
            reference
                .iter()
                .map(|q| {
                    let (dx, dy) = (c.x - q.x, c.y - q.y);
                    dx * dx + dy * dy
                })
                .fold(f32::INFINITY, f32::min)
        })
        .collect()
}

/// Indices of the local minima of the circular `curve`, ascending.
///
/// A minimum is where the discrete derivative turns from negative to
/// non-negative.  It must also be strictly below the `window` values before
/// it and no higher than the `window` values after it, which rejects ripple
/// from the one-degree sampling and reports a flat bottom once.
pub fn local_minima(curve: &[f32], window: usize) -> Vec<usize> {
    let n = curve.len();
    if n < 3 {
        return Vec::new();
    }
    let at = |i: usize, back: usize| curve[(i + n - back % n) % n];

    (0..n)
        .filter(|&k| {
            let value = curve[k];
            let falling = value - at(k, 1) < 0.0;
            let rising = curve[(k + 1) % n] - value >= 0.0;
            falling && rising
        })
        .filter(|&k| {
            let value = curve[k];
            (1..=window).all(|w| value < at(k, w) && value <= curve[(k + w) % n])
        })
        .collect()
}

/// Greedy proximity clustering: a point joins the first cluster whose seed
/// is within `epsilon`, otherwise seeds a new one.  Returns the centroid of
/// the most populated cluster (the earliest on ties).
pub fn largest_cluster_centroid(points: &[Point2], epsilon: f32) -> Option<Point2> {
    struct Cluster {
        seed: Point2,
        sum_x: f32,
        sum_y: f32,
        count: usize,
    }

    let mut clusters: Vec<Cluster> = Vec::new();
    for &p in points {
        match clusters.iter_mut().find(|c| c.seed.distance(p) <= epsilon) {
            Some(c) => {
                c.sum_x += p.x;
                c.sum_y += p.y;
                c.count += 1;
            }
            None => clusters.push(Cluster {
                seed: p,
                sum_x: p.x,
                sum_y: p.y,
                count: 1,
            }),
        }
    }

    let mut best: Option<&Cluster> = None;
    for c in &clusters {
        if best.is_none_or(|b| c.count > b.count) {
            best = Some(c);
        }
    }
    best.map(|c| {
        let n = c.count as f32;
        Point2::new(c.sum_x / n, c.sum_y / n)
    })
}
