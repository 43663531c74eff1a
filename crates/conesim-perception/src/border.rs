//! Border clustering.
//!
//! A single forward pass groups angularly adjacent hits believed to lie on
//! the visible edge of one landmark.  A hit joins the most recent border of
//! its class when it lies within `2 · radius` of that border's last point;
//! otherwise it opens a new border.  The pass is order-sensitive: it relies
//! on the hits of one landmark arriving in scan order.
//!
//! Both the number of borders and the points per border are bounded.
//! Overflowing items are dropped and counted, never reported as errors.

use conesim_types::{LandmarkClass, Point2, RangeSample};
use tracing::debug;

use crate::config::PerceptionConfig;

/// Hits sharing one landmark edge, in scan order.
#[derive(Debug, Clone, PartialEq)]
pub struct Border {
    pub class: LandmarkClass,
    /// Scan-direction indices of the member samples.
    pub indices: Vec<usize>,
    /// Hit points of the member samples (parallel to `indices`).
    pub points: Vec<Point2>,
}

impl Border {
    fn open(class: LandmarkClass, index: usize, point: Point2, capacity: usize) -> Self {
        let mut indices = Vec::with_capacity(capacity.min(16));
        let mut points = Vec::with_capacity(capacity.min(16));
        indices.push(index);
        points.push(point);
        Self {
            class,
            indices,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn last_point(&self) -> Option<Point2> {
        self.points.last().copied()
    }
}

/// Result of one clustering pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BorderSet {
    pub borders: Vec<Border>,
    /// Hits that matched a full border.
    pub dropped_points: usize,
    /// Hits that needed a new border while the table was full.
    pub dropped_borders: usize,
}

/// Groups detected samples into [`Border`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderClusterer {
    join_distance: f32,
    max_points: usize,
    max_borders: usize,
}

impl BorderClusterer {
    pub fn new(config: &PerceptionConfig) -> Self {
        Self {
            join_distance: config.border_join_distance(),
            max_points: config.max_points_per_border,
            max_borders: config.max_borders,
        }
    }

    pub fn cluster(&self, samples: &[RangeSample]) -> BorderSet {
        let mut set = BorderSet::default();

        for (index, sample) in samples.iter().enumerate() {
            let Some(hit) = sample.hit else { continue };

            let open = set.borders.len();
            let joined = set
                .borders
                .iter_mut()
                .rev()
                .find(|b| b.class == hit.class)
                .filter(|b| {
                    b.last_point()
                        .is_some_and(|last| last.distance(hit.point) <= self.join_distance)
                });

            match joined {
                Some(border) if border.len() < self.max_points => {
                    border.indices.push(index);
                    border.points.push(hit.point);
                }
                Some(_) => set.dropped_points += 1,
                None if open < self.max_borders => {
                    set.borders
                        .push(Border::open(hit.class, index, hit.point, self.max_points));
                }
                None => set.dropped_borders += 1,
            }
        }

        if set.dropped_points > 0 || set.dropped_borders > 0 {
            debug!(
                dropped_points = set.dropped_points,
                dropped_borders = set.dropped_borders,
                "border capacity reached"
            );
        }
        set
    }
}
