//! `conesim-types` – value types shared by every conesim crate.
//!
//! All positions are expressed in metres in the world frame; headings are in
//! radians, counter-clockwise from +X.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// A point in the 2-D world frame (metres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    /// Create a new point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point halfway between `self` and `other`.
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// The point at `distance` metres from `self` along direction
    /// `angle_rad`.
    pub fn offset(self, angle_rad: f32, distance: f32) -> Self {
        let (sin, cos) = angle_rad.sin_cos();
        Self::new(self.x + distance * cos, self.y + distance * sin)
    }
}

/// Vehicle pose: position of the sensor origin plus heading.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point2,
    /// Heading, counter-clockwise from +X (radians).
    pub heading_rad: f32,
}

impl Pose {
    pub const fn new(x: f32, y: f32, heading_rad: f32) -> Self {
        Self {
            position: Point2::new(x, y),
            heading_rad,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Landmarks
// ────────────────────────────────────────────────────────────────────────────

/// Detection class of a landmark. Track cones come in two colours that mark
/// the two sides of the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkClass {
    /// Class A (left-hand border).
    Yellow,
    /// Class B (right-hand border).
    Blue,
}

impl LandmarkClass {
    /// The class marking the other side of the track.
    pub fn opposite(self) -> Self {
        match self {
            LandmarkClass::Yellow => LandmarkClass::Blue,
            LandmarkClass::Blue => LandmarkClass::Yellow,
        }
    }
}

impl std::fmt::Display for LandmarkClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LandmarkClass::Yellow => write!(f, "yellow"),
            LandmarkClass::Blue => write!(f, "blue"),
        }
    }
}

/// Where a range ray first touched a landmark surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceHit {
    pub class: LandmarkClass,
    pub point: Point2,
}

/// One entry of the range scan: one per discrete scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSample {
    /// Measured distance, capped at the sensor's maximum range.
    pub distance: f32,
    /// `None` when the ray reached maximum range without touching anything.
    pub hit: Option<SurfaceHit>,
}

impl RangeSample {
    /// A sample that saw nothing up to `max_range`.
    pub const fn miss(max_range: f32) -> Self {
        Self {
            distance: max_range,
            hit: None,
        }
    }
}

/// A per-cycle landmark estimate produced by circle recovery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedLandmark {
    pub position: Point2,
    pub class: LandmarkClass,
}

/// A confirmed landmark stored in the persistent track map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub position: Point2,
    pub class: LandmarkClass,
}

/// A point of the planned path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f32,
    pub y: f32,
}

impl Waypoint {
    pub fn position(self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

impl From<Point2> for Waypoint {
    fn from(p: Point2) -> Self {
        Self { x: p.x, y: p.y }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Global error type. Only startup failures are reported through it; timing
/// violations, capacity drops and degenerate geometry are counted instead.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimError {
    #[error("Task {id} could not be started: {details}")]
    TaskSpawn { id: usize, details: String },

    #[error("Task {0} is already registered")]
    DuplicateTask(usize),

    #[error("Task {0} is not registered")]
    UnknownTask(usize),

    #[error("Task table full (max {0} tasks)")]
    TaskTableFull(usize),

    #[error("Task {0} panicked")]
    TaskPanicked(usize),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Track Load Error: {0}")]
    Track(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance_and_midpoint() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
        let m = a.midpoint(b);
        assert!((m.x - 1.5).abs() < 1e-6);
        assert!((m.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn point_offset_follows_angle() {
        let p = Point2::new(1.0, 1.0).offset(std::f32::consts::FRAC_PI_2, 2.0);
        assert!((p.x - 1.0).abs() < 1e-6);
        assert!((p.y - 3.0).abs() < 1e-6);
    }

    #[test]
    fn opposite_class_is_involution() {
        assert_eq!(LandmarkClass::Yellow.opposite(), LandmarkClass::Blue);
        assert_eq!(LandmarkClass::Blue.opposite().opposite(), LandmarkClass::Blue);
    }

    #[test]
    fn landmark_class_serializes_lowercase() {
        let json = serde_json::to_string(&LandmarkClass::Yellow).unwrap();
        assert_eq!(json, "\"yellow\"");
        let back: LandmarkClass = serde_json::from_str("\"blue\"").unwrap();
        assert_eq!(back, LandmarkClass::Blue);
    }

    #[test]
    fn miss_sample_has_no_hit() {
        let s = RangeSample::miss(10.0);
        assert!(s.hit.is_none());
        assert_eq!(s.distance, 10.0);
    }

    #[test]
    fn sim_error_display() {
        let err = SimError::TaskSpawn {
            id: 3,
            details: "resource temporarily unavailable".to_string(),
        };
        assert!(err.to_string().contains("Task 3"));
        assert!(SimError::Config("bad".into()).to_string().contains("Configuration"));
    }
}
