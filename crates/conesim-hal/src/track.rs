//! [`TrackStore`] – static ground-truth surface.
//!
//! The track is a set of circular cones of one common radius.  It is loaded
//! once at startup and never mutated afterwards, so it can be shared between
//! tasks behind an `Arc` without locking.
//!
//! # Track file format
//!
//! ```toml
//! [[cones]]
//! x = 1.0
//! y = 4.0
//! class = "yellow"
//!
//! [[cones]]
//! x = 1.0
//! y = 2.0
//! class = "blue"
//! ```
//!
//! Coordinates are metres in the world frame.

use std::fs;
use std::path::Path;

use conesim_types::{LandmarkClass, Point2, SimError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::surface::SurfaceClassifier;

/// Maximum number of cones a track may hold.  Further entries in a track
/// file are dropped with a warning.
pub const MAX_TRACK_CONES: usize = 3000;

/// One ground-truth cone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cone {
    pub x: f32,
    pub y: f32,
    pub class: LandmarkClass,
}

impl Cone {
    pub const fn new(x: f32, y: f32, class: LandmarkClass) -> Self {
        Self { x, y, class }
    }

    pub fn center(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TrackFile {
    #[serde(default)]
    cones: Vec<Cone>,
}

/// Immutable cone layout answering surface queries.
#[derive(Debug, Clone)]
pub struct TrackStore {
    cones: Vec<Cone>,
    radius: f32,
}

impl TrackStore {
    /// Build a track from `cones`, keeping at most [`MAX_TRACK_CONES`].
    pub fn new(mut cones: Vec<Cone>, radius: f32) -> Self {
        if cones.len() > MAX_TRACK_CONES {
            warn!(
                dropped = cones.len() - MAX_TRACK_CONES,
                capacity = MAX_TRACK_CONES,
                "track capacity exceeded; extra cones dropped"
            );
            cones.truncate(MAX_TRACK_CONES);
        }
        Self { cones, radius }
    }

    /// Parse a TOML track description.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Track`] when the text is not a valid track file.
    pub fn from_toml_str(text: &str, radius: f32) -> Result<Self, SimError> {
        let file: TrackFile =
            toml::from_str(text).map_err(|e| SimError::Track(e.to_string()))?;
        Ok(Self::new(file.cones, radius))
    }

    /// Load a track file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Track`] when the file cannot be read or parsed.
    pub fn load(path: &Path, radius: f32) -> Result<Self, SimError> {
        let text = fs::read_to_string(path)
            .map_err(|e| SimError::Track(format!("{}: {e}", path.display())))?;
        let track = Self::from_toml_str(&text, radius)?;
        info!(path = %path.display(), cones = track.len(), "track loaded");
        Ok(track)
    }

    /// Serialise the track back to TOML.
    pub fn to_toml_string(&self) -> Result<String, SimError> {
        let file = TrackFile {
            cones: self.cones.clone(),
        };
        toml::to_string(&file).map_err(|e| SimError::Serialization(e.to_string()))
    }

    /// Write the track to `path` in the track file format.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Track`] when the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SimError> {
        let text = self.to_toml_string()?;
        fs::write(path, text).map_err(|e| SimError::Track(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), cones = self.len(), "track saved");
        Ok(())
    }

    pub fn cones(&self) -> &[Cone] {
        &self.cones
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.cones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cones.is_empty()
    }
}

impl SurfaceClassifier for TrackStore {
    /// A point is on a cone when it lies inside (or on) the cone's disc.
    fn classify(&self, point: Point2) -> Option<LandmarkClass> {
        self.cones
            .iter()
            .find(|cone| cone.center().distance(point) <= self.radius)
            .map(|cone| cone.class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TRACK: &str = r#"
[[cones]]
x = 1.0
y = 4.0
class = "yellow"

[[cones]]
x = 1.0
y = 2.0
class = "blue"
"#;

    #[test]
    fn parses_cones_from_toml() {
        let track = TrackStore::from_toml_str(TRACK, 0.05).unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!(track.cones()[0], Cone::new(1.0, 4.0, LandmarkClass::Yellow));
        assert_eq!(track.cones()[1].class, LandmarkClass::Blue);
    }

    #[test]
    fn classify_uses_disc_containment() {
        let track = TrackStore::from_toml_str(TRACK, 0.05).unwrap();
        assert_eq!(
            track.classify(Point2::new(1.04, 4.0)),
            Some(LandmarkClass::Yellow)
        );
        assert_eq!(
            track.classify(Point2::new(1.0, 1.96)),
            Some(LandmarkClass::Blue)
        );
        assert_eq!(track.classify(Point2::new(1.06, 4.0)), None);
        assert_eq!(track.classify(Point2::new(0.0, 0.0)), None);
    }

    #[test]
    fn empty_file_is_an_empty_track() {
        let track = TrackStore::from_toml_str("", 0.05).unwrap();
        assert!(track.is_empty());
    }

    #[test]
    fn bad_class_is_a_track_error() {
        let text = "[[cones]]\nx = 0.0\ny = 0.0\nclass = \"orange\"\n";
        let err = TrackStore::from_toml_str(text, 0.05).unwrap_err();
        assert!(matches!(err, SimError::Track(_)));
    }

    #[test]
    fn capacity_drops_extra_cones() {
        let cones = (0..MAX_TRACK_CONES + 5)
            .map(|i| Cone::new(i as f32, 0.0, LandmarkClass::Blue))
            .collect();
        let track = TrackStore::new(cones, 0.05);
        assert_eq!(track.len(), MAX_TRACK_CONES);
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TRACK.as_bytes()).unwrap();
        let track = TrackStore::load(file.path(), 0.05).unwrap();
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn load_missing_file_is_a_track_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrackStore::load(&dir.path().join("absent.toml"), 0.05).unwrap_err();
        assert!(matches!(err, SimError::Track(_)));
    }

    #[test]
    fn saved_track_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.toml");
        let track = crate::sim::SimTrack::new().with_demo_layout().build();
        track.save(&path).unwrap();

        let back = TrackStore::load(&path, 0.05).unwrap();
        assert_eq!(back.cones(), track.cones());
    }

    #[test]
    fn save_into_missing_directory_is_a_track_error() {
        let dir = tempfile::tempdir().unwrap();
        let track = TrackStore::from_toml_str(TRACK, 0.05).unwrap();
        let err = track.save(&dir.path().join("no-such-dir").join("t.toml")).unwrap_err();
        assert!(matches!(err, SimError::Track(_)));
    }

    #[test]
    fn toml_output_reloads() {
        let track = TrackStore::from_toml_str(TRACK, 0.05).unwrap();
        let text = track.to_toml_string().unwrap();
        let back = TrackStore::from_toml_str(&text, 0.05).unwrap();
        assert_eq!(back.cones(), track.cones());
    }
}
