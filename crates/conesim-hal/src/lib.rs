//! `conesim-hal` – simulated sensor world.
//!
//! The collaborator seams the perception stage talks to, plus the static
//! track they are backed by in simulation.
//!
//! # Modules
//!
//! - [`surface`] – [`SurfaceClassifier`][surface::SurfaceClassifier]: world
//!   point → landmark class, queried once per range-march step.
//! - [`pose`] – [`PoseSource`][pose::PoseSource] and the lock-protected
//!   [`SharedPose`][pose::SharedPose] owned by the vehicle side.
//! - [`track`] – [`TrackStore`][track::TrackStore]: the ground-truth cone
//!   layout, loaded once at startup from a TOML track file.
//! - [`sim`] – [`SimTrack`][sim::SimTrack]: builder for in-process tracks
//!   used by tests and the demo run.

pub mod pose;
pub mod sim;
pub mod surface;
pub mod track;

pub use pose::{PoseSource, SharedPose};
pub use sim::SimTrack;
pub use surface::SurfaceClassifier;
pub use track::{Cone, TrackStore};
