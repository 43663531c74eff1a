//! `conesim-perception` – from range hits to a persistent landmark map.
//!
//! # Modules
//!
//! - [`config`] – [`PerceptionConfig`][config::PerceptionConfig]: sensor,
//!   clustering and fusion tunables.
//! - [`scan`] – [`RangeScanner`][scan::RangeScanner]: simulated rotating
//!   range sensor marching rays against a surface classifier.
//! - [`border`] – [`BorderClusterer`][border::BorderClusterer]: groups
//!   angularly adjacent hits into landmark edges.
//! - [`circle`] – [`CircleEstimator`][circle::CircleEstimator]: recovers a
//!   landmark center from its edge points.
//! - [`fusion`] – [`LandmarkFusion`][fusion::LandmarkFusion] and the
//!   append-only [`TrackMap`][fusion::TrackMap].
//! - [`engine`] – [`PerceptionEngine`][engine::PerceptionEngine]: one full
//!   cycle, producing a [`PerceptionFrame`][engine::PerceptionFrame].

pub mod border;
pub mod circle;
pub mod config;
pub mod engine;
pub mod fusion;
pub mod scan;

pub use config::PerceptionConfig;
pub use engine::{PerceptionEngine, PerceptionFrame, PerceptionStats};
pub use fusion::{Candidate, FusionReport, TrackMap};
