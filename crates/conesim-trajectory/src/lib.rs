//! `conesim-trajectory` – from confirmed landmarks to an ordered path.
//!
//! Landmarks of one class mark one side of the track and landmarks of the
//! other class the opposite side, so the midpoint between a landmark and its
//! nearest opposite-class neighbour lies on the centre line.
//!
//! # Modules
//!
//! - [`builder`] – [`TrajectoryBuilder`][builder::TrajectoryBuilder]:
//!   pairing, midpoint emission and greedy path ordering, plus the stateless
//!   steps as free functions.

pub mod builder;

pub use builder::{TrajectoryBuilder, TrajectoryConfig, TrajectoryStats};
