//! `conesim-runtime` – task wiring and process plumbing.
//!
//! # Modules
//!
//! - [`pipeline`] – [`Pipeline`][pipeline::Pipeline]: creates the perception
//!   and trajectory periodic tasks, connects them through the hand-off and
//!   publishes their outputs as snapshots.
//! - [`report`] – [`RunReport`][report::RunReport]: per-task timing
//!   counters, perception/trajectory counters and the final map and path,
//!   serialisable to JSON.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: global
//!   `tracing` subscriber with an optional OTLP span exporter.

pub mod pipeline;
pub mod report;
pub mod telemetry;

pub use pipeline::{Pipeline, PipelineConfig, SharedOutputs};
pub use report::{RunReport, TaskReport};
