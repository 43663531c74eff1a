//! `conesim` – headless cone-track perception and path-planning simulator.
//!
//! This binary:
//!
//! 1. Loads `conesim.toml` (first argument, `CONESIM_CONFIG`, or the working
//!    directory) and applies `CONESIM_*` overrides.
//! 2. Loads the track file, or falls back to the built-in demo straight.
//! 3. Starts the perception and trajectory periodic tasks.
//! 4. Prints a one-line status every second until Ctrl-C (or `run_seconds`).
//! 5. Stops both tasks, prints the run summary and optionally dumps the JSON
//!    run report.
//!
//! Usage:
//!
//! ```text
//! conesim [CONFIG]                    run the simulator
//! conesim init [CONFIG]               write a default config file
//! conesim export-track OUT [CONFIG]   write the configured track as TOML
//! ```

mod config;

use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use conesim_hal::{PoseSource, SharedPose, SimTrack, SurfaceClassifier, TrackStore};
use conesim_kernel::StopFlag;
use conesim_runtime::telemetry::init_tracing;
use conesim_runtime::{Pipeline, RunReport};
use conesim_types::SimError;

const STATUS_INTERVAL: Duration = Duration::from_secs(1);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn main() -> ExitCode {
    let _otel = init_tracing("conesim");

    print_banner();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let outcome = match args.first().map(String::as_str) {
        Some("init") => init(args.get(1).map(String::as_str)),
        Some("export-track") => match args.get(1) {
            Some(out) => export_track(Path::new(out), args.get(2).map(String::as_str)),
            None => Err(SimError::Config("usage: conesim export-track OUT [CONFIG]".to_string())),
        },
        other => run(other),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "conesim failed");
            println!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init(arg: Option<&str>) -> Result<(), SimError> {
    let path = config::resolve_path(arg);
    if config::init_at(&path)? {
        println!("  Default config written to {}", path.display().to_string().bold());
    } else {
        println!(
            "  {} already exists; {}",
            path.display().to_string().bold(),
            "left untouched".yellow()
        );
    }
    Ok(())
}

fn export_track(out: &Path, arg: Option<&str>) -> Result<(), SimError> {
    let cfg = config::load_from(&config::resolve_path(arg))?;
    let track = load_track(&cfg)?;
    track.save(out)?;
    println!("  {} cones written to {}", track.len(), out.display().to_string().bold());
    Ok(())
}

/// The configured track file, or the demo straight when none is set.
fn load_track(cfg: &config::Config) -> Result<TrackStore, SimError> {
    let radius = cfg.pipeline.perception.landmark_radius;
    let track = match &cfg.track_path {
        Some(p) => {
            let track = TrackStore::load(p, radius)?;
            println!("  Track {} ({} cones)", p.display().to_string().bold(), track.len());
            track
        }
        None => {
            let track = SimTrack::new().with_radius(radius).with_demo_layout().build();
            println!("  Track {} ({} cones)", "demo straight".bold(), track.len());
            track
        }
    };
    Ok(track)
}

fn run(arg: Option<&str>) -> Result<(), SimError> {
    let path = config::resolve_path(arg);
    let cfg = config::load_from(&path)?;
    if path.exists() {
        println!("  Config loaded from {}", path.display().to_string().bold());
    } else {
        println!(
            "  No config at {}; {}",
            path.display().to_string().bold(),
            "using defaults".dimmed()
        );
    }

    let track = load_track(&cfg)?;

    let start_pose = cfg.vehicle.pose();
    println!(
        "  Vehicle at ({:.2}, {:.2}) heading {:.1}°",
        start_pose.position.x, start_pose.position.y, cfg.vehicle.heading_deg
    );

    let stop = StopFlag::new();
    let stop_ctrlc = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping tasks …".yellow().bold());
        stop_ctrlc.raise();
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; use run_seconds to bound the run");
    }

    let surface: Arc<dyn SurfaceClassifier> = Arc::new(track);
    let pose: Arc<dyn PoseSource> = Arc::new(SharedPose::new(start_pose));
    let pipeline = Pipeline::start(cfg.pipeline.clone(), surface, pose, stop.clone())?;
    println!("  {}", "Pipeline running.".green());
    println!();

    let limit = cfg.run_seconds.map(Duration::from_secs);
    let started = Instant::now();
    let mut last_status = Instant::now();
    let outputs = pipeline.outputs();
    while !stop.is_raised() {
        if limit.is_some_and(|l| started.elapsed() >= l) {
            info!("run time limit reached");
            break;
        }
        if last_status.elapsed() >= STATUS_INTERVAL {
            last_status = Instant::now();
            let perception = outputs.perception_stats.load();
            println!(
                "  [{:>5.1}s] cycles {:>5}  detections {:>3}  candidates {:>5}  map {:>4}  path {:>4}",
                started.elapsed().as_secs_f32(),
                perception.cycles,
                perception.last_detections,
                perception.candidates,
                perception.map_size,
                outputs.path.load().len(),
            );
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    let report = pipeline.shutdown()?;
    print_summary(&report);

    if let Some(dump) = &cfg.dump_path {
        report.write_json(dump)?;
        println!("  Report written to {}", dump.display().to_string().bold());
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"  ___ ___  _ __   ___  ___(_)_ __ ___  "#.bold().cyan());
    println!("{}", r#" / __/ _ \| '_ \ / _ \/ __| | '_ ` _ \ "#.bold().cyan());
    println!("{}", r#"| (_| (_) | | | |  __/\__ \ | | | | | |"#.bold().cyan());
    println!("{}", r#" \___\___/|_| |_|\___||___/_|_| |_| |_|"#.bold().cyan());
    println!();
    println!("  {} {}",
        "conesim".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Cone-track perception and path planning");
    println!();
}

fn print_summary(report: &RunReport) {
    println!();
    println!("{}", "Run summary".bold().underline());
    println!(
        "  Elapsed        {:.2}s",
        report.elapsed().num_milliseconds() as f64 / 1000.0
    );
    for task in &report.tasks {
        let misses = if task.stats.deadline_misses == 0 {
            "0".green()
        } else {
            task.stats.deadline_misses.to_string().red()
        };
        println!(
            "  {:<14} {} cycles, {} deadline misses, worst {:.2} ms (period {} ms)",
            task.name,
            task.stats.cycles,
            misses,
            task.stats.worst_exec.as_secs_f64() * 1000.0,
            task.params.period_ms,
        );
    }
    println!(
        "  Detections     {} total, {} degenerate",
        report.perception.total_detections,
        report.perception.degenerate_too_few_points + report.perception.degenerate_missing_minima,
    );
    println!("  Map            {} landmarks", report.map.len());
    println!("  Path           {} waypoints", report.path.len());
    for wp in report.path.iter().take(5) {
        println!("    ({:.3}, {:.3})", wp.x, wp.y);
    }
    if report.path.len() > 5 {
        println!("    {}", format!("… {} more", report.path.len() - 5).dimmed());
    }
    println!();
}
