//! Run configuration – reads/writes `conesim.toml`.
//!
//! Every field has a default, so a missing file or a partial file both yield
//! a usable configuration.  `CONESIM_*` environment variables are applied on
//! top of whatever was loaded.

use conesim_runtime::PipelineConfig;
use conesim_types::{Pose, SimError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "conesim.toml";

/// Starting pose of the simulated vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleConfig {
    #[serde(default = "default_vehicle_x")]
    pub x: f32,
    #[serde(default = "default_vehicle_y")]
    pub y: f32,
    /// Heading in degrees, counter-clockwise from +X.
    #[serde(default)]
    pub heading_deg: f32,
}

fn default_vehicle_x() -> f32 {
    4.5
}
fn default_vehicle_y() -> f32 {
    3.0
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            x: default_vehicle_x(),
            y: default_vehicle_y(),
            heading_deg: 0.0,
        }
    }
}

impl VehicleConfig {
    pub fn pose(&self) -> Pose {
        Pose::new(self.x, self.y, self.heading_deg.to_radians())
    }
}

/// Persisted run configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Track file (TOML list of cones).  The built-in demo straight is used
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_path: Option<PathBuf>,

    /// Stop on our own after this many seconds.  Runs until Ctrl-C when
    /// unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_seconds: Option<u64>,

    /// Where to write the JSON run report on exit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dump_path: Option<PathBuf>,

    #[serde(default)]
    pub vehicle: VehicleConfig,

    /// Task timing and stage tunables.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Pick the config file: explicit argument, then `CONESIM_CONFIG`, then
/// `./conesim.toml`.
pub fn resolve_path(arg: Option<&str>) -> PathBuf {
    if let Some(a) = arg {
        return PathBuf::from(a);
    }
    match std::env::var("CONESIM_CONFIG") {
        Ok(v) if !v.is_empty() => PathBuf::from(v),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

/// Load the config from `path` and apply environment overrides.  A missing
/// file yields the defaults.
pub fn load_from(path: &Path) -> Result<Config, SimError> {
    let mut cfg = if path.exists() {
        let raw = fs::read_to_string(path).map_err(|e| {
            SimError::Config(format!("failed to read config at {}: {}", path.display(), e))
        })?;
        toml::from_str(&raw)
            .map_err(|e| SimError::Config(format!("failed to parse {}: {}", path.display(), e)))?
    } else {
        Config::default()
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Apply `CONESIM_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `CONESIM_TRACK` | `track_path` |
/// | `CONESIM_RUN_SECONDS` | `run_seconds` |
/// | `CONESIM_DUMP` | `dump_path` |
/// | `CONESIM_PERCEPTION_PERIOD_MS` | `pipeline.perception_task.period_ms` |
/// | `CONESIM_TRAJECTORY_PERIOD_MS` | `pipeline.trajectory_task.period_ms` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("CONESIM_TRACK")
        && !v.is_empty() {
            cfg.track_path = Some(PathBuf::from(v));
        }
    if let Ok(v) = std::env::var("CONESIM_RUN_SECONDS")
        && let Ok(secs) = v.parse::<u64>() {
            cfg.run_seconds = Some(secs);
        }
    if let Ok(v) = std::env::var("CONESIM_DUMP")
        && !v.is_empty() {
            cfg.dump_path = Some(PathBuf::from(v));
        }
    if let Ok(v) = std::env::var("CONESIM_PERCEPTION_PERIOD_MS")
        && let Ok(ms) = v.parse::<u32>() {
            cfg.pipeline.perception_task.period_ms = ms;
        }
    if let Ok(v) = std::env::var("CONESIM_TRAJECTORY_PERIOD_MS")
        && let Ok(ms) = v.parse::<u32>() {
            cfg.pipeline.trajectory_task.period_ms = ms;
        }
}

/// Save the config to `path`, creating parent directories if necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), SimError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| SimError::Config(format!("failed to create config directory: {}", e)))?;
        }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| SimError::Serialization(format!("failed to serialize config: {}", e)))?;
    fs::write(path, raw)
        .map_err(|e| SimError::Config(format!("failed to write config at {}: {}", path.display(), e)))
}

/// Write the default configuration to `path` unless a file is already there.
/// Returns `false` when an existing file was left untouched.
pub fn init_at(path: &Path) -> Result<bool, SimError> {
    if path.exists() {
        return Ok(false);
    }
    save_to(&Config::default(), path)?;
    Ok(true)
}
