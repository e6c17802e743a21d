//! Planner configuration with environment overrides.

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::GridSpec;

pub const DEFAULT_SPEED_KNOTS: f64 = 10.0;
/// Slower cruising speeds are treated as degenerate.
pub const MIN_SPEED_KNOTS: f64 = 0.1;
pub const DEFAULT_LAND_PATH: &str = "data/land.geojson";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Padding added around the start/end bounding box, in degrees.
    pub padding_deg: f64,
    pub lat_step_deg: f64,
    pub lon_step_deg: f64,
    /// Upper bound on unfiltered grid candidates per leg.
    pub max_grid_points: usize,
    /// Substituted when a request carries a non-positive speed.
    pub default_speed_knots: f64,
    /// Upper bound on per-minute records in one trajectory.
    pub max_trajectory_records: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            padding_deg: 0.5,
            lat_step_deg: 0.05,
            lon_step_deg: 0.05,
            max_grid_points: 2_500,
            default_speed_knots: DEFAULT_SPEED_KNOTS,
            max_trajectory_records: 200_000,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            padding_deg: env_or("OSV_GRID_PADDING_DEG", defaults.padding_deg),
            lat_step_deg: env_or("OSV_GRID_LAT_STEP_DEG", defaults.lat_step_deg),
            lon_step_deg: env_or("OSV_GRID_LON_STEP_DEG", defaults.lon_step_deg),
            max_grid_points: env_or("OSV_MAX_GRID_POINTS", defaults.max_grid_points),
            default_speed_knots: env_or("OSV_DEFAULT_SPEED_KNOTS", defaults.default_speed_knots),
            max_trajectory_records: env_or(
                "OSV_MAX_TRAJECTORY_RECORDS",
                defaults.max_trajectory_records,
            ),
        }
    }

    pub fn grid(&self) -> GridSpec {
        GridSpec {
            padding_deg: self.padding_deg,
            lat_step_deg: self.lat_step_deg,
            lon_step_deg: self.lon_step_deg,
        }
    }
}

/// Path of the default land dataset (`OSV_LAND_PATH`).
pub fn land_path_from_env() -> String {
    env::var("OSV_LAND_PATH").unwrap_or_else(|_| DEFAULT_LAND_PATH.to_string())
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
