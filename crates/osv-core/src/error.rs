//! Error types for route planning, land data loading and export.

use crate::models::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Search box padding and lattice spacing for one planning request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub padding_deg: f64,
    pub lat_step_deg: f64,
    pub lon_step_deg: f64,
}

impl std::fmt::Display for GridSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "padding {}°, step {}° lat x {}° lon",
            self.padding_deg, self.lat_step_deg, self.lon_step_deg
        )
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("invalid coordinate ({lat}, {lon}): latitude must be in [-90, 90] and longitude in [-180, 180]")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("invalid grid parameters: {reason}")]
    InvalidGrid { reason: String },

    #[error("route grid too large ({points} candidate points, limit {limit})")]
    GridTooLarge { points: usize, limit: usize },

    #[error(
        "no water path from {from} to {to} with {grid} ({nodes} nodes, {edges} edges); \
         retry with a finer grid or larger padding"
    )]
    NoPathFound {
        from: Coordinate,
        to: Coordinate,
        grid: GridSpec,
        nodes: usize,
        edges: usize,
    },

    #[error("route needs at least 2 points")]
    TooFewPoints,

    #[error("trajectory would need {records} records, limit {limit}")]
    TrajectoryTooLong { records: usize, limit: usize },

    #[error("trajectory departing {departure} runs past the representable time range")]
    TimeOutOfRange { departure: DateTime<Utc> },
}

#[derive(Debug, Error)]
pub enum LandDataError {
    #[error("failed to read land data: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse land data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid polygon in feature {feature}: {reason}")]
    InvalidPolygon { feature: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
