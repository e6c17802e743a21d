//! Core data models for voyage planning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RouteError;

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Reject positions outside [-90, 90] x [-180, 180] (and NaN).
    pub fn validate(&self) -> Result<(), RouteError> {
        if (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon) {
            Ok(())
        } else {
            Err(RouteError::InvalidCoordinate {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }

    /// Planar `(x, y)` view used by the polygon predicates.
    pub(crate) fn xy(&self) -> (f64, f64) {
        (self.lon, self.lat)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

/// A candidate waypoint produced by the water grid generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridPoint {
    /// Position in the filtered grid (row-major).
    pub index: usize,
    pub coord: Coordinate,
}

/// Navigational status reported on each trajectory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavStatus {
    Underway,
    #[serde(rename = "Dynamic Positioning")]
    DynamicPositioning,
}

impl NavStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavStatus::Underway => "Underway",
            NavStatus::DynamicPositioning => "Dynamic Positioning",
        }
    }
}

/// One per-minute sample of a vessel trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRecord {
    #[serde(with = "timestamp_z")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "vessel_name")]
    pub vessel: String,
    #[serde(rename = "voyage_phase")]
    pub phase: String,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_knots: f64,
    #[serde(default)]
    pub course_deg: Option<f64>,
    #[serde(default)]
    pub heading_deg: Option<f64>,
    pub nav_status: NavStatus,
}

impl TrajectoryRecord {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Aggregate metrics for a generated trajectory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoyageMetrics {
    pub total_distance_nm: f64,
    pub speed_knots: f64,
    pub departure: DateTime<Utc>,
    pub eta: DateTime<Utc>,
}

/// Records plus the metrics describing them.
#[derive(Debug, Clone, Serialize)]
pub struct Trajectory {
    pub records: Vec<TrajectoryRecord>,
    pub metrics: VoyageMetrics,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// ISO-8601 timestamps with second precision and a trailing `Z`.
pub mod timestamp_z {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn validate_rejects_out_of_range() {
        assert!(Coordinate::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinate::new(-90.0, -180.0).validate().is_ok());
        assert_eq!(
            Coordinate::new(91.0, 0.0).validate(),
            Err(RouteError::InvalidCoordinate { lat: 91.0, lon: 0.0 })
        );
        assert!(Coordinate::new(0.0, -180.5).validate().is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn timestamps_format_with_trailing_z() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 6, 0, 0).unwrap();
        assert_eq!(timestamp_z::format(&ts), "2025-01-01T06:00:00Z");
    }

    #[test]
    fn round_to_decimals() {
        assert_eq!(round_to(18.9385071, 5), 18.93851);
        assert_eq!(round_to(9.999, 2), 10.0);
    }
}
