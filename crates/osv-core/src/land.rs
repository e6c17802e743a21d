//! Land geometry and the predicates the planner routes around.
//!
//! Boundaries are inclusive: a point on a polygon edge is land, and a
//! segment that touches a polygon edge crosses land.

use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::LandDataError;
use crate::models::Coordinate;
use crate::spatial::{point_segment_distance_deg, segments_intersect_2d};

/// Distance (degrees) under which a point counts as lying on a polygon edge.
const BOUNDARY_EPS_DEG: f64 = 1e-12;

/// Axis-aligned bounds in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    fn contains(&self, p: Coordinate) -> bool {
        p.lat >= self.min_lat && p.lat <= self.max_lat && p.lon >= self.min_lon && p.lon <= self.max_lon
    }

    fn overlaps_segment(&self, a: Coordinate, b: Coordinate) -> bool {
        a.lat.max(b.lat) >= self.min_lat
            && a.lat.min(b.lat) <= self.max_lat
            && a.lon.max(b.lon) >= self.min_lon
            && a.lon.min(b.lon) <= self.max_lon
    }
}

/// An immutable closed ring of coordinates describing a landmass.
#[derive(Debug, Clone, PartialEq)]
pub struct LandPolygon {
    /// Ring vertices without the closing duplicate.
    ring: Vec<Coordinate>,
    bbox: BoundingBox,
}

impl LandPolygon {
    /// Build a polygon from its ring. A trailing vertex equal to the first is dropped.
    ///
    /// Returns `None` when fewer than 3 distinct vertices remain or any vertex is not finite.
    pub fn new(mut ring: Vec<Coordinate>) -> Option<Self> {
        if ring.len() >= 2 && ring.first() == ring.last() {
            ring.pop();
        }
        ring.dedup();
        if ring.len() < 3 || ring.iter().any(|p| !p.lat.is_finite() || !p.lon.is_finite()) {
            return None;
        }

        let mut bbox = BoundingBox {
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_lon: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
        };
        for p in &ring {
            bbox.min_lat = bbox.min_lat.min(p.lat);
            bbox.max_lat = bbox.max_lat.max(p.lat);
            bbox.min_lon = bbox.min_lon.min(p.lon);
            bbox.max_lon = bbox.max_lon.max(p.lon);
        }

        Some(Self { ring, bbox })
    }

    pub fn ring(&self) -> &[Coordinate] {
        &self.ring
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    fn edges(&self) -> impl Iterator<Item = (Coordinate, Coordinate)> + '_ {
        let n = self.ring.len();
        (0..n).map(move |i| (self.ring[i], self.ring[(i + 1) % n]))
    }

    /// Check if a point is inside this polygon or on its boundary.
    /// Uses ray casting for the interior.
    pub fn contains(&self, point: Coordinate) -> bool {
        if !self.bbox.contains(point) {
            return false;
        }

        let p = point.xy();
        if self
            .edges()
            .any(|(a, b)| point_segment_distance_deg(p, a.xy(), b.xy()) <= BOUNDARY_EPS_DEG)
        {
            return true;
        }

        let mut inside = false;
        for (a, b) in self.edges() {
            if ((a.lat > point.lat) != (b.lat > point.lat))
                && (point.lon < (b.lon - a.lon) * (point.lat - a.lat) / (b.lat - a.lat) + a.lon)
            {
                inside = !inside;
            }
        }
        inside
    }

    /// Check if the segment `a`-`b` touches the interior or boundary of this polygon.
    pub fn intersects_segment(&self, a: Coordinate, b: Coordinate) -> bool {
        if !self.bbox.overlaps_segment(a, b) {
            return false;
        }
        // A segment wholly inside crosses no edge, so test containment too.
        if self.contains(a) || self.contains(b) {
            return true;
        }
        self.edges()
            .any(|(e1, e2)| segments_intersect_2d(a.xy(), b.xy(), e1.xy(), e2.xy()))
    }
}

/// True iff the point lies inside or on the boundary of any polygon.
pub fn point_on_land(point: Coordinate, polygons: &[LandPolygon]) -> bool {
    polygons.iter().any(|polygon| polygon.contains(point))
}

/// True iff the straight segment `p1`-`p2` touches any polygon.
pub fn segment_crosses_land(p1: Coordinate, p2: Coordinate, polygons: &[LandPolygon]) -> bool {
    polygons
        .iter()
        .any(|polygon| polygon.intersects_segment(p1, p2))
}

/// Source of land/water answers for the planner.
pub trait LandPredicate: Send + Sync {
    fn point_on_land(&self, point: Coordinate) -> bool;

    fn segment_crosses_land(&self, p1: Coordinate, p2: Coordinate) -> bool;
}

/// The static land polygon set.
#[derive(Debug, Clone, Default)]
pub struct LandMask {
    polygons: Vec<LandPolygon>,
}

impl LandMask {
    pub fn new(polygons: Vec<LandPolygon>) -> Self {
        Self { polygons }
    }

    pub fn polygons(&self) -> &[LandPolygon] {
        &self.polygons
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Parse a GeoJSON document (FeatureCollection, Feature or bare geometry).
    ///
    /// Coordinates are `[lon, lat]`. Only outer rings of `Polygon` and
    /// `MultiPolygon` geometries are kept; other geometry types are skipped.
    pub fn from_geojson_str(text: &str) -> Result<Self, LandDataError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let geometries: Vec<Option<Geometry>> =
            match value.get("type").and_then(serde_json::Value::as_str) {
                Some("FeatureCollection") => serde_json::from_value::<FeatureCollection>(value)?
                    .features
                    .into_iter()
                    .map(|feature| feature.geometry)
                    .collect(),
                Some("Feature") => vec![serde_json::from_value::<Feature>(value)?.geometry],
                _ => vec![Some(serde_json::from_value::<Geometry>(value)?)],
            };

        let mut polygons = Vec::new();
        for (feature, geometry) in geometries.into_iter().enumerate() {
            let rings = match geometry {
                Some(Geometry::Polygon { coordinates }) => {
                    coordinates.into_iter().take(1).collect::<Vec<_>>()
                }
                Some(Geometry::MultiPolygon { coordinates }) => coordinates
                    .into_iter()
                    .filter_map(|polygon| polygon.into_iter().next())
                    .collect(),
                Some(Geometry::Unsupported) | None => continue,
            };
            for ring in rings {
                if ring.iter().any(|position| position.len() < 2) {
                    return Err(LandDataError::InvalidPolygon {
                        feature,
                        reason: "position has fewer than 2 values".to_string(),
                    });
                }
                let ring: Vec<Coordinate> = ring
                    .iter()
                    .map(|position| Coordinate::new(position[1], position[0]))
                    .collect();
                let vertices = ring.len();
                let polygon = LandPolygon::new(ring).ok_or_else(|| LandDataError::InvalidPolygon {
                    feature,
                    reason: format!("ring has {vertices} vertices, need at least 3 distinct"),
                })?;
                polygons.push(polygon);
            }
        }

        Ok(Self { polygons })
    }

    pub fn from_geojson_file(path: &Path) -> Result<Self, LandDataError> {
        let text = std::fs::read_to_string(path)?;
        let mask = Self::from_geojson_str(&text)?;
        tracing::info!(
            "Loaded {} land polygons from {}",
            mask.polygons.len(),
            path.display()
        );
        Ok(mask)
    }
}

impl LandPredicate for LandMask {
    fn point_on_land(&self, point: Coordinate) -> bool {
        point_on_land(point, &self.polygons)
    }

    fn segment_crosses_land(&self, p1: Coordinate, p2: Coordinate) -> bool {
        segment_crosses_land(p1, p2, &self.polygons)
    }
}

fn global_mask() -> &'static OnceLock<LandMask> {
    static LAND: OnceLock<LandMask> = OnceLock::new();
    &LAND
}

/// Process-wide land mask, loaded from `path` on first use and never reloaded.
///
/// Later calls return the already-loaded mask regardless of `path`.
pub fn global_land(path: &Path) -> Result<&'static LandMask, LandDataError> {
    let cell = global_mask();
    if let Some(mask) = cell.get() {
        return Ok(mask);
    }
    let mask = LandMask::from_geojson_file(path)?;
    Ok(cell.get_or_init(|| mask))
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

/// GeoJSON positions are `[lon, lat]` with an optional altitude.
type Ring = Vec<Vec<f64>>;

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Ring>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Ring>>,
    },
    #[serde(other)]
    Unsupported,
}
