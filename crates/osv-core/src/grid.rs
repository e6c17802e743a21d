//! Water grid generation: candidate waypoints around a leg, land excluded.

use serde::Serialize;

use crate::error::{GridSpec, RouteError};
use crate::land::LandPredicate;
use crate::models::{Coordinate, GridPoint};

/// Slack (in steps) when snapping box edges to the lattice.
const LATTICE_EPS: f64 = 1e-9;

/// Padded search box around a leg, clipped to valid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl SearchBox {
    pub fn around(start: Coordinate, end: Coordinate, padding_deg: f64) -> Self {
        Self {
            min_lat: (start.lat.min(end.lat) - padding_deg).max(-90.0),
            max_lat: (start.lat.max(end.lat) + padding_deg).min(90.0),
            min_lon: (start.lon.min(end.lon) - padding_deg).max(-180.0),
            max_lon: (start.lon.max(end.lon) + padding_deg).min(180.0),
        }
    }
}

/// Lattice indices `k` with `k * step` inside `[min, max]`.
///
/// Index and count stay in `f64`: a tiny step can push them past any integer type.
#[derive(Debug, Clone, Copy)]
struct Axis {
    first: f64,
    count: f64,
    step: f64,
}

impl Axis {
    fn new(min: f64, max: f64, step: f64) -> Self {
        let first = (min / step - LATTICE_EPS).ceil();
        let last = (max / step + LATTICE_EPS).floor();
        Self {
            first,
            count: (last - first + 1.0).max(0.0),
            step,
        }
    }

    /// Only meaningful once the lattice is known to fit under the grid cap.
    fn len(&self) -> usize {
        self.count as usize
    }

    fn value(&self, i: usize) -> f64 {
        (self.first + i as f64) * self.step
    }
}

/// Unfiltered lattice size, saturating at `usize::MAX`.
fn lattice_size(lat_axis: &Axis, lon_axis: &Axis) -> usize {
    let size = lat_axis.count * lon_axis.count;
    if size.is_finite() {
        size as usize
    } else {
        usize::MAX
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WaterGrid {
    pub search_box: SearchBox,
    pub rows: usize,
    pub cols: usize,
    /// Water points in row-major order (latitude-major, then longitude).
    pub points: Vec<GridPoint>,
}

impl WaterGrid {
    /// Lattice points before land filtering.
    pub fn candidates(&self) -> usize {
        self.rows * self.cols
    }
}

pub fn validate_grid(spec: &GridSpec) -> Result<(), RouteError> {
    let checks = [
        ("padding_deg", spec.padding_deg, true),
        ("lat_step_deg", spec.lat_step_deg, false),
        ("lon_step_deg", spec.lon_step_deg, false),
    ];
    for (name, value, allow_zero) in checks {
        let ok = value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0));
        if !ok {
            return Err(RouteError::InvalidGrid {
                reason: format!("{name} must be {} (got {value})", if allow_zero { "non-negative" } else { "positive" }),
            });
        }
    }
    Ok(())
}

/// Number of lattice points in the padded box, before land filtering.
pub fn candidate_count(start: Coordinate, end: Coordinate, spec: &GridSpec) -> usize {
    let search_box = SearchBox::around(start, end, spec.padding_deg);
    let lat_axis = Axis::new(search_box.min_lat, search_box.max_lat, spec.lat_step_deg);
    let lon_axis = Axis::new(search_box.min_lon, search_box.max_lon, spec.lon_step_deg);
    lattice_size(&lat_axis, &lon_axis)
}

/// Generate the water-only candidate set for a leg.
///
/// Fails with `GridTooLarge` before any land test when the unfiltered
/// lattice exceeds `max_points`.
pub fn generate_water_grid(
    start: Coordinate,
    end: Coordinate,
    spec: &GridSpec,
    land: &dyn LandPredicate,
    max_points: usize,
) -> Result<WaterGrid, RouteError> {
    validate_grid(spec)?;

    let search_box = SearchBox::around(start, end, spec.padding_deg);
    let lat_axis = Axis::new(search_box.min_lat, search_box.max_lat, spec.lat_step_deg);
    let lon_axis = Axis::new(search_box.min_lon, search_box.max_lon, spec.lon_step_deg);

    let candidates = lattice_size(&lat_axis, &lon_axis);
    if candidates > max_points {
        return Err(RouteError::GridTooLarge {
            points: candidates,
            limit: max_points,
        });
    }
    // An empty axis can sit next to an arbitrarily long one.
    let (rows, cols) = if candidates == 0 {
        (0, 0)
    } else {
        (lat_axis.len(), lon_axis.len())
    };

    let mut points = Vec::with_capacity(candidates);
    for row in 0..rows {
        let lat = lat_axis.value(row);
        for col in 0..cols {
            let coord = Coordinate::new(lat, lon_axis.value(col));
            if land.point_on_land(coord) {
                continue;
            }
            points.push(GridPoint {
                index: points.len(),
                coord,
            });
        }
    }

    tracing::debug!(
        "Water grid: {}x{} candidates, {} on water",
        rows,
        cols,
        points.len()
    );

    Ok(WaterGrid {
        search_box,
        rows,
        cols,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::land::{LandMask, LandPolygon};
    use std::collections::HashSet;

    fn spec(padding: f64, step: f64) -> GridSpec {
        GridSpec {
            padding_deg: padding,
            lat_step_deg: step,
            lon_step_deg: step,
        }
    }

    #[test]
    fn open_water_grid_covers_padded_box() {
        let grid = generate_water_grid(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 1.0),
            &spec(0.5, 0.5),
            &LandMask::default(),
            1_000,
        )
        .unwrap();
        // -0.5..=1.5 in 0.5 steps on both axes
        assert_eq!(grid.rows, 5);
        assert_eq!(grid.cols, 5);
        assert_eq!(grid.points.len(), 25);
        assert_eq!(grid.points[0].coord, Coordinate::new(-0.5, -0.5));
        assert_eq!(grid.points[1].coord, Coordinate::new(-0.5, 0.0));
        assert_eq!(grid.points[5].coord, Coordinate::new(0.0, -0.5));
    }

    #[test]
    fn grid_is_row_major_without_duplicates() {
        let grid = generate_water_grid(
            Coordinate::new(18.9, 71.3),
            Coordinate::new(19.4, 72.9),
            &spec(0.2, 0.1),
            &LandMask::default(),
            10_000,
        )
        .unwrap();
        let mut seen = HashSet::new();
        for window in grid.points.windows(2) {
            let (a, b) = (window[0].coord, window[1].coord);
            assert!(a.lat < b.lat || (a.lat == b.lat && a.lon < b.lon));
        }
        for (i, point) in grid.points.iter().enumerate() {
            assert_eq!(point.index, i);
            assert!(seen.insert((point.coord.lat.to_bits(), point.coord.lon.to_bits())));
        }
    }

    #[test]
    fn land_points_are_excluded() {
        let island = LandPolygon::new(vec![
            Coordinate::new(0.2, 0.2),
            Coordinate::new(0.2, 0.8),
            Coordinate::new(0.8, 0.8),
            Coordinate::new(0.8, 0.2),
        ])
        .unwrap();
        let land = LandMask::new(vec![island]);
        let grid = generate_water_grid(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 1.0),
            &spec(0.0, 0.5),
            &land,
            1_000,
        )
        .unwrap();
        assert_eq!(grid.candidates(), 9);
        assert_eq!(grid.points.len(), 8);
        assert!(grid
            .points
            .iter()
            .all(|p| p.coord != Coordinate::new(0.5, 0.5)));
    }

    #[test]
    fn box_smaller_than_step_is_empty() {
        let grid = generate_water_grid(
            Coordinate::new(0.1, 0.1),
            Coordinate::new(0.2, 0.2),
            &spec(0.0, 1.0),
            &LandMask::default(),
            1_000,
        )
        .unwrap();
        assert!(grid.points.is_empty());
    }

    #[test]
    fn oversized_grid_is_rejected_before_filtering() {
        let err = generate_water_grid(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(10.0, 10.0),
            &spec(0.0, 0.01),
            &LandMask::default(),
            2_500,
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::GridTooLarge { limit: 2_500, .. }));
    }

    #[test]
    fn non_positive_step_is_invalid() {
        assert!(matches!(
            validate_grid(&spec(0.5, 0.0)),
            Err(RouteError::InvalidGrid { .. })
        ));
        assert!(matches!(
            validate_grid(&spec(-0.1, 0.1)),
            Err(RouteError::InvalidGrid { .. })
        ));
        assert!(validate_grid(&spec(0.0, 0.1)).is_ok());
    }

    #[test]
    fn candidate_count_matches_generated_grid() {
        let start = Coordinate::new(18.938507, 72.851778);
        let end = Coordinate::new(19.41667, 71.33333);
        let spec = spec(0.5, 0.1);
        let grid = generate_water_grid(start, end, &spec, &LandMask::default(), 100_000).unwrap();
        assert_eq!(candidate_count(start, end, &spec), grid.candidates());
    }

    #[test]
    fn vanishing_step_is_rejected_as_too_large() {
        let tiny = GridSpec {
            padding_deg: 0.0,
            lat_step_deg: 1e-20,
            lon_step_deg: 0.05,
        };
        let start = Coordinate::new(0.0, 0.0);
        let end = Coordinate::new(0.1, 0.1);
        let err = generate_water_grid(start, end, &tiny, &LandMask::default(), 2_500).unwrap_err();
        assert!(matches!(
            err,
            RouteError::GridTooLarge { points, limit: 2_500 } if points > 2_500
        ));
        assert!(candidate_count(start, end, &tiny) > 2_500);

        let subnormal = spec(0.5, 1e-320);
        assert!(matches!(
            generate_water_grid(start, end, &subnormal, &LandMask::default(), 2_500),
            Err(RouteError::GridTooLarge { points: usize::MAX, .. })
        ));
    }

    #[test]
    fn empty_axis_beside_vanishing_step_yields_empty_grid() {
        // Zero-height box off the lattice: no rows, however fine the longitude step.
        let spec = GridSpec {
            padding_deg: 0.0,
            lat_step_deg: 1.0,
            lon_step_deg: 1e-20,
        };
        let grid = generate_water_grid(
            Coordinate::new(0.5, 0.0),
            Coordinate::new(0.5, 1.0),
            &spec,
            &LandMask::default(),
            2_500,
        )
        .unwrap();
        assert!(grid.points.is_empty());
        assert_eq!(grid.candidates(), 0);
    }
}
