//! Spatial math for route planning and trajectory generation.
//!
//! Distances treat the Earth as a sphere. Containment and intersection
//! tests are planar in (lon, lat) degree space.

use crate::models::Coordinate;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Kilometres per nautical mile.
pub const KM_PER_NM: f64 = 1.852;

/// Tolerance for orientation tests, in squared degrees.
const EPS_DEG: f64 = 1e-12;

/// Calculate great-circle distance between two points in kilometres (Haversine formula).
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Great-circle distance between two coordinates in nautical miles.
pub fn haversine_nm(a: Coordinate, b: Coordinate) -> f64 {
    haversine_km(a.lat, a.lon, b.lat, b.lon) / KM_PER_NM
}

/// Initial bearing from `a` to `b` in degrees, normalized to [0, 360).
pub fn bearing_deg(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_lambda = (b.lon - a.lon).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y).to_degrees().rem_euclid(360.0)
}

/// Offset a position by distance and bearing.
///
/// # Arguments
/// * `origin` - Starting position
/// * `distance_km` - Distance in kilometres
/// * `bearing_rad` - Bearing in radians (0 = north, π/2 = east)
pub fn offset_by_bearing(origin: Coordinate, distance_km: f64, bearing_rad: f64) -> Coordinate {
    if distance_km.abs() <= f64::EPSILON {
        return origin;
    }

    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();
    let angular_distance = distance_km / EARTH_RADIUS_KM;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    Coordinate::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Linear interpolation in degree space.
pub fn lerp(a: Coordinate, b: Coordinate, fraction: f64) -> Coordinate {
    Coordinate::new(
        a.lat + (b.lat - a.lat) * fraction,
        a.lon + (b.lon - a.lon) * fraction,
    )
}

/// Planar segment intersection test. Touching and collinear overlap count as intersecting.
///
/// Points are `(x, y)` pairs; callers pass `(lon, lat)`.
pub fn segments_intersect_2d(
    a1: (f64, f64),
    a2: (f64, f64),
    b1: (f64, f64),
    b2: (f64, f64),
) -> bool {
    fn orient(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> f64 {
        (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
    }

    fn within(a: f64, b: f64, value: f64) -> bool {
        let min = a.min(b) - EPS_DEG;
        let max = a.max(b) + EPS_DEG;
        value >= min && value <= max
    }

    fn on_segment(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> bool {
        within(p.0, q.0, r.0) && within(p.1, q.1, r.1)
    }

    let o1 = orient(a1, a2, b1);
    let o2 = orient(a1, a2, b2);
    let o3 = orient(b1, b2, a1);
    let o4 = orient(b1, b2, a2);

    if o1.abs() <= EPS_DEG && on_segment(a1, a2, b1) {
        return true;
    }
    if o2.abs() <= EPS_DEG && on_segment(a1, a2, b2) {
        return true;
    }
    if o3.abs() <= EPS_DEG && on_segment(b1, b2, a1) {
        return true;
    }
    if o4.abs() <= EPS_DEG && on_segment(b1, b2, a2) {
        return true;
    }

    let a_crosses = (o1 > EPS_DEG && o2 < -EPS_DEG) || (o1 < -EPS_DEG && o2 > EPS_DEG);
    let b_crosses = (o3 > EPS_DEG && o4 < -EPS_DEG) || (o3 < -EPS_DEG && o4 > EPS_DEG);
    a_crosses && b_crosses
}

/// Distance from point `p` to segment `a`-`b` in degree space.
pub(crate) fn point_segment_distance_deg(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let sx = b.0 - a.0;
    let sy = b.1 - a.1;
    let px = p.0 - a.0;
    let py = p.1 - a.1;
    let seg_len_sq = sx * sx + sy * sy;
    if seg_len_sq <= f64::EPSILON * f64::EPSILON {
        return (px * px + py * py).sqrt();
    }
    let t = ((px * sx + py * sy) / seg_len_sq).clamp(0.0, 1.0);
    let dx = px - t * sx;
    let dy = py - t * sy;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // 1 degree of latitude is ~60 nautical miles
        let dist = haversine_nm(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((dist - 60.04).abs() < 0.1, "got {dist}");
    }

    #[test]
    fn test_haversine_same_point() {
        let p = Coordinate::new(18.938507, 72.851778);
        assert!(haversine_nm(p, p) < 1e-9);
    }

    #[test]
    fn bearing_cardinal_directions() {
        let origin = Coordinate::new(0.0, 0.0);
        assert!(bearing_deg(origin, Coordinate::new(1.0, 0.0)).abs() < 1e-9);
        assert!((bearing_deg(origin, Coordinate::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing_deg(origin, Coordinate::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing_deg(origin, Coordinate::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn offset_by_bearing_matches_distance() {
        let origin = Coordinate::new(19.41667, 71.33333);
        let moved = offset_by_bearing(origin, 6.0, 1.0);
        let back = haversine_km(origin.lat, origin.lon, moved.lat, moved.lon);
        assert!((back - 6.0).abs() < 1e-6, "got {back}");
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect_2d(
            (0.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (1.0, 0.0)
        ));
    }

    #[test]
    fn touching_segments_intersect() {
        assert!(segments_intersect_2d(
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0)
        ));
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        assert!(!segments_intersect_2d(
            (0.0, 0.0),
            (1.0, 0.0),
            (0.0, 0.5),
            (1.0, 0.5)
        ));
    }

    #[test]
    fn point_segment_distance_projects_onto_segment() {
        let d = point_segment_distance_deg((0.5, 1.0), (0.0, 0.0), (1.0, 0.0));
        assert!((d - 1.0).abs() < 1e-12);
        let d = point_segment_distance_deg((2.0, 0.0), (0.0, 0.0), (1.0, 0.0));
        assert!((d - 1.0).abs() < 1e-12);
    }
}
