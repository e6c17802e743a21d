//! Per-minute trajectory generation from waypoint sequences.

use chrono::{DateTime, Duration, Utc};

use crate::config::{DEFAULT_SPEED_KNOTS, MIN_SPEED_KNOTS};
use crate::error::RouteError;
use crate::models::{round_to, Coordinate, NavStatus, Trajectory, TrajectoryRecord, VoyageMetrics};
use crate::spatial::{bearing_deg, haversine_nm, lerp};

pub const TRANSIT_PHASE: &str = "Transit";

fn usable_speed(speed_knots: f64) -> bool {
    speed_knots.is_finite() && speed_knots >= MIN_SPEED_KNOTS
}

/// Use `speed_knots` when finite and at least [`MIN_SPEED_KNOTS`], else `default_knots`.
pub fn resolve_speed(speed_knots: f64, default_knots: f64) -> f64 {
    if usable_speed(speed_knots) {
        return speed_knots;
    }
    let default_knots = if usable_speed(default_knots) {
        default_knots
    } else {
        DEFAULT_SPEED_KNOTS
    };
    tracing::warn!(
        "Cruising speed {} kn is not usable, defaulting to {} kn",
        speed_knots,
        default_knots
    );
    default_knots
}

/// Whole minutes needed to cover `distance_nm` at `speed_knots`, at least 1.
///
/// Saturates at `usize::MAX`; callers cap the total with [`record_count`].
pub fn leg_steps(distance_nm: f64, speed_knots: f64) -> usize {
    let minutes = (distance_nm / speed_knots * 60.0).round();
    if minutes.is_nan() || minutes < 1.0 {
        1
    } else {
        minutes as usize
    }
}

/// Records [`TrajectoryBuilder::push_legs`] emits for `waypoints`.
pub fn record_count(waypoints: &[Coordinate], speed_knots: f64) -> usize {
    waypoints
        .windows(2)
        .map(|pair| leg_steps(haversine_nm(pair[0], pair[1]), speed_knots))
        .fold(0, usize::saturating_add)
}

/// Time to cover `distance_nm` at `speed_knots`, if it fits in a `Duration`.
pub fn travel_time(distance_nm: f64, speed_knots: f64) -> Option<Duration> {
    let millis = (distance_nm / speed_knots * 3_600_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}

/// `departure + offset`, or `TimeOutOfRange`.
pub fn checked_time(
    departure: DateTime<Utc>,
    offset: Option<Duration>,
) -> Result<DateTime<Utc>, RouteError> {
    offset
        .and_then(|offset| departure.checked_add_signed(offset))
        .ok_or(RouteError::TimeOutOfRange { departure })
}

/// Check a trajectory of `records` one-minute records fits both the record cap
/// and the calendar.
pub fn check_record_budget(
    departure: DateTime<Utc>,
    records: usize,
    limit: usize,
) -> Result<(), RouteError> {
    if records > limit {
        return Err(RouteError::TrajectoryTooLong { records, limit });
    }
    let minutes = i64::try_from(records).ok().and_then(Duration::try_minutes);
    checked_time(departure, minutes).map(|_| ())
}

/// Sum of great-circle leg distances.
pub fn route_distance_nm(waypoints: &[Coordinate]) -> f64 {
    waypoints
        .windows(2)
        .map(|pair| haversine_nm(pair[0], pair[1]))
        .sum()
}

/// Accumulates records on a one-minute clock.
#[derive(Debug, Clone)]
pub struct TrajectoryBuilder {
    vessel: String,
    departure: DateTime<Utc>,
    clock: DateTime<Utc>,
    records: Vec<TrajectoryRecord>,
}

impl TrajectoryBuilder {
    pub fn new(vessel: impl Into<String>, departure: DateTime<Utc>) -> Self {
        Self {
            vessel: vessel.into(),
            departure,
            clock: departure,
            records: Vec::new(),
        }
    }

    /// Timestamp the next record will carry.
    pub fn clock(&self) -> DateTime<Utc> {
        self.clock
    }

    pub fn records(&self) -> &[TrajectoryRecord] {
        &self.records
    }

    pub fn push_record(
        &mut self,
        position: Coordinate,
        speed_knots: f64,
        phase: &str,
        course_deg: Option<f64>,
        heading_deg: Option<f64>,
        nav_status: NavStatus,
    ) {
        self.records.push(TrajectoryRecord {
            timestamp: self.clock,
            vessel: self.vessel.clone(),
            phase: phase.to_string(),
            latitude: round_to(position.lat, 5),
            longitude: round_to(position.lon, 5),
            speed_knots: round_to(speed_knots, 2),
            course_deg: course_deg.map(|value| round_to(value, 1)),
            heading_deg: heading_deg.map(|value| round_to(value, 1)),
            nav_status,
        });
        self.clock += Duration::minutes(1);
    }

    /// Interpolate every leg of `waypoints` and return the distance covered (nm).
    pub fn push_legs(&mut self, waypoints: &[Coordinate], speed_knots: f64, phase: &str) -> f64 {
        self.push_legs_with(waypoints, speed_knots, phase, || (0.0, 0.0))
    }

    /// Like [`push_legs`](Self::push_legs), adding `offset()` (lat, lon degrees) to each position.
    pub fn push_legs_with<F>(
        &mut self,
        waypoints: &[Coordinate],
        speed_knots: f64,
        phase: &str,
        mut offset: F,
    ) -> f64
    where
        F: FnMut() -> (f64, f64),
    {
        let mut distance_nm = 0.0;
        for pair in waypoints.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let leg_nm = haversine_nm(from, to);
            let steps = leg_steps(leg_nm, speed_knots);
            let course = bearing_deg(from, to);

            for i in 0..steps {
                let fraction = if steps > 1 {
                    i as f64 / (steps - 1) as f64
                } else {
                    0.0
                };
                let (dlat, dlon) = offset();
                let base = lerp(from, to, fraction);
                let position = Coordinate::new(base.lat + dlat, base.lon + dlon);
                self.push_record(
                    position,
                    speed_knots,
                    phase,
                    Some(course),
                    Some(course),
                    NavStatus::Underway,
                );
            }
            distance_nm += leg_nm;
        }
        distance_nm
    }

    pub fn finish(self, total_distance_nm: f64, speed_knots: f64, eta: DateTime<Utc>) -> Trajectory {
        Trajectory {
            records: self.records,
            metrics: VoyageMetrics {
                total_distance_nm,
                speed_knots,
                departure: self.departure,
                eta,
            },
        }
    }
}

/// Materialize a waypoint sequence into a single-phase trajectory.
///
/// `speed_knots` must already be resolved (positive). Fails before emitting
/// anything when the trajectory would exceed `max_records` or the calendar.
pub fn materialize(
    waypoints: &[Coordinate],
    speed_knots: f64,
    departure: DateTime<Utc>,
    vessel: &str,
    phase: &str,
    max_records: usize,
) -> Result<Trajectory, RouteError> {
    check_record_budget(departure, record_count(waypoints, speed_knots), max_records)?;
    let eta = checked_time(
        departure,
        travel_time(route_distance_nm(waypoints), speed_knots),
    )?;

    let mut builder = TrajectoryBuilder::new(vessel, departure);
    let total_nm = builder.push_legs(waypoints, speed_knots, phase);
    Ok(builder.finish(total_nm, speed_knots, eta))
}
