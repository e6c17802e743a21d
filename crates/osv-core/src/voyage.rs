//! Port → rig → port voyage simulation.
//!
//! Outbound and return transits follow planned (or direct) legs; the time
//! at the rig is filled with randomized on-site activity.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GridSpec, RouteError};
use crate::models::{Coordinate, NavStatus, Trajectory};
use crate::planner::RoutePlanner;
use crate::spatial::offset_by_bearing;
use crate::trajectory::{
    check_record_budget, checked_time, record_count, route_distance_nm, travel_time,
    TrajectoryBuilder,
};

pub const OUTBOUND_PHASE: &str = "Outbound Transit";
pub const RETURN_PHASE: &str = "Return Transit";

/// On-site positions are drawn from this annulus around the rig.
const ONSITE_MIN_RADIUS_KM: f64 = 5.0;
const ONSITE_MAX_RADIUS_KM: f64 = 7.0;
/// Larger transit drift is ignored.
const MAX_DRIFT_DEG: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnSiteActivity {
    Stationary,
    Patrolling,
    WorksiteTransit,
}

impl OnSiteActivity {
    pub fn label(&self) -> &'static str {
        match self {
            OnSiteActivity::Stationary => "Stationary",
            OnSiteActivity::Patrolling => "Patrolling",
            OnSiteActivity::WorksiteTransit => "Worksite Transit",
        }
    }

    pub fn phase(&self) -> String {
        format!("On Site / {}", self.label())
    }

    /// Selection weights: stationary 0.4, patrolling 0.4, worksite transit 0.2.
    fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let roll: f64 = rng.random_range(0.0..1.0);
        if roll < 0.4 {
            OnSiteActivity::Stationary
        } else if roll < 0.8 {
            OnSiteActivity::Patrolling
        } else {
            OnSiteActivity::WorksiteTransit
        }
    }

    fn speed_knots<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            OnSiteActivity::Stationary => rng.random_range(0.0..0.3),
            OnSiteActivity::Patrolling => rng.random_range(2.0..5.0),
            OnSiteActivity::WorksiteTransit => rng.random_range(4.0..7.0),
        }
    }

    fn nav_status(&self) -> NavStatus {
        match self {
            OnSiteActivity::Stationary => NavStatus::DynamicPositioning,
            _ => NavStatus::Underway,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoyageRequest {
    pub port: Coordinate,
    pub rig: Coordinate,
    /// Where the vessel returns to; usually the departure port.
    pub end_port: Coordinate,
    /// Visited outbound in order and in reverse on the way back.
    #[serde(default)]
    pub waypoints: Vec<Coordinate>,
    pub speed_knots: f64,
    pub departure: DateTime<Utc>,
    pub vessel: String,
    pub onsite_minutes: usize,
    /// Uniform positional jitter on transit records, in degrees.
    #[serde(default)]
    pub drift_deg: f64,
    /// Route legs around land; when false legs are straight lines.
    pub land_aware: bool,
    #[serde(default)]
    pub grid: Option<GridSpec>,
}

impl VoyageRequest {
    pub fn new(port: Coordinate, rig: Coordinate) -> Self {
        Self {
            port,
            rig,
            end_port: port,
            waypoints: Vec::new(),
            speed_knots: crate::config::DEFAULT_SPEED_KNOTS,
            departure: Utc::now(),
            vessel: "OSV_SIM".to_string(),
            onsite_minutes: 0,
            drift_deg: 0.0,
            land_aware: true,
            grid: None,
        }
    }

    fn outbound_points(&self) -> Vec<Coordinate> {
        let mut points = vec![self.port];
        points.extend(self.waypoints.iter().copied());
        points.push(self.rig);
        points
    }

    fn return_points(&self) -> Vec<Coordinate> {
        let mut points = vec![self.rig];
        points.extend(self.waypoints.iter().rev().copied());
        points.push(self.end_port);
        points
    }
}

/// A simulated voyage and its phase boundaries.
#[derive(Debug, Clone, Serialize)]
pub struct Voyage {
    pub trajectory: Trajectory,
    pub outbound_route: Vec<Coordinate>,
    pub return_route: Vec<Coordinate>,
    pub outbound_records: usize,
    pub onsite_records: usize,
    pub return_records: usize,
}

/// Simulate the full voyage. Randomness (drift, on-site activity) comes from `rng`.
pub fn simulate_voyage<R: Rng + ?Sized>(
    planner: &RoutePlanner<'_>,
    request: &VoyageRequest,
    rng: &mut R,
) -> Result<Voyage, RouteError> {
    let outbound_points = request.outbound_points();
    let return_points = request.return_points();
    for point in outbound_points.iter().chain(std::iter::once(&request.end_port)) {
        point.validate()?;
    }

    let (outbound_route, return_route) = if request.land_aware {
        let grid = request.grid.unwrap_or_else(|| planner.config().grid());
        (
            planner.plan_points(&outbound_points, &grid)?.waypoints,
            planner.plan_points(&return_points, &grid)?.waypoints,
        )
    } else {
        (outbound_points, return_points)
    };

    let speed = planner.cruising_speed(request.speed_knots);
    let drift = usable_drift(request.drift_deg);

    let records = record_count(&outbound_route, speed)
        .saturating_add(request.onsite_minutes)
        .saturating_add(record_count(&return_route, speed));
    check_record_budget(
        request.departure,
        records,
        planner.config().max_trajectory_records,
    )?;
    let total_nm = route_distance_nm(&outbound_route) + route_distance_nm(&return_route);
    let onsite = i64::try_from(request.onsite_minutes)
        .ok()
        .and_then(Duration::try_minutes);
    let underway = travel_time(total_nm, speed)
        .zip(onsite)
        .and_then(|(transit, onsite)| transit.checked_add(&onsite));
    let eta = checked_time(request.departure, underway)?;

    let mut builder = TrajectoryBuilder::new(&request.vessel, request.departure);

    builder.push_legs_with(&outbound_route, speed, OUTBOUND_PHASE, || {
        jitter(&mut *rng, drift)
    });
    let outbound_records = builder.records().len();

    simulate_onsite(&mut builder, request.rig, request.onsite_minutes, rng);
    let onsite_records = builder.records().len() - outbound_records;

    builder.push_legs_with(&return_route, speed, RETURN_PHASE, || {
        jitter(&mut *rng, drift)
    });
    let return_records = builder.records().len() - outbound_records - onsite_records;

    tracing::info!(
        "Simulated voyage for {}: {:.1} nm transit, {} records",
        request.vessel,
        total_nm,
        builder.records().len()
    );

    Ok(Voyage {
        trajectory: builder.finish(total_nm, speed, eta),
        outbound_route,
        return_route,
        outbound_records,
        onsite_records,
        return_records,
    })
}

/// Drift magnitude, or 0 when the request's value is not finite or above [`MAX_DRIFT_DEG`].
fn usable_drift(drift_deg: f64) -> f64 {
    if drift_deg.is_finite() && drift_deg.abs() <= MAX_DRIFT_DEG {
        return drift_deg.abs();
    }
    tracing::warn!("Drift {} deg is not usable, simulating without drift", drift_deg);
    0.0
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, drift_deg: f64) -> (f64, f64) {
    if !drift_deg.is_finite() || drift_deg <= 0.0 {
        return (0.0, 0.0);
    }
    (
        rng.random_range(-drift_deg..=drift_deg),
        rng.random_range(-drift_deg..=drift_deg),
    )
}

/// Append `minutes` on-site records around `rig`.
pub fn simulate_onsite<R: Rng + ?Sized>(
    builder: &mut TrajectoryBuilder,
    rig: Coordinate,
    minutes: usize,
    rng: &mut R,
) {
    for _ in 0..minutes {
        let position = onsite_position(rig, rng);
        let activity = OnSiteActivity::pick(rng);
        let speed = activity.speed_knots(rng);
        let course = f64::from(rng.random_range(0u32..360));
        let heading = (course + f64::from(rng.random_range(-3i32..=3))).rem_euclid(360.0);
        builder.push_record(
            position,
            speed,
            &activity.phase(),
            Some(course),
            Some(heading),
            activity.nav_status(),
        );
    }
}

fn onsite_position<R: Rng + ?Sized>(rig: Coordinate, rng: &mut R) -> Coordinate {
    let radius_km = rng.random_range(ONSITE_MIN_RADIUS_KM..ONSITE_MAX_RADIUS_KM);
    let bearing = rng.random_range(0.0..std::f64::consts::TAU);
    offset_by_bearing(rig, radius_km, bearing)
}
