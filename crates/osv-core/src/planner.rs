//! Land-aware route planning for a single request.
//!
//! Each leg gets its own water grid and visibility graph; nothing is shared
//! between requests except the read-only land data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::error::{GridSpec, RouteError};
use crate::graph::{RouteGraph, END_NODE, START_NODE};
use crate::grid::{candidate_count, generate_water_grid, validate_grid, WaterGrid};
use crate::land::LandPredicate;
use crate::models::{Coordinate, Trajectory};
use crate::solver::shortest_path;
use crate::trajectory::{materialize, resolve_speed, TRANSIT_PHASE};

/// Everything one planning request needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: Coordinate,
    pub end: Coordinate,
    /// Intermediate points visited in order between start and end.
    #[serde(default)]
    pub waypoints: Vec<Coordinate>,
    pub speed_knots: f64,
    pub departure: DateTime<Utc>,
    pub vessel: String,
    /// Overrides the planner's configured grid when set.
    #[serde(default)]
    pub grid: Option<GridSpec>,
}

impl RouteRequest {
    pub fn new(start: Coordinate, end: Coordinate) -> Self {
        Self {
            start,
            end,
            waypoints: Vec::new(),
            speed_knots: crate::config::DEFAULT_SPEED_KNOTS,
            departure: Utc::now(),
            vessel: "OSV_SIM".to_string(),
            grid: None,
        }
    }

    /// Start, waypoints, end.
    pub fn route_points(&self) -> Vec<Coordinate> {
        let mut points = Vec::with_capacity(self.waypoints.len() + 2);
        points.push(self.start);
        points.extend(self.waypoints.iter().copied());
        points.push(self.end);
        points
    }
}

/// Result of planning one leg.
#[derive(Debug, Clone, Serialize)]
pub struct LegPlan {
    pub from: Coordinate,
    pub to: Coordinate,
    /// Polyline from `from` to `to`, inclusive.
    pub waypoints: Vec<Coordinate>,
    pub distance_nm: f64,
    pub candidates: usize,
    pub grid_points: usize,
    pub edges: usize,
    pub nodes_visited: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedRoute {
    pub waypoints: Vec<Coordinate>,
    pub legs: Vec<LegPlan>,
    pub total_distance_nm: f64,
}

pub struct RoutePlanner<'a> {
    land: &'a dyn LandPredicate,
    config: PlannerConfig,
}

impl<'a> RoutePlanner<'a> {
    pub fn new(land: &'a dyn LandPredicate, config: PlannerConfig) -> Self {
        Self { land, config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn land(&self) -> &'a dyn LandPredicate {
        self.land
    }

    /// Request speed, or the configured default when it is too slow or not finite.
    pub fn cruising_speed(&self, speed_knots: f64) -> f64 {
        resolve_speed(speed_knots, self.config.default_speed_knots)
    }

    /// Water grid and visibility graph for one leg.
    pub fn leg_graph(
        &self,
        from: Coordinate,
        to: Coordinate,
        grid: &GridSpec,
    ) -> Result<(WaterGrid, RouteGraph), RouteError> {
        let water = generate_water_grid(from, to, grid, self.land, self.config.max_grid_points)?;
        let graph = RouteGraph::build(from, to, &water.points, self.land);
        Ok((water, graph))
    }

    pub fn plan_leg(
        &self,
        from: Coordinate,
        to: Coordinate,
        grid: &GridSpec,
    ) -> Result<LegPlan, RouteError> {
        let (water, graph) = self.leg_graph(from, to, grid)?;
        let path = shortest_path(&graph, START_NODE, END_NODE).ok_or(RouteError::NoPathFound {
            from,
            to,
            grid: *grid,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
        })?;

        let waypoints: Vec<Coordinate> = path
            .nodes
            .iter()
            .filter_map(|&node| graph.coordinate(node))
            .collect();

        tracing::debug!(
            "Leg {} -> {}: {} hops, {:.2} nm, {} nodes visited",
            from,
            to,
            waypoints.len().saturating_sub(1),
            path.total_nm,
            path.nodes_visited
        );

        Ok(LegPlan {
            from,
            to,
            waypoints,
            distance_nm: path.total_nm,
            candidates: water.candidates(),
            grid_points: water.points.len(),
            edges: graph.edge_count(),
            nodes_visited: path.nodes_visited,
        })
    }

    /// Plan through `points` in order, leg by leg.
    ///
    /// All coordinates and grid sizes are checked before any graph is built.
    pub fn plan_points(
        &self,
        points: &[Coordinate],
        grid: &GridSpec,
    ) -> Result<PlannedRoute, RouteError> {
        if points.len() < 2 {
            return Err(RouteError::TooFewPoints);
        }
        for point in points {
            point.validate()?;
        }
        validate_grid(grid)?;
        for pair in points.windows(2) {
            let count = candidate_count(pair[0], pair[1], grid);
            if count > self.config.max_grid_points {
                return Err(RouteError::GridTooLarge {
                    points: count,
                    limit: self.config.max_grid_points,
                });
            }
        }

        let mut legs = Vec::with_capacity(points.len() - 1);
        let mut waypoints: Vec<Coordinate> = Vec::new();
        let mut total_distance_nm = 0.0;
        for pair in points.windows(2) {
            let leg = self.plan_leg(pair[0], pair[1], grid)?;
            let skip = usize::from(!waypoints.is_empty());
            waypoints.extend(leg.waypoints.iter().skip(skip).copied());
            total_distance_nm += leg.distance_nm;
            legs.push(leg);
        }

        Ok(PlannedRoute {
            waypoints,
            legs,
            total_distance_nm,
        })
    }

    pub fn plan(&self, request: &RouteRequest) -> Result<PlannedRoute, RouteError> {
        let grid = request.grid.unwrap_or_else(|| self.config.grid());
        let route = self.plan_points(&request.route_points(), &grid)?;
        tracing::info!(
            "Planned {} leg(s) for {}: {} waypoints, {:.1} nm",
            route.legs.len(),
            request.vessel,
            route.waypoints.len(),
            route.total_distance_nm
        );
        Ok(route)
    }

    /// Plan the request and materialize the resulting route.
    pub fn plan_trajectory(
        &self,
        request: &RouteRequest,
    ) -> Result<(PlannedRoute, Trajectory), RouteError> {
        let route = self.plan(request)?;
        let trajectory = self.materialize(&route, request)?;
        Ok((route, trajectory))
    }

    /// Per-minute trajectory along `route` at the request's speed and departure.
    pub fn materialize(
        &self,
        route: &PlannedRoute,
        request: &RouteRequest,
    ) -> Result<Trajectory, RouteError> {
        materialize(
            &route.waypoints,
            self.cruising_speed(request.speed_knots),
            request.departure,
            &request.vessel,
            TRANSIT_PHASE,
            self.config.max_trajectory_records,
        )
    }
}
