pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod grid;
pub mod land;
pub mod models;
pub mod planner;
pub mod solver;
pub mod spatial;
pub mod trajectory;
pub mod voyage;

pub use config::{
    land_path_from_env, PlannerConfig, DEFAULT_LAND_PATH, DEFAULT_SPEED_KNOTS, MIN_SPEED_KNOTS,
};
pub use error::{ExportError, GridSpec, LandDataError, RouteError};
pub use export::{
    load_trajectory_csv, read_trajectory_csv, save_trajectory_csv, write_trajectory_csv,
    TrajectorySummary,
};
pub use graph::{Edge, RouteGraph, END_NODE, START_NODE};
pub use grid::{generate_water_grid, SearchBox, WaterGrid};
pub use land::{
    global_land, point_on_land, segment_crosses_land, LandMask, LandPolygon, LandPredicate,
};
pub use models::{
    Coordinate, GridPoint, NavStatus, Trajectory, TrajectoryRecord, VoyageMetrics,
};
pub use planner::{LegPlan, PlannedRoute, RoutePlanner, RouteRequest};
pub use solver::shortest_path;
pub use spatial::{haversine_km, haversine_nm};
pub use trajectory::{materialize, TrajectoryBuilder};
pub use voyage::{simulate_voyage, OnSiteActivity, Voyage, VoyageRequest};
