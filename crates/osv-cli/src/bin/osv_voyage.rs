//! Plan land-aware OSV routes and simulate full voyages.
//!
//! Examples:
//!   osv-voyage plan --from 18.938507,72.851778 --to 19.41667,71.33333 --out route.csv
//!   osv-voyage simulate --seed 42 --out osv_voyage.csv
//!   osv-voyage summary osv_voyage.csv

use anyhow::Context;
use chrono::{DateTime, Timelike, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use osv_cli::{parse_coordinate, Scenario};
use osv_core::{
    config, land, load_trajectory_csv, save_trajectory_csv, simulate_voyage, write_trajectory_csv,
    Coordinate, LandMask, LandPredicate, PlannerConfig, RoutePlanner, RouteRequest,
    TrajectoryRecord, TrajectorySummary, VoyageRequest,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Offshore supply vessel route planner and voyage simulator
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a route around land and export its per-minute trajectory
    Plan(PlanArgs),
    /// Simulate an outbound transit, on-site operations and the return
    Simulate(SimulateArgs),
    /// Summarize an exported trajectory CSV
    Summary {
        /// Trajectory CSV to read
        path: PathBuf,
    },
}

/// Land data and grid settings shared by `plan` and `simulate`.
#[derive(ClapArgs, Debug)]
struct PlannerArgs {
    /// GeoJSON land polygons (default: $OSV_LAND_PATH or data/land.geojson)
    #[arg(long)]
    land: Option<PathBuf>,

    /// Padding around each leg's bounding box, in degrees
    #[arg(long)]
    padding: Option<f64>,

    /// Grid spacing in degrees (latitude and longitude)
    #[arg(long)]
    step: Option<f64>,

    /// Maximum grid candidates per leg
    #[arg(long)]
    max_grid_points: Option<usize>,
}

impl PlannerArgs {
    fn config(&self) -> PlannerConfig {
        let mut config = PlannerConfig::from_env();
        if let Some(padding) = self.padding {
            config.padding_deg = padding;
        }
        if let Some(step) = self.step {
            config.lat_step_deg = step;
            config.lon_step_deg = step;
        }
        if let Some(limit) = self.max_grid_points {
            config.max_grid_points = limit;
        }
        config
    }

    fn land(&self) -> anyhow::Result<&'static LandMask> {
        let path = self
            .land
            .clone()
            .unwrap_or_else(|| PathBuf::from(config::land_path_from_env()));
        land::global_land(&path)
            .with_context(|| format!("failed to load land polygons from {}", path.display()))
    }
}

#[derive(ClapArgs, Debug)]
struct PlanArgs {
    /// Start position as "lat,lon"
    #[arg(long, value_parser = parse_coordinate)]
    from: Coordinate,

    /// Destination as "lat,lon"
    #[arg(long, value_parser = parse_coordinate)]
    to: Coordinate,

    /// Intermediate waypoint as "lat,lon" (repeatable, visited in order)
    #[arg(long = "via", value_parser = parse_coordinate)]
    via: Vec<Coordinate>,

    /// Cruising speed in knots
    #[arg(long, default_value_t = config::DEFAULT_SPEED_KNOTS)]
    speed: f64,

    /// Departure time (RFC 3339, default: now)
    #[arg(long)]
    departure: Option<DateTime<Utc>>,

    /// Vessel name written to every record
    #[arg(long, default_value = "OSV_SIM")]
    vessel: String,

    /// Output CSV (default: stdout)
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    planner: PlannerArgs,
}

#[derive(ClapArgs, Debug)]
struct SimulateArgs {
    /// Departure port as "lat,lon" (default: Mumbai harbour)
    #[arg(long, value_parser = parse_coordinate)]
    port: Option<Coordinate>,

    /// Rig position as "lat,lon" (default: western offshore field)
    #[arg(long, value_parser = parse_coordinate)]
    rig: Option<Coordinate>,

    /// Port to return to (default: departure port)
    #[arg(long, value_parser = parse_coordinate)]
    end_port: Option<Coordinate>,

    /// Transit waypoint as "lat,lon" (repeatable; default: scenario waypoints)
    #[arg(long = "via", value_parser = parse_coordinate)]
    via: Vec<Coordinate>,

    /// Cruising speed in knots
    #[arg(long, default_value_t = config::DEFAULT_SPEED_KNOTS)]
    speed: f64,

    /// Minutes spent on site (default: five days)
    #[arg(long)]
    onsite_minutes: Option<usize>,

    /// Transit position jitter in degrees
    #[arg(long, default_value_t = 0.0004)]
    drift: f64,

    /// Sail straight legs instead of routing around land
    #[arg(long)]
    direct: bool,

    /// Departure time (RFC 3339, default: now)
    #[arg(long)]
    departure: Option<DateTime<Utc>>,

    /// Vessel name written to every record
    #[arg(long, default_value = "OSV_SIM")]
    vessel: String,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output CSV
    #[arg(long, default_value = "osv_voyage.csv")]
    out: PathBuf,

    #[command(flatten)]
    planner: PlannerArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("osv_voyage=info".parse()?)
                .add_directive("osv_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Plan(args) => plan(args),
        Command::Simulate(args) => simulate(args),
        Command::Summary { path } => summary(path),
    }
}

fn departure_or_now(departure: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    departure.unwrap_or_else(|| now.with_nanosecond(0).unwrap_or(now))
}

fn plan(args: PlanArgs) -> anyhow::Result<()> {
    let land = args.planner.land()?;
    let planner = RoutePlanner::new(land, args.planner.config());

    let mut request = RouteRequest::new(args.from, args.to);
    request.waypoints = args.via;
    request.speed_knots = args.speed;
    request.departure = departure_or_now(args.departure);
    request.vessel = args.vessel;

    let (route, trajectory) = planner.plan_trajectory(&request)?;
    for (i, leg) in route.legs.iter().enumerate() {
        tracing::info!(
            "Leg {}: {} -> {}, {} waypoints, {:.2} nm ({} water points, {} edges)",
            i + 1,
            leg.from,
            leg.to,
            leg.waypoints.len(),
            leg.distance_nm,
            leg.grid_points,
            leg.edges
        );
    }

    write_records(&trajectory.records, args.out.as_ref())?;
    eprintln!(
        "Route: {} waypoints, {:.2} nm at {:.1} kn, ETA {}",
        route.waypoints.len(),
        trajectory.metrics.total_distance_nm,
        trajectory.metrics.speed_knots,
        trajectory.metrics.eta
    );
    Ok(())
}

fn simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let scenario = Scenario::mumbai_high();
    let port = args.port.unwrap_or(scenario.port);
    let rig = args.rig.unwrap_or(scenario.rig);

    let mut request = VoyageRequest::new(port, rig);
    request.end_port = args.end_port.unwrap_or(port);
    request.waypoints = if !args.via.is_empty() {
        args.via
    } else if args.port.is_none() && args.rig.is_none() {
        scenario.waypoints
    } else {
        Vec::new()
    };
    request.speed_knots = args.speed;
    request.departure = departure_or_now(args.departure);
    request.vessel = args.vessel;
    request.onsite_minutes = args.onsite_minutes.unwrap_or(scenario.onsite_minutes);
    request.drift_deg = args.drift;
    request.land_aware = !args.direct;

    let open_water = LandMask::default();
    let land: &dyn LandPredicate = if args.direct {
        &open_water
    } else {
        args.planner.land()?
    };
    let planner = RoutePlanner::new(land, args.planner.config());

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let voyage = simulate_voyage(&planner, &request, &mut rng)?;

    save_trajectory_csv(&args.out, &voyage.trajectory.records)?;
    eprintln!(
        "Generated {} records ({} outbound, {} on site, {} return) -> {}",
        voyage.trajectory.records.len(),
        voyage.outbound_records,
        voyage.onsite_records,
        voyage.return_records,
        args.out.display()
    );
    eprintln!(
        "Transit {:.2} nm at {:.1} kn, back in port {}",
        voyage.trajectory.metrics.total_distance_nm,
        voyage.trajectory.metrics.speed_knots,
        voyage.trajectory.metrics.eta
    );
    Ok(())
}

fn summary(path: PathBuf) -> anyhow::Result<()> {
    let records = load_trajectory_csv(&path)
        .with_context(|| format!("failed to read trajectory {}", path.display()))?;
    let summary = TrajectorySummary::from_records(&records);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn write_records(records: &[TrajectoryRecord], out: Option<&PathBuf>) -> anyhow::Result<()> {
    match out {
        Some(path) => save_trajectory_csv(path, records)?,
        None => write_trajectory_csv(std::io::stdout().lock(), records)?,
    }
    Ok(())
}
