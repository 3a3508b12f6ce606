//! MargaNav - drive a simulated robot through a floor plan
//!
//! Loads a map and configuration, then runs the navigation controller
//! against the simulated robot for every requested target.
//!
//! Usage:
//!   marga-nav --map maps/office.yaml --target 14,9 --target 2,2
//!   marga-nav --config marga-nav.toml --map maps/office.yaml --seat 3
//!
//! Enable debug logging to follow every batch:
//!   RUST_LOG=debug marga-nav --target 10,5

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use marga_nav::{
    MapDescription, MargaConfig, NavError, NavigationController, OccupancyMap, ParticleFilter,
    PlannerKind, Point2D, Rect, Result, SimulatedRobot, build_planner,
};

/// Navigate a simulated robot to targets or seats.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// YAML map description (defaults to a built-in 20x15 room)
    #[arg(short, long)]
    map: Option<PathBuf>,

    /// Target position as "x,y" (repeatable, visited in order)
    #[arg(short, long, value_parser = parse_point)]
    target: Vec<Point2D>,

    /// Seat id to visit after the targets
    #[arg(short, long)]
    seat: Option<u32>,

    /// Override the configured planner
    #[arg(short, long, value_enum)]
    planner: Option<PlannerArg>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PlannerArg {
    Grid,
    RrtStar,
}

impl From<PlannerArg> for PlannerKind {
    fn from(arg: PlannerArg) -> Self {
        match arg {
            PlannerArg::Grid => PlannerKind::Grid,
            PlannerArg::RrtStar => PlannerKind::RrtStar,
        }
    }
}

fn parse_point(s: &str) -> std::result::Result<Point2D, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{s}'"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y '{y}': {e}"))?;
    Ok(Point2D::new(x, y))
}

fn default_map() -> MapDescription {
    MapDescription::rectangular(
        20.0,
        15.0,
        vec![Rect::new(6.0, 0.0, 1.0, 9.0), Rect::new(12.0, 6.0, 1.0, 9.0)],
        vec![],
    )
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from {:?}", path);
            MargaConfig::load(path)?
        }
        None => {
            log::info!("Using default configuration");
            MargaConfig::default()
        }
    };
    if let Some(planner) = args.planner {
        config.planner.kind = planner.into();
    }

    let description = match &args.map {
        Some(path) => {
            log::info!("Loading map from {:?}", path);
            MapDescription::from_yaml_file(path)?
        }
        None => default_map(),
    };
    let map = Arc::new(OccupancyMap::from_description(&description)?);
    let bounds = map.bounds();
    log::info!(
        "Map: {:.1} x {:.1}, {} obstacles, {} seats",
        bounds.width(),
        bounds.height(),
        map.obstacles().len(),
        map.seats().len()
    );

    let start = config.simulation.start;
    let robot = SimulatedRobot::new(map.clone(), config.simulation.clone())?;
    let planner = build_planner(
        config.planner.kind,
        map.clone(),
        config.planner.grid,
        config.planner.rrt_star,
    )?;
    log::info!("Planner: {}", planner.name());
    let filter = ParticleFilter::new(config.localization.clone(), map, start)?;

    let mut nav = NavigationController::new(
        config.controller.clone(),
        planner,
        filter,
        robot.clone(),
        robot.clone(),
        start,
    )?;

    if args.target.is_empty() && args.seat.is_none() {
        log::warn!("No --target or --seat given, nothing to do");
        return Ok(());
    }

    for target in &args.target {
        let report = nav.goto(*target)?;
        log_arrival(&format!("({:.2}, {:.2})", target.x, target.y), &report, &robot);
    }
    if let Some(id) = args.seat {
        let report = nav.goto_seat(id)?;
        log_arrival(&format!("seat {id}"), &report, &robot);
    }

    log::info!(
        "Done: {} poses driven, {:.1}s simulated, {} bumps",
        robot.trajectory().len(),
        robot.elapsed().as_secs_f32(),
        robot.bumps()
    );
    Ok(())
}

fn log_arrival(label: &str, report: &marga_nav::GotoReport, robot: &SimulatedRobot) {
    let truth = robot.true_pose();
    log::info!(
        "Arrived at {} in {} batches ({} instructions)",
        label,
        report.batches,
        report.instructions_executed
    );
    log::info!(
        "  estimate ({:.2}, {:.2}, {:.2}) truth ({:.2}, {:.2}, {:.2}) error {:.3}",
        report.final_pose.x,
        report.final_pose.y,
        report.final_pose.theta,
        truth.x,
        truth.y,
        truth.theta,
        report.final_pose.distance_to(&truth.position())
    );
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();
    log::info!("MargaNav v{}", env!("CARGO_PKG_VERSION"));

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("[{}] {}", e.code(), e);
            if matches!(e, NavError::Cancelled { .. }) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
