//! GrihaNav - mission controller binary.
//!
//! Loads the semantic grid and room registry, resolves a target request to
//! a goal room, plans a constrained route, compiles it into a mission, and
//! runs the mission executor against a small simulated environment, one
//! action per tick. Snapshot files are watched by a producer thread that
//! pushes whole new snapshots over the event channel; the core itself
//! never polls.

use clap::Parser;
use crossbeam_channel::Sender;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

use griha_nav::agents::{
    Action, DoorTraversal, Facing, GridNavigator, Observation, RoomScanner, WallFollower,
};
use griha_nav::config::GrihaConfig;
use griha_nav::error::{GrihaError, Result};
use griha_nav::events::{event_channel, SnapshotEvent, TargetRequest};
use griha_nav::house::{Cell, RoomRegistry, SemanticGrid};
use griha_nav::mission::{
    compile_route, narrate_route, render_mission_text, MissionCompiler, MissionExecutor,
    ProviderSet,
};
use griha_nav::planning::PathPlanner;

#[derive(Parser, Debug)]
#[command(name = "griha-nav", about = "Room-mission planner and executor")]
struct Args {
    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Semantic grid file (text encoding)
    #[arg(long, default_value = "data/house_map.txt")]
    grid: PathBuf,

    /// Room registry file (JSON)
    #[arg(long, default_value = "data/unified_rooms.json")]
    rooms: PathBuf,

    /// Target request file (JSON) to watch for changes
    #[arg(long)]
    request: Option<PathBuf>,

    /// Goal room name (bypasses the request file)
    #[arg(long)]
    room: Option<String>,

    /// Goal object name (resolved to a room through the registry)
    #[arg(long)]
    object: Option<String>,

    /// Start cell as "x,y"
    #[arg(long, default_value = "0,0")]
    start: String,

    /// Maximum simulation ticks
    #[arg(long, default_value_t = 2000)]
    max_ticks: u64,
}

fn parse_start(s: &str) -> Result<Cell> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| GrihaError::Config(format!("invalid start cell: {:?}", s)))?;
    let x = x
        .trim()
        .parse()
        .map_err(|e| GrihaError::Config(format!("invalid start x: {}", e)))?;
    let y = y
        .trim()
        .parse()
        .map_err(|e| GrihaError::Config(format!("invalid start y: {}", e)))?;
    Ok(Cell::new(x, y))
}

/// Watch snapshot files for mtime changes and push whole new snapshots.
fn spawn_watcher(
    grid_path: PathBuf,
    rooms_path: PathBuf,
    request_path: Option<PathBuf>,
    tx: Sender<SnapshotEvent>,
) {
    std::thread::spawn(move || {
        let mut grid_stamp = SystemTime::UNIX_EPOCH;
        let mut rooms_stamp = SystemTime::UNIX_EPOCH;
        let mut request_stamp = SystemTime::UNIX_EPOCH;

        loop {
            if let Some(stamp) = modified_after(&grid_path, grid_stamp) {
                match SemanticGrid::load(&grid_path) {
                    Ok(grid) => {
                        grid_stamp = stamp;
                        if tx.send(SnapshotEvent::Grid(grid)).is_err() {
                            return;
                        }
                    }
                    Err(e) => warn!("Reloading grid failed: {}", e),
                }
            }
            if let Some(stamp) = modified_after(&rooms_path, rooms_stamp) {
                match RoomRegistry::load(&rooms_path) {
                    Ok(registry) => {
                        rooms_stamp = stamp;
                        if tx.send(SnapshotEvent::Registry(registry)).is_err() {
                            return;
                        }
                    }
                    Err(e) => warn!("Reloading registry failed: {}", e),
                }
            }
            if let Some(ref path) = request_path {
                if let Some(stamp) = modified_after(path, request_stamp) {
                    match load_request(path) {
                        Ok(request) => {
                            request_stamp = stamp;
                            if tx.send(SnapshotEvent::Target(request)).is_err() {
                                return;
                            }
                        }
                        Err(e) => warn!("Reading target request failed: {}", e),
                    }
                }
            }
            std::thread::sleep(Duration::from_millis(500));
        }
    });
}

fn modified_after(path: &Path, stamp: SystemTime) -> Option<SystemTime> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    (modified > stamp).then_some(modified)
}

fn load_request(path: &Path) -> Result<TargetRequest> {
    let json = std::fs::read_to_string(path)?;
    let request = serde_json::from_str(&json)?;
    Ok(request)
}

fn write_output(path: &str, content: &str) {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = std::fs::write(path, content) {
        warn!("Writing {:?} failed: {}", path, e);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("griha_nav=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            GrihaConfig::load(path)?
        }
        None => GrihaConfig::default(),
    };
    let start = parse_start(&args.start)?;

    let (tx, rx) = event_channel();

    // Direct --room/--object request, if given, is pushed before the
    // watcher so it plans against the first snapshots
    if args.room.is_some() || args.object.is_some() {
        tx.send(SnapshotEvent::Target(TargetRequest {
            object: args.object.clone(),
            room: args.room.clone(),
        }))
        .ok();
    }
    spawn_watcher(
        args.grid.clone(),
        args.rooms.clone(),
        args.request.clone(),
        tx,
    );

    let providers = ProviderSet {
        navigation: Box::new(GridNavigator::new(config.planner.max_expansions)),
        door: Box::new(DoorTraversal::new()),
        scan: Box::new(RoomScanner::new(&config.scan)),
        wall: Box::new(WallFollower::new()),
    };
    let mut executor = MissionExecutor::new(config.executor.clone(), providers);
    let mut compiler = MissionCompiler::new(config.executor.include_wall_step);

    // Snapshots and simulated agent state
    let mut grid: Option<SemanticGrid> = None;
    let mut registry: Option<RoomRegistry> = None;
    let mut pending_target: Option<TargetRequest> = None;
    let mut position = start;
    let mut facing = Facing::North;

    info!("GrihaNav running from {}", start);
    for tick in 0..args.max_ticks {
        // Drain snapshot events
        while let Ok(event) = rx.try_recv() {
            match event {
                SnapshotEvent::Grid(g) => {
                    info!("Grid snapshot loaded ({}x{})", g.width(), g.height());
                    grid = Some(g);
                }
                SnapshotEvent::Registry(r) => {
                    info!(
                        "Registry snapshot loaded ({} rooms, {} tile types)",
                        r.rooms.len(),
                        r.tiles.len()
                    );
                    registry = Some(r);
                }
                SnapshotEvent::Target(t) => pending_target = Some(t),
            }
        }

        // A target stays pending until both snapshots exist
        if let (Some(grid), Some(registry)) = (grid.as_ref(), registry.as_ref()) {
            if let Some(target) = pending_target.take() {
                match target.resolve(registry) {
                    Some((goal_room, objective)) => {
                        let planner = PathPlanner::new(grid, registry, &config.planner);
                        match planner.plan(position, &goal_room) {
                            Some(plan) => {
                                let route = compile_route(&plan.path, registry);
                                for line in narrate_route(&route) {
                                    info!("  {}", line);
                                }
                                let mission =
                                    compiler.compile(&route, registry, objective.as_deref());
                                if let Ok(json) = serde_json::to_string_pretty(&route) {
                                    write_output(&config.output.route_path, &json);
                                }
                                if let Ok(json) = mission.to_json() {
                                    write_output(&config.output.mission_path, &json);
                                }
                                write_output(
                                    &config.output.mission_text_path,
                                    &render_mission_text(&mission),
                                );
                                executor.submit(mission);
                            }
                            None => warn!("No route to '{}' from {}", goal_room, position),
                        }
                    }
                    None => warn!("Target request names no known room or object"),
                }
            }
        }

        // Tick the executor against the current snapshots
        let (Some(grid_ref), Some(registry_ref)) = (grid.as_ref(), registry.as_ref()) else {
            std::thread::sleep(Duration::from_millis(50));
            continue;
        };
        let mut obs = Observation {
            position,
            facing,
            goal_position: None,
            grid: grid_ref,
            registry: registry_ref,
        };
        let action = executor.tick(&mut obs);

        match action {
            Action::Forward => {
                let next = facing.step_from(position);
                if grid_ref.is_walkable(next) {
                    position = next;
                }
            }
            Action::TurnLeft => facing = facing.turned_left(),
            Action::TurnRight => facing = facing.turned_right(),
            Action::Stay => {}
        }

        if executor.is_complete() {
            let (done, total) = executor.progress();
            info!(
                "Mission finished after {} ticks ({}/{} steps) at {}",
                tick + 1,
                done,
                total,
                position
            );
            return Ok(());
        }

        std::thread::sleep(Duration::from_millis(10));
    }

    warn!("Tick limit reached without mission completion");
    Ok(())
}
