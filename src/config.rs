//! Configuration loading for GrihaNav

use crate::error::{GrihaError, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct GrihaConfig {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Path planner settings
#[derive(Clone, Debug, Deserialize)]
pub struct PlannerConfig {
    /// Maximum A* node expansions per search (default: 100000)
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,

    /// Cost of a diagonal move; axis moves cost 1.0 (default: 1.414)
    #[serde(default = "default_diagonal_cost")]
    pub diagonal_cost: f32,

    /// Room names traversable regardless of the goal (lowercased on use).
    /// Hallway-named rooms are always traversable in addition to these.
    #[serde(default = "default_neutral_rooms")]
    pub neutral_rooms: Vec<String>,

    /// Fallback grid resolution in meters/cell when the registry omits it
    #[serde(default = "default_resolution")]
    pub resolution: f32,
}

/// Mission executor settings
#[derive(Clone, Debug, Deserialize)]
pub struct ExecutorConfig {
    /// Manhattan tile distance within which a door step may activate
    /// directly, without a navigation leg first (default: 3)
    #[serde(default = "default_door_proximity")]
    pub door_proximity_tiles: i32,

    /// Insert a wall-following step before the terminal scan (default: false)
    #[serde(default)]
    pub include_wall_step: bool,
}

/// Built-in scan behavior settings
#[derive(Clone, Debug, Deserialize)]
pub struct ScanConfig {
    /// Total tick budget for one room scan (default: 30)
    #[serde(default = "default_scan_budget")]
    pub tick_budget: u32,

    /// Turn once every this many ticks, moving forward otherwise (default: 4)
    #[serde(default = "default_turn_period")]
    pub turn_period: u32,
}

/// Output file locations
#[derive(Clone, Debug, Deserialize)]
pub struct OutputConfig {
    /// Path to write the planned route document
    #[serde(default = "default_route_path")]
    pub route_path: String,

    /// Path to write the structured mission document
    #[serde(default = "default_mission_path")]
    pub mission_path: String,

    /// Path to write the numbered text rendering of the mission
    #[serde(default = "default_mission_text_path")]
    pub mission_text_path: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_expansions: default_max_expansions(),
            diagonal_cost: default_diagonal_cost(),
            neutral_rooms: default_neutral_rooms(),
            resolution: default_resolution(),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            door_proximity_tiles: default_door_proximity(),
            include_wall_step: false,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tick_budget: default_scan_budget(),
            turn_period: default_turn_period(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            route_path: default_route_path(),
            mission_path: default_mission_path(),
            mission_text_path: default_mission_text_path(),
        }
    }
}

impl Default for GrihaConfig {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            executor: ExecutorConfig::default(),
            scan: ScanConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

// Default value functions
fn default_max_expansions() -> usize {
    100_000
}
fn default_diagonal_cost() -> f32 {
    1.414
}
fn default_neutral_rooms() -> Vec<String> {
    vec!["open space".to_string()]
}
fn default_resolution() -> f32 {
    0.15
}
fn default_door_proximity() -> i32 {
    3
}
fn default_scan_budget() -> u32 {
    30
}
fn default_turn_period() -> u32 {
    4
}
fn default_route_path() -> String {
    "output/planned_route.json".to_string()
}
fn default_mission_path() -> String {
    "output/mission.json".to_string()
}
fn default_mission_text_path() -> String {
    "output/mission.txt".to_string()
}

impl GrihaConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GrihaError::Config(format!("Failed to read config file: {}", e)))?;
        let config: GrihaConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
