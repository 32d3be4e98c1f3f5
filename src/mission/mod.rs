//! Mission compilation and execution.
//!
//! This module provides:
//! - Waypoint extraction and segment distances from a raw cell path
//! - Compilation of routes into ordered, agent-dispatchable mission steps
//! - Text rendering, tolerant text parsing, and route narration
//! - The tick-driven mission executor

mod executor;
mod render;
mod route;
mod steps;

pub use executor::{MissionExecutor, ProviderSet};
pub use render::{
    mission_from_text, narrate_route, parse_mission_text, render_mission_text, ParsedLine,
};
pub use route::{compile_route, Route, Segment, TransitionTag, Waypoint};
pub use steps::{Mission, MissionCompiler, MissionStep, NavDestination, NavEndpoint, StepAction};
