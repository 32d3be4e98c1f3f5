//! Route planning between rooms.
//!
//! This module provides:
//! - Constrained A* search over the semantic grid
//! - Room allow-list rules (connectors always pass)
//! - The path planner with connector targeting and bbox fallback

mod astar;
mod planner;

pub use astar::{shortest_path, AllowList, ConstrainedAstar, SearchFailure, SearchResult};
pub use planner::{PathPlanner, RoutePlan};
