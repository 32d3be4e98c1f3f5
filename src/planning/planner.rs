//! The room-to-room path planner.
//!
//! Plans a shortest valid path from a start cell to a goal room, targeting
//! the nearest valid connector of the room. Traversal is constrained to
//! neutral areas, hallways, the goal room and unowned cells; connectors
//! always pass.

use super::astar::{AllowList, ConstrainedAstar};
use crate::config::PlannerConfig;
use crate::house::{Cell, RoomRegistry, SemanticGrid};
use tracing::{debug, info, warn};

/// A planned route to a goal room.
#[derive(Clone, Debug)]
pub struct RoutePlan {
    /// Full cell path, start to target inclusive
    pub path: Vec<Cell>,
    /// Path cost in cell units
    pub cost: f32,
    /// Nodes expanded across all candidate searches
    pub nodes_expanded: usize,
    /// Canonical name of the goal room
    pub goal_room: String,
    /// The cell the search actually targeted
    pub target: Cell,
}

/// Planner bound to one grid/registry snapshot.
pub struct PathPlanner<'a> {
    grid: &'a SemanticGrid,
    registry: &'a RoomRegistry,
    config: &'a PlannerConfig,
}

impl<'a> PathPlanner<'a> {
    pub fn new(
        grid: &'a SemanticGrid,
        registry: &'a RoomRegistry,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            grid,
            registry,
            config,
        }
    }

    /// Candidate target cells for a goal room: every declared connector the
    /// grid confirms; if none validate, every walkable cell in the bbox.
    fn collect_targets(&self, goal_room: &str) -> Vec<Cell> {
        let connectors = self.registry.validated_connectors(goal_room, self.grid);
        if !connectors.is_empty() {
            return connectors;
        }
        debug!(
            "No validated connectors for '{}', falling back to bbox interior",
            goal_room
        );
        self.registry.walkable_cells_in(goal_room, self.grid)
    }

    /// Plan a shortest valid path from `start` into `goal_room`.
    ///
    /// Returns `None` when the room is unknown, has no usable target cells,
    /// or no candidate is reachable under the room constraints. Failure is
    /// reported to the caller, never retried here.
    pub fn plan(&self, start: Cell, goal_room: &str) -> Option<RoutePlan> {
        let Some((canonical, _)) = self.registry.resolve_room(goal_room) else {
            warn!("Unknown goal room '{}'", goal_room);
            return None;
        };
        let canonical = canonical.to_string();

        let targets = self.collect_targets(&canonical);
        if targets.is_empty() {
            warn!("No valid targets found for room '{}'", canonical);
            return None;
        }

        let allow = AllowList::new(&canonical, &self.config.neutral_rooms);
        let astar = ConstrainedAstar::new(
            self.grid,
            self.registry,
            Some(&allow),
            self.config.diagonal_cost,
            self.config.max_expansions,
        );

        // Shortest successful path wins; first found breaks ties
        let mut best: Option<RoutePlan> = None;
        let mut total_expanded = 0;
        for target in targets {
            let result = astar.search(start, target);
            total_expanded += result.nodes_expanded;
            if !result.success() {
                continue;
            }
            let better = match &best {
                Some(plan) => result.path.len() < plan.path.len(),
                None => true,
            };
            if better {
                best = Some(RoutePlan {
                    path: result.path,
                    cost: result.cost,
                    nodes_expanded: 0,
                    goal_room: canonical.clone(),
                    target,
                });
            }
        }

        match best {
            Some(mut plan) => {
                plan.nodes_expanded = total_expanded;
                info!(
                    "Planned route to '{}': {} cells, cost {:.2}, target {}",
                    plan.goal_room,
                    plan.path.len(),
                    plan.cost,
                    plan.target
                );
                Some(plan)
            }
            None => {
                warn!(
                    "No valid constrained path to '{}' ({} nodes expanded)",
                    canonical, total_expanded
                );
                None
            }
        }
    }
}
