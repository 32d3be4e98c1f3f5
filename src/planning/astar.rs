//! Constrained A* search.
//!
//! 8-connected search over the semantic grid with axis cost 1.0 and a
//! configurable diagonal cost, Euclidean heuristic (admissible and
//! consistent for these step costs). Expansion is restricted to walkable
//! cells whose owning room is on the allow-list; door/entry connectors
//! always pass regardless of room membership, since they structurally
//! bridge rooms.

use crate::house::{rooms, Cell, RoomRegistry, SemanticGrid};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::{debug, trace};

/// A node in the A* search
#[derive(Clone, Debug)]
struct SearchNode {
    cell: Cell,
    g_cost: f32,
    f_cost: f32,
}

impl Eq for SearchNode {}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Which rooms a search may traverse through.
#[derive(Clone, Debug)]
pub struct AllowList {
    goal_room: String,
    neutral: Vec<String>,
}

impl AllowList {
    /// Build an allow-list for a goal room. `neutral` holds additional
    /// always-traversable room names (compared lowercased).
    pub fn new(goal_room: &str, neutral: &[String]) -> Self {
        Self {
            goal_room: goal_room.to_lowercase(),
            neutral: neutral.iter().map(|n| n.to_lowercase()).collect(),
        }
    }

    /// Is a cell owned by `room` (possibly none) traversable under this
    /// allow-list? Unowned cells and hallway-named rooms always are.
    pub fn allows(&self, room: Option<&str>) -> bool {
        match room {
            None => true,
            Some(name) => {
                let lower = name.to_lowercase();
                lower == self.goal_room
                    || self.neutral.contains(&lower)
                    || rooms::is_hallway_name(name)
            }
        }
    }
}

/// Reason a search produced no path
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchFailure {
    /// Start or goal is outside the grid
    OutOfBounds,
    /// Goal cell is not standable
    GoalBlocked,
    /// No path exists under the constraints
    NoPath,
    /// Node expansion budget exhausted
    BudgetExhausted,
}

/// Result of one A* search
#[derive(Clone, Debug)]
pub struct SearchResult {
    /// Path from start to goal inclusive (empty on failure)
    pub path: Vec<Cell>,
    /// Total path cost in cell units
    pub cost: f32,
    /// Number of nodes expanded
    pub nodes_expanded: usize,
    pub failure: Option<SearchFailure>,
}

impl SearchResult {
    fn failed(failure: SearchFailure, nodes_expanded: usize) -> Self {
        Self {
            path: Vec::new(),
            cost: f32::INFINITY,
            nodes_expanded,
            failure: Some(failure),
        }
    }

    pub fn success(&self) -> bool {
        self.failure.is_none()
    }
}

/// A* search bound to one grid/registry snapshot.
pub struct ConstrainedAstar<'a> {
    grid: &'a SemanticGrid,
    registry: &'a RoomRegistry,
    /// Room constraint; `None` searches unconstrained
    allow: Option<&'a AllowList>,
    diagonal_cost: f32,
    max_expansions: usize,
    allow_diagonal: bool,
}

impl<'a> ConstrainedAstar<'a> {
    pub fn new(
        grid: &'a SemanticGrid,
        registry: &'a RoomRegistry,
        allow: Option<&'a AllowList>,
        diagonal_cost: f32,
        max_expansions: usize,
    ) -> Self {
        Self {
            grid,
            registry,
            allow,
            diagonal_cost,
            max_expansions,
            allow_diagonal: true,
        }
    }

    /// Restrict moves to the 4-connected neighborhood (for behaviors whose
    /// action space cannot step diagonally).
    pub fn axis_only(mut self) -> Self {
        self.allow_diagonal = false;
        self
    }

    /// May the search step onto this cell?
    ///
    /// Walkable is necessary; beyond that the owning room must be allowed,
    /// except connectors, which bridge rooms and always pass.
    fn expandable(&self, cell: Cell) -> bool {
        if !self.grid.is_walkable(cell) {
            return false;
        }
        match self.allow {
            None => true,
            Some(allow) => {
                allow.allows(self.registry.room_at(cell)) || self.grid.is_connector(cell)
            }
        }
    }

    /// Find a path from start to goal.
    pub fn search(&self, start: Cell, goal: Cell) -> SearchResult {
        trace!("[AStar] search: start={} goal={}", start, goal);

        if !self.grid.in_bounds(start) || !self.grid.in_bounds(goal) {
            debug!("[AStar] FAILED: OutOfBounds - start or goal outside grid");
            return SearchResult::failed(SearchFailure::OutOfBounds, 0);
        }
        if !self.grid.is_walkable(goal) {
            debug!("[AStar] FAILED: GoalBlocked at {}", goal);
            return SearchResult::failed(SearchFailure::GoalBlocked, 0);
        }

        let mut open_set = BinaryHeap::new();
        let mut closed_set = HashSet::new();
        let mut came_from: HashMap<Cell, Cell> = HashMap::new();
        let mut g_scores: HashMap<Cell, f32> = HashMap::new();

        open_set.push(SearchNode {
            cell: start,
            g_cost: 0.0,
            f_cost: start.euclidean(&goal),
        });
        g_scores.insert(start, 0.0);

        let mut nodes_expanded = 0;

        while let Some(current) = open_set.pop() {
            nodes_expanded += 1;

            if nodes_expanded > self.max_expansions {
                debug!(
                    "[AStar] FAILED: BudgetExhausted ({} nodes)",
                    nodes_expanded
                );
                return SearchResult::failed(SearchFailure::BudgetExhausted, nodes_expanded);
            }

            if current.cell == goal {
                return self.reconstruct(came_from, goal, current.g_cost, nodes_expanded);
            }

            if closed_set.contains(&current.cell) {
                continue;
            }
            closed_set.insert(current.cell);

            // Axis neighbors come first, diagonals after
            let neighbors = if self.allow_diagonal {
                current.cell.neighbors_8().to_vec()
            } else {
                current.cell.neighbors_4().to_vec()
            };

            for (i, neighbor) in neighbors.iter().enumerate() {
                if closed_set.contains(neighbor) {
                    continue;
                }
                if !self.expandable(*neighbor) {
                    continue;
                }

                let move_cost = if self.allow_diagonal && i >= 4 {
                    self.diagonal_cost
                } else {
                    1.0
                };
                let tentative_g = g_scores[&current.cell] + move_cost;

                let current_g = g_scores.get(neighbor).copied().unwrap_or(f32::INFINITY);
                if tentative_g < current_g {
                    came_from.insert(*neighbor, current.cell);
                    g_scores.insert(*neighbor, tentative_g);
                    open_set.push(SearchNode {
                        cell: *neighbor,
                        g_cost: tentative_g,
                        f_cost: tentative_g + neighbor.euclidean(&goal),
                    });
                }
            }
        }

        debug!(
            "[AStar] FAILED: NoPath after expanding {} nodes",
            nodes_expanded
        );
        SearchResult::failed(SearchFailure::NoPath, nodes_expanded)
    }

    fn reconstruct(
        &self,
        came_from: HashMap<Cell, Cell>,
        goal: Cell,
        cost: f32,
        nodes_expanded: usize,
    ) -> SearchResult {
        let mut path = Vec::new();
        let mut current = goal;

        while let Some(&prev) = came_from.get(&current) {
            path.push(current);
            current = prev;
        }
        path.push(current); // Add start
        path.reverse();

        trace!(
            "[AStar] SUCCESS: path length={} cells, cost={:.2}, nodes_expanded={}",
            path.len(),
            cost,
            nodes_expanded
        );

        SearchResult {
            path,
            cost,
            nodes_expanded,
            failure: None,
        }
    }
}

/// Unconstrained axis-only shortest path over walkable cells. Used by
/// behaviors that follow a goal the planner already vetted and can only
/// step in the four cardinal directions.
pub fn shortest_path(
    grid: &SemanticGrid,
    registry: &RoomRegistry,
    start: Cell,
    goal: Cell,
    max_expansions: usize,
) -> Option<Vec<Cell>> {
    let astar = ConstrainedAstar::new(grid, registry, None, 1.414, max_expansions).axis_only();
    let result = astar.search(start, goal);
    if result.success() {
        Some(result.path)
    } else {
        None
    }
}
